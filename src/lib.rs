pub mod config;
pub mod db;
pub mod grid;
pub mod importers;
pub mod ingest;
pub mod services;
