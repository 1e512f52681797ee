pub mod error;
pub mod ingest_service;
pub mod region_resolver;
pub mod stat_service;

pub use error::StatError;
pub use ingest_service::{IngestService, IngestSummary, NormalizedWorkbook, WorkbookSheets};
pub use region_resolver::RegionResolver;
pub use stat_service::{RegionComparison, StatService, YearValue};
