//! Normalization of the stacked statistical workbook into flat tables

pub mod code_table;
pub mod error;
pub mod metadata;
pub mod schema_unifier;
pub mod section_splitter;

/// Synthesized first column of every normalized table
pub const YEAR_COLUMN: &str = "Year";

/// Canonical name of the region identifier column in normalized tables
pub const REGION_CODE_COLUMN: &str = "RegionCode";

/// Canonical name of the region name column in the code table
pub const REGION_NAME_COLUMN: &str = "RegionName";

pub use code_table::{extract_code_table, RegionEntry, RegionRegistry};
pub use error::IngestError;
pub use metadata::{column_names, MetadataTable};
pub use schema_unifier::{unify_blocks, NormalizedRow, NormalizedTable};
pub use section_splitter::{split_sections, YearBlock};
