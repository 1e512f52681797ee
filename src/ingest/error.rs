use crate::db::DbError;
use crate::importers::WorkbookError;

/// Failures that abort an ingestion run. Nothing is persisted when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Schema mismatch in {year} block: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        year: i32,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Structural parse failure: {0}")]
    StructuralParseFailure(String),

    #[error("Duplicate observation for year {year}, region {region_code}")]
    DuplicateObservation { year: i32, region_code: String },

    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Workbook reader task failed: {0}")]
    ReaderTask(#[from] tokio::task::JoinError),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl IngestError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        IngestError::StructuralParseFailure(msg.into())
    }
}
