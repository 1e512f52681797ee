use crate::db::{DbError, InvalidTableKind, TableKind};

/// Query-time failures. Each is local to one query; aggregations continue past them.
#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    InvalidTableKind(#[from] InvalidTableKind),

    #[error("Region '{name}' not found in the spatial registry")]
    RegionNotFound { name: String },

    #[error("Region code {code} not found in the spatial registry")]
    RegionCodeNotFound { code: i64 },

    #[error("Unknown data point '{name}' for {kind} data")]
    UnknownDataPoint { kind: TableKind, name: String },

    #[error("No {kind} data has been ingested")]
    TableNotLoaded { kind: TableKind },

    #[error("No data found for year {year}, region {region_code}")]
    NoDataFound { year: i32, region_code: i64 },

    #[error("No valid data for the requested years")]
    NoValidData,

    #[error("Multiple rows stored for year {year}, region {region_code}")]
    DuplicateObservation { year: i32, region_code: i64 },

    #[error("'{data_point}' has no value for year {year}, region {region_code}")]
    MissingValue {
        data_point: String,
        year: i32,
        region_code: i64,
    },

    #[error("'{data_point}' holds non-numeric value '{value}'")]
    NonNumericValue { data_point: String, value: String },

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl From<sqlx::Error> for StatError {
    fn from(e: sqlx::Error) -> Self {
        StatError::Store(DbError::SqlxError(e))
    }
}
