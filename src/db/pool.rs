use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::db::DbError;

/// Open the sqlite store at `database_url`, creating the file if needed
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool, DbError> {
    info!("Connecting to database {}", database_url);
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("Database connection established");
    Ok(pool)
}
