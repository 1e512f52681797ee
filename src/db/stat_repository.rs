use sqlx::pool::PoolConnection;
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, instrument};

use crate::db::schema::{
    insert_cells_tx, insert_statement, quote_identifier, recreate_table_tx, table_columns,
};
use crate::db::{DbError, TableKind};
use crate::ingest::{MetadataTable, NormalizedTable, REGION_CODE_COLUMN, YEAR_COLUMN};

/// Raw stored value of one data-point cell, as SQLite reports it
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredCell {
    /// SQLite storage class: "integer", "real", "text", "blob" or "null"
    pub storage: String,
    pub number: Option<f64>,
    pub text: Option<String>,
}

/// Access to the normalized data tables and their metadata passthrough tables
#[derive(Clone)]
pub struct StatRepository {
    pool: SqlitePool,
}

impl StatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Scoped connection; released when dropped
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        Ok(self.pool.acquire().await?)
    }

    /// Known column set of the data table for `kind`
    #[instrument(skip(self, conn))]
    pub async fn data_columns(
        &self,
        conn: &mut SqliteConnection,
        kind: TableKind,
    ) -> Result<Vec<String>, DbError> {
        let columns = table_columns(conn, kind.data_table()).await?;
        debug!("{} has {} columns", kind.data_table(), columns.len());
        Ok(columns)
    }

    /// Fetch `column` for every row matching (year, region_code).
    ///
    /// `column` must already be checked against `data_columns`. At most two rows
    /// are returned, enough for the caller to detect a uniqueness violation.
    #[instrument(skip(self, conn))]
    pub async fn find_cells(
        &self,
        conn: &mut SqliteConnection,
        kind: TableKind,
        year: i32,
        region_code: &str,
        column: &str,
    ) -> Result<Vec<StoredCell>, DbError> {
        let col = quote_identifier(column);
        let sql = format!(
            "SELECT typeof({col}) AS storage, CAST({col} AS REAL) AS number, CAST({col} AS TEXT) AS text \
             FROM {} WHERE {} = ? AND {} = ? LIMIT 2",
            quote_identifier(kind.data_table()),
            quote_identifier(YEAR_COLUMN),
            quote_identifier(REGION_CODE_COLUMN),
        );

        let cells = sqlx::query_as::<_, StoredCell>(&sql)
            .bind(year)
            .bind(region_code)
            .fetch_all(&mut *conn)
            .await?;

        debug!("Found {} matching rows", cells.len());
        Ok(cells)
    }

    /// Distinct years present in the data table, ascending
    #[instrument(skip(self, conn))]
    pub async fn distinct_years(
        &self,
        conn: &mut SqliteConnection,
        kind: TableKind,
    ) -> Result<Vec<i32>, DbError> {
        let sql = format!(
            "SELECT DISTINCT {year} FROM {} ORDER BY {year}",
            quote_identifier(kind.data_table()),
            year = quote_identifier(YEAR_COLUMN),
        );

        let years = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        debug!("Found {} distinct years", years.len());
        Ok(years.into_iter().map(|y| y as i32).collect())
    }

    /// Replace the data table for `kind` with `table`
    #[instrument(skip(self, tx, table), fields(rows = table.rows.len()))]
    pub async fn replace_data_table_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        kind: TableKind,
        table: &NormalizedTable,
    ) -> Result<(), DbError> {
        let name = kind.data_table();
        let defs: Vec<(String, &str)> = table
            .columns
            .iter()
            .map(|c| {
                let ty = match c.as_str() {
                    YEAR_COLUMN => "INTEGER NOT NULL",
                    REGION_CODE_COLUMN => "TEXT NOT NULL",
                    _ => "",
                };
                (c.clone(), ty)
            })
            .collect();
        recreate_table_tx(tx, name, &defs).await?;

        sqlx::query(&format!(
            "CREATE UNIQUE INDEX {} ON {} ({}, {})",
            quote_identifier(&format!("{name}_year_region")),
            quote_identifier(name),
            quote_identifier(YEAR_COLUMN),
            quote_identifier(REGION_CODE_COLUMN),
        ))
        .execute(&mut **tx)
        .await?;

        let insert_sql = insert_statement(name, table.columns.len());
        for row in &table.rows {
            insert_cells_tx(tx, &insert_sql, Some(i64::from(row.year)), &row.cells).await?;
        }

        info!("Wrote {} rows to {}", table.rows.len(), name);
        Ok(())
    }

    /// Replace the metadata passthrough table for `kind`
    #[instrument(skip(self, tx, table), fields(rows = table.rows.len()))]
    pub async fn replace_metadata_table_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        kind: TableKind,
        table: &MetadataTable,
    ) -> Result<(), DbError> {
        let name = kind.metadata_table();
        let defs: Vec<(String, &str)> = table.columns.iter().map(|c| (c.clone(), "")).collect();
        recreate_table_tx(tx, name, &defs).await?;

        let insert_sql = insert_statement(name, table.columns.len());
        for row in &table.rows {
            insert_cells_tx(tx, &insert_sql, None, row).await?;
        }

        info!("Wrote {} rows to {}", table.rows.len(), name);
        Ok(())
    }
}
