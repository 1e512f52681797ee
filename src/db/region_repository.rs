use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, instrument};

use crate::db::schema::{insert_cells_tx, insert_statement, recreate_table_tx};
use crate::db::{DbError, Region, SPATIAL_CODES};
use crate::grid::Cell;
use crate::ingest::{RegionRegistry, REGION_CODE_COLUMN, REGION_NAME_COLUMN};

/// Access to the persisted region registry (`SPATIAL_CODES`)
#[derive(Clone)]
pub struct RegionRepository {
    pool: SqlitePool,
}

impl RegionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Scoped connection; released when dropped
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        Ok(self.pool.acquire().await?)
    }

    #[instrument(skip(self, conn))]
    pub async fn find_code_by_name(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<i64>, DbError> {
        let code = sqlx::query_scalar::<_, i64>(
            r#"SELECT "RegionCode" FROM "SPATIAL_CODES" WHERE "RegionName" = ?"#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        debug!("Region name lookup: {:?}", code);
        Ok(code)
    }

    #[instrument(skip(self, conn))]
    pub async fn find_name_by_code(
        &self,
        conn: &mut SqliteConnection,
        code: i64,
    ) -> Result<Option<String>, DbError> {
        let name = sqlx::query_scalar::<_, String>(
            r#"SELECT "RegionName" FROM "SPATIAL_CODES" WHERE "RegionCode" = ?"#,
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

        debug!("Region code lookup: {:?}", name);
        Ok(name)
    }

    /// All regions, ordered by code
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Region>, DbError> {
        let mut conn = self.acquire().await?;
        let regions = sqlx::query_as::<_, Region>(
            r#"
            SELECT "RegionCode" AS code, "RegionName" AS name
            FROM "SPATIAL_CODES"
            ORDER BY "RegionCode"
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        debug!("Found {} regions", regions.len());
        Ok(regions)
    }

    /// Replace `SPATIAL_CODES` with the registry contents
    #[instrument(skip(self, tx, registry), fields(count = registry.len()))]
    pub async fn replace_registry_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        registry: &RegionRegistry,
    ) -> Result<(), DbError> {
        let mut defs: Vec<(String, &str)> = vec![
            (REGION_CODE_COLUMN.to_string(), "INTEGER PRIMARY KEY"),
            (REGION_NAME_COLUMN.to_string(), "TEXT NOT NULL UNIQUE"),
        ];
        defs.extend(registry.extra_columns().iter().map(|c| (c.clone(), "")));
        recreate_table_tx(tx, SPATIAL_CODES, &defs).await?;

        let insert_sql = insert_statement(SPATIAL_CODES, defs.len());
        for entry in registry.entries() {
            let mut cells = Vec::with_capacity(entry.extra.len() + 1);
            cells.push(Cell::Text(entry.name.clone()));
            cells.extend(entry.extra.iter().cloned());
            insert_cells_tx(tx, &insert_sql, Some(entry.code), &cells).await?;
        }

        info!("Wrote {} regions to {}", registry.len(), SPATIAL_CODES);
        Ok(())
    }
}
