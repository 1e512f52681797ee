use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::config::WorkbookLayout;
use crate::db::{DbError, RegionRepository, StatRepository, TableKind};
use crate::grid::RawGrid;
use crate::importers::WorkbookReader;
use crate::ingest::{
    extract_code_table, split_sections, unify_blocks, IngestError, MetadataTable,
    NormalizedTable, RegionRegistry,
};

/// The five raw sheets one ingestion run consumes
#[derive(Debug, Clone, Default)]
pub struct WorkbookSheets {
    pub households: RawGrid,
    pub persons: RawGrid,
    pub codes: RawGrid,
    pub household_metadata: RawGrid,
    pub person_metadata: RawGrid,
}

/// Everything an ingestion run writes, fully built before the store is touched
#[derive(Debug, Clone)]
pub struct NormalizedWorkbook {
    pub households: NormalizedTable,
    pub persons: NormalizedTable,
    pub registry: RegionRegistry,
    pub household_metadata: MetadataTable,
    pub person_metadata: MetadataTable,
}

/// Counts reported after a successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub household_rows: usize,
    pub household_years: Vec<i32>,
    pub person_rows: usize,
    pub person_years: Vec<i32>,
    pub regions: usize,
    pub elapsed_ms: u128,
}

/// Service for turning the statistical workbook into the relational store.
///
/// Every run replaces all five tables wholesale inside one transaction; a
/// structural failure anywhere aborts the run before anything is written.
#[derive(Clone)]
pub struct IngestService {
    pool: SqlitePool,
    stat_repo: StatRepository,
    region_repo: RegionRepository,
    layout: WorkbookLayout,
}

impl IngestService {
    pub fn new(pool: SqlitePool, layout: WorkbookLayout) -> Self {
        Self {
            stat_repo: StatRepository::new(pool.clone()),
            region_repo: RegionRepository::new(pool.clone()),
            pool,
            layout,
        }
    }

    /// Read the workbook at `path` and ingest it
    #[instrument(skip(self))]
    pub async fn ingest_workbook(&self, path: &str) -> Result<IngestSummary, IngestError> {
        info!("Reading workbook {}", path);
        let reader = WorkbookReader::new(path);
        let layout = self.layout.clone();

        let mut grids = tokio::task::spawn_blocking(move || {
            reader.read_sheets(&[
                layout.household_sheet.as_str(),
                layout.person_sheet.as_str(),
                layout.code_sheet.as_str(),
                layout.household_metadata_sheet.as_str(),
                layout.person_metadata_sheet.as_str(),
            ])
        })
        .await??
        .into_iter();

        let mut next = || grids.next().unwrap_or_default();
        let sheets = WorkbookSheets {
            households: next(),
            persons: next(),
            codes: next(),
            household_metadata: next(),
            person_metadata: next(),
        };

        self.ingest_sheets(sheets).await
    }

    /// Normalize already-read sheets and replace the store contents
    pub async fn ingest_sheets(
        &self,
        sheets: WorkbookSheets,
    ) -> Result<IngestSummary, IngestError> {
        let start_time = Instant::now();

        let workbook = self.normalize(&sheets).map_err(|e| {
            error!(error = %e, "Ingestion aborted, store left unchanged");
            e
        })?;
        self.persist(&workbook).await?;

        let summary = IngestSummary {
            household_rows: workbook.households.rows.len(),
            household_years: workbook.households.years(),
            person_rows: workbook.persons.rows.len(),
            person_years: workbook.persons.years(),
            regions: workbook.registry.len(),
            elapsed_ms: start_time.elapsed().as_millis(),
        };
        info!(
            "Ingestion complete: {} household rows, {} person rows, {} regions",
            summary.household_rows, summary.person_rows, summary.regions
        );
        Ok(summary)
    }

    /// Build every table from the raw sheets without touching the store
    pub fn normalize(&self, sheets: &WorkbookSheets) -> Result<NormalizedWorkbook, IngestError> {
        let layout = &self.layout;

        let households = self.normalize_stacked(&sheets.households, &layout.household_sheet)?;
        let persons = self.normalize_stacked(&sheets.persons, &layout.person_sheet)?;

        info!("Processing {}", layout.code_sheet);
        let registry = extract_code_table(
            &sheets.codes,
            layout.code_marker_column,
            &layout.code_marker,
            layout.region_name_column,
        )?;
        if registry.is_empty() {
            warn!("Code sheet {} yielded no regions", layout.code_sheet);
        }

        let household_metadata = MetadataTable::from_grid(&sheets.household_metadata)?;
        let person_metadata = MetadataTable::from_grid(&sheets.person_metadata)?;

        Ok(NormalizedWorkbook {
            households,
            persons,
            registry,
            household_metadata,
            person_metadata,
        })
    }

    fn normalize_stacked(
        &self,
        grid: &RawGrid,
        sheet: &str,
    ) -> Result<NormalizedTable, IngestError> {
        info!("Processing {}", sheet);
        let blocks = split_sections(
            grid,
            self.layout.year_marker_column,
            &self.layout.year_marker,
        )?;

        if blocks.is_empty() {
            return Err(IngestError::structural(format!(
                "no '{}' marker found in sheet {sheet}",
                self.layout.year_marker
            )));
        }

        unify_blocks(blocks, &self.layout.region_column)
    }

    /// Replace all five tables in a single transaction
    #[instrument(skip(self, workbook))]
    pub async fn persist(&self, workbook: &NormalizedWorkbook) -> Result<(), IngestError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        self.stat_repo
            .replace_data_table_tx(&mut tx, TableKind::Household, &workbook.households)
            .await?;
        self.stat_repo
            .replace_data_table_tx(&mut tx, TableKind::Person, &workbook.persons)
            .await?;
        self.region_repo
            .replace_registry_tx(&mut tx, &workbook.registry)
            .await?;
        self.stat_repo
            .replace_metadata_table_tx(&mut tx, TableKind::Household, &workbook.household_metadata)
            .await?;
        self.stat_repo
            .replace_metadata_table_tx(&mut tx, TableKind::Person, &workbook.person_metadata)
            .await?;

        tx.commit().await.map_err(DbError::from)?;
        info!("Store replaced");
        Ok(())
    }
}
