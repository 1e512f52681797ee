#![allow(dead_code)]

use sqlx::SqlitePool;
use stat_region_store::config::WorkbookLayout;
use stat_region_store::db::connect_pool;
use stat_region_store::grid::{Cell, RawGrid};
use stat_region_store::services::{IngestService, WorkbookSheets};
use tempfile::TempDir;

/// Fresh sqlite store in its own temp directory.
/// Keep the TempDir alive for as long as the pool is used.
pub async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!("sqlite://{}", dir.path().join("stat_test.db").display());

    let pool = connect_pool(&database_url)
        .await
        .expect("Failed to connect to test database");

    (dir, pool)
}

pub fn n(value: f64) -> Cell {
    Cell::Number(value)
}

pub fn t(value: &str) -> Cell {
    Cell::text(value)
}

pub fn person_sheet() -> RawGrid {
    vec![
        vec![t("PODATKI_OSEBE")],
        vec![Cell::Empty, t("Leto 2018")],
        vec![t("SR_12"), t("X"), t("Y"), t("Opomba")],
        vec![n(3.0), n(10.0), n(1.5), t("ok")],
        vec![n(5.0), n(14.0), Cell::Empty, t("ok")],
        vec![t("Vir: SURS, anketa o kakovosti življenja")],
        vec![Cell::Empty],
        vec![Cell::Empty, t("Leto 2022")],
        vec![t("SR_12"), t("X"), t("Y"), t("Opomba")],
        vec![n(3.0), n(20.0), n(2.5), t("ok")],
        vec![n(5.0), n(16.0), t("n.p."), t("ok")],
        vec![t("* začasni podatki")],
    ]
}

pub fn household_sheet() -> RawGrid {
    vec![
        vec![Cell::Empty, t("Leto 2018")],
        vec![t("SR_12"), t("Neto_preb")],
        vec![n(3.0), n(1200.0)],
        vec![n(5.0), n(1100.0)],
        vec![Cell::Empty, t("Leto 2020")],
        vec![t("SR_12"), t("Neto_preb")],
        vec![n(3.0), n(1300.0)],
    ]
}

pub fn code_sheet() -> RawGrid {
    vec![
        vec![t("PROSTORSKI ŠIFRANT")],
        vec![Cell::Empty],
        vec![t("Šifra statistične regije"), t("Ime statistične regije")],
        vec![n(3.0), t("Gorenjska")],
        vec![n(5.0), t("Koroška")],
        vec![n(7.0), t("Obalno-kraška")],
        vec![t("Vir: SURS")],
    ]
}

pub fn metadata_sheet() -> RawGrid {
    vec![
        vec![t("Ime spremenljivke"), t("Opis")],
        vec![t("X"), t("Testna spremenljivka")],
    ]
}

pub fn fixture_sheets() -> WorkbookSheets {
    WorkbookSheets {
        households: household_sheet(),
        persons: person_sheet(),
        codes: code_sheet(),
        household_metadata: metadata_sheet(),
        person_metadata: metadata_sheet(),
    }
}

/// Store loaded with the fixture workbook
pub async fn ingested_pool() -> (TempDir, SqlitePool) {
    let (dir, pool) = test_pool().await;
    IngestService::new(pool.clone(), WorkbookLayout::default())
        .ingest_sheets(fixture_sheets())
        .await
        .expect("Failed to ingest fixture workbook");
    (dir, pool)
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
