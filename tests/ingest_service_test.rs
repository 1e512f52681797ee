// Tests for IngestService: workbook sheets to the relational store
// Covers normalization, wholesale replacement and abort-without-writing paths

mod common;

use common::{count_rows, fixture_sheets, ingested_pool, n, t, test_pool};
use stat_region_store::config::WorkbookLayout;
use stat_region_store::grid::Cell;
use stat_region_store::importers::WorkbookError;
use stat_region_store::ingest::IngestError;
use stat_region_store::services::IngestService;

async fn columns_of(pool: &sqlx::SqlitePool, table: &str) -> Vec<String> {
    sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(pool)
        .await
        .expect("Failed to read columns")
}

#[tokio::test]
async fn test_normalize_fixture_workbook() {
    let (_dir, pool) = test_pool().await;
    let service = IngestService::new(pool, WorkbookLayout::default());
    let sheets = fixture_sheets();

    let workbook = service.normalize(&sheets).unwrap();

    assert_eq!(
        workbook.persons.columns,
        vec!["Year", "RegionCode", "X", "Y", "Opomba"]
    );
    assert_eq!(workbook.persons.rows.len(), 4);
    assert_eq!(workbook.persons.years(), vec![2018, 2022]);
    assert_eq!(workbook.households.rows.len(), 3);
    assert_eq!(workbook.registry.len(), 3);
    assert_eq!(workbook.registry.code_for("Gorenjska"), Some(3));
    assert_eq!(workbook.person_metadata.rows.len(), 1);
}

#[tokio::test]
async fn test_ingest_writes_all_tables() {
    let (_dir, pool) = ingested_pool().await;

    assert_eq!(count_rows(&pool, "DATA_PERSONS").await, 4);
    assert_eq!(count_rows(&pool, "DATA_HOUSEHOLDS").await, 3);
    assert_eq!(count_rows(&pool, "SPATIAL_CODES").await, 3);
    assert_eq!(count_rows(&pool, "METADATA_PERSONS").await, 1);
    assert_eq!(count_rows(&pool, "METADATA_HOUSEHOLDS").await, 1);

    assert_eq!(
        columns_of(&pool, "DATA_PERSONS").await,
        vec!["Year", "RegionCode", "X", "Y", "Opomba"]
    );
    assert_eq!(
        columns_of(&pool, "SPATIAL_CODES").await,
        vec!["RegionCode", "RegionName"]
    );

    let codes: Vec<String> = sqlx::query_scalar(
        r#"SELECT "RegionCode" FROM "DATA_PERSONS" WHERE "Year" = 2018 ORDER BY "RegionCode""#,
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(codes, vec!["3", "5"]);
}

#[tokio::test]
async fn test_ingest_summary() {
    let (_dir, pool) = test_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let summary = service.ingest_sheets(fixture_sheets()).await.unwrap();
    assert_eq!(summary.person_rows, 4);
    assert_eq!(summary.person_years, vec![2018, 2022]);
    assert_eq!(summary.household_rows, 3);
    assert_eq!(summary.household_years, vec![2018, 2020]);
    assert_eq!(summary.regions, 3);
}

#[tokio::test]
async fn test_reingest_replaces_tables() {
    let (_dir, pool) = ingested_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let mut sheets = fixture_sheets();
    sheets.persons = vec![
        vec![Cell::Empty, t("Leto 2024")],
        vec![t("SR_12"), t("Z")],
        vec![n(3.0), n(99.0)],
    ];
    service.ingest_sheets(sheets).await.unwrap();

    assert_eq!(count_rows(&pool, "DATA_PERSONS").await, 1);
    assert_eq!(
        columns_of(&pool, "DATA_PERSONS").await,
        vec!["Year", "RegionCode", "Z"]
    );
}

#[tokio::test]
async fn test_schema_mismatch_aborts_and_keeps_store() {
    let (_dir, pool) = ingested_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let mut sheets = fixture_sheets();
    sheets.persons[8] = vec![t("SR_12"), t("Y"), t("X"), t("Opomba")];

    let result = service.ingest_sheets(sheets).await;
    match result {
        Err(IngestError::SchemaMismatch { year, .. }) => assert_eq!(year, 2022),
        other => panic!("Expected SchemaMismatch, got {other:?}"),
    }

    assert_eq!(count_rows(&pool, "DATA_PERSONS").await, 4);
    assert_eq!(
        columns_of(&pool, "DATA_PERSONS").await,
        vec!["Year", "RegionCode", "X", "Y", "Opomba"]
    );
}

#[tokio::test]
async fn test_sheet_without_marker_aborts() {
    let (_dir, pool) = test_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let mut sheets = fixture_sheets();
    sheets.households = vec![vec![t("SR_12"), t("Neto_preb")], vec![n(3.0), n(1.0)]];

    let result = service.ingest_sheets(sheets).await;
    assert!(matches!(result, Err(IngestError::StructuralParseFailure(_))));
    assert!(columns_of(&pool, "DATA_PERSONS").await.is_empty());
}

#[tokio::test]
async fn test_code_sheet_without_header_aborts() {
    let (_dir, pool) = test_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let mut sheets = fixture_sheets();
    sheets.codes = vec![vec![n(3.0), t("Gorenjska")]];

    let result = service.ingest_sheets(sheets).await;
    assert!(matches!(result, Err(IngestError::StructuralParseFailure(_))));
    assert!(columns_of(&pool, "SPATIAL_CODES").await.is_empty());
}

#[tokio::test]
async fn test_code_sheet_column_clash_aborts_before_writing() {
    let (_dir, pool) = ingested_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    let mut sheets = fixture_sheets();
    sheets.persons.truncate(5);
    sheets.codes[2].push(t("RegionName"));

    let result = service.ingest_sheets(sheets).await;
    assert!(matches!(result, Err(IngestError::StructuralParseFailure(_))));

    assert_eq!(count_rows(&pool, "DATA_PERSONS").await, 4);
    assert_eq!(count_rows(&pool, "SPATIAL_CODES").await, 3);
}

#[tokio::test]
async fn test_store_failure_rolls_back_whole_run() {
    let (_dir, pool) = ingested_pool().await;
    let service = IngestService::new(pool.clone(), WorkbookLayout::default());

    // A table squatting on the persons index name makes CREATE INDEX fail
    // after DATA_HOUSEHOLDS was already rewritten in the same transaction
    sqlx::query(r#"DROP INDEX "DATA_PERSONS_year_region""#)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(r#"CREATE TABLE "DATA_PERSONS_year_region" (placeholder INTEGER)"#)
        .execute(&pool)
        .await
        .unwrap();

    let mut sheets = fixture_sheets();
    sheets.households.truncate(3);

    let result = service.ingest_sheets(sheets).await;
    assert!(matches!(result, Err(IngestError::Store(_))));

    assert_eq!(count_rows(&pool, "DATA_HOUSEHOLDS").await, 3);
    assert_eq!(count_rows(&pool, "DATA_PERSONS").await, 4);
    assert_eq!(count_rows(&pool, "SPATIAL_CODES").await, 3);
}

#[tokio::test]
async fn test_missing_workbook_file() {
    let (_dir, pool) = test_pool().await;
    let service = IngestService::new(pool, WorkbookLayout::default());

    let result = service
        .ingest_workbook("/nonexistent/path/to/podatki.xlsx")
        .await;
    assert!(matches!(
        result,
        Err(IngestError::Workbook(WorkbookError::WorkbookOpen(_)))
    ));
}
