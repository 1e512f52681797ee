// Identifier handling for tables whose columns come from the workbook.
//
// Column names are never trusted: callers check them against `table_columns`
// first, and every identifier that reaches SQL text goes through
// `quote_identifier`. Values are always bound.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::debug;

use crate::db::DbError;
use crate::grid::Cell;

/// Quote an identifier for SQLite, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names of `table` in declaration order; empty if the table does not exist
pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<String>, DbError> {
    let columns = sqlx::query_scalar::<_, String>(
        "SELECT name FROM pragma_table_info(?) ORDER BY cid",
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    Ok(columns)
}

/// Drop and recreate `table` with the given column definitions
/// (`(name, declared type)`; an empty type leaves the column untyped).
pub async fn recreate_table_tx(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    columns: &[(String, &str)],
) -> Result<(), DbError> {
    let table_ident = quote_identifier(table);
    sqlx::query(&format!("DROP TABLE IF EXISTS {table_ident}"))
        .execute(&mut **tx)
        .await?;

    let defs: Vec<String> = columns
        .iter()
        .map(|(name, ty)| format!("{} {}", quote_identifier(name), ty).trim_end().to_string())
        .collect();
    let ddl = format!("CREATE TABLE {table_ident} ({})", defs.join(", "));
    debug!("{}", ddl);

    sqlx::query(&ddl).execute(&mut **tx).await?;
    Ok(())
}

/// Insert one row of cells into `table` (all columns, declaration order)
pub async fn insert_cells_tx(
    tx: &mut Transaction<'_, Sqlite>,
    insert_sql: &str,
    leading: Option<i64>,
    cells: &[Cell],
) -> Result<(), DbError> {
    let mut query = sqlx::query(insert_sql);
    if let Some(value) = leading {
        query = query.bind(value);
    }
    for cell in cells {
        query = match cell {
            Cell::Number(n) => query.bind(*n),
            Cell::Text(s) => query.bind(s.clone()),
            Cell::Empty => query.bind(Option::<String>::None),
        };
    }
    query.execute(&mut **tx).await?;
    Ok(())
}

/// `INSERT INTO "table" VALUES (?, ?, ...)` for `width` columns
pub fn insert_statement(table: &str, width: usize) -> String {
    let placeholders = vec!["?"; width].join(", ");
    format!(
        "INSERT INTO {} VALUES ({placeholders})",
        quote_identifier(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Neto_preb"), "\"Neto_preb\"");
        assert_eq!(quote_identifier("Ocena_življ"), "\"Ocena_življ\"");
        assert_eq!(
            quote_identifier("x\"; DROP TABLE DATA_PERSONS; --"),
            "\"x\"\"; DROP TABLE DATA_PERSONS; --\""
        );
    }

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            insert_statement("SPATIAL_CODES", 3),
            "INSERT INTO \"SPATIAL_CODES\" VALUES (?, ?, ?)"
        );
    }
}
