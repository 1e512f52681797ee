use tracing::debug;

use crate::grid::{Cell, RawGrid, RawRow};
use crate::ingest::IngestError;

/// Column-description sheet, stored verbatim with its first row as header
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl MetadataTable {
    pub fn from_grid(grid: &RawGrid) -> Result<Self, IngestError> {
        let (header, body) = grid
            .split_first()
            .ok_or_else(|| IngestError::structural("metadata sheet is empty"))?;

        let columns = column_names(header);
        if columns.is_empty() {
            return Err(IngestError::structural("metadata sheet has no header"));
        }

        let rows: Vec<RawRow> = body
            .iter()
            .map(|row| {
                let mut row: RawRow = row.iter().take(columns.len()).cloned().collect();
                row.resize(columns.len(), Cell::Empty);
                row
            })
            .collect();

        debug!(
            "Metadata table: {} columns, {} rows",
            columns.len(),
            rows.len()
        );
        Ok(Self { columns, rows })
    }
}

/// Turn a header row into unique column names.
///
/// Blank cells become `Unnamed: N`; repeated names get a `.N` suffix in order of
/// appearance. Trailing blank cells are ignored.
pub fn column_names(header: &[Cell]) -> Vec<String> {
    let width = header
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |last| last + 1);

    let mut names: Vec<String> = Vec::with_capacity(width);
    for (idx, cell) in header[..width].iter().enumerate() {
        let base = match cell.as_text() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => format!("Unnamed: {idx}"),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}
