use std::collections::HashSet;
use tracing::{debug, info};

use crate::grid::{format_number, Cell};
use crate::ingest::{IngestError, YearBlock, REGION_CODE_COLUMN, YEAR_COLUMN};

/// One (year, region) observation. `cells` align with `NormalizedTable::columns[1..]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub year: i32,
    pub cells: Vec<Cell>,
}

/// Flat table built from all year blocks of one stacked sheet
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Unique column names, `Year` first
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    /// Position of `RegionCode` within a row's `cells`
    pub fn region_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .skip(1)
            .position(|c| c == REGION_CODE_COLUMN)
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Merge year blocks into one table using the first block's header as the
/// canonical schema.
///
/// `region_column` names the header column carrying the region identifier; it is
/// renamed to `RegionCode` and its values are stored as text. Every later block
/// must repeat the canonical header exactly.
pub fn unify_blocks(
    blocks: Vec<YearBlock>,
    region_column: &str,
) -> Result<NormalizedTable, IngestError> {
    let first = blocks
        .first()
        .ok_or_else(|| IngestError::structural("no year blocks to unify"))?;
    let canonical = first.header.clone();

    let region_idx = canonical
        .iter()
        .position(|name| name == region_column)
        .ok_or_else(|| {
            IngestError::structural(format!("region column '{region_column}' not in header"))
        })?;

    let columns = canonical_columns(&canonical, region_idx)?;
    let width = canonical.len();

    let mut rows = Vec::new();
    let mut seen: HashSet<(i32, String)> = HashSet::new();

    for block in blocks {
        if block.header != canonical {
            return Err(IngestError::SchemaMismatch {
                year: block.year,
                expected: canonical,
                found: block.header,
            });
        }

        let block_rows = block.rows.len();
        for (row_no, mut cells) in block.rows.into_iter().enumerate() {
            fit_width(&mut cells, width, block.year, row_no)?;

            let region_code = region_code_text(&cells[region_idx]).ok_or_else(|| {
                IngestError::structural(format!(
                    "missing region code in {} block, data row {}",
                    block.year, row_no
                ))
            })?;

            if !seen.insert((block.year, region_code.clone())) {
                return Err(IngestError::DuplicateObservation {
                    year: block.year,
                    region_code,
                });
            }

            cells[region_idx] = Cell::Text(region_code);
            rows.push(NormalizedRow {
                year: block.year,
                cells,
            });
        }
        debug!("Unified {} rows from {} block", block_rows, block.year);
    }

    info!(
        "Normalized table: {} columns, {} rows",
        columns.len(),
        rows.len()
    );
    Ok(NormalizedTable { columns, rows })
}

fn canonical_columns(header: &[String], region_idx: usize) -> Result<Vec<String>, IngestError> {
    let mut columns = Vec::with_capacity(header.len() + 1);
    columns.push(YEAR_COLUMN.to_string());

    for (idx, name) in header.iter().enumerate() {
        let name = if idx == region_idx {
            REGION_CODE_COLUMN.to_string()
        } else {
            name.clone()
        };
        if name.trim().is_empty() {
            return Err(IngestError::structural(format!(
                "blank header cell at column {idx}"
            )));
        }
        if columns.contains(&name) {
            return Err(IngestError::structural(format!(
                "duplicate column '{name}' in header"
            )));
        }
        columns.push(name);
    }

    Ok(columns)
}

/// Pad short rows with empty cells; rows wider than the header may only carry
/// empty trailing cells.
fn fit_width(
    cells: &mut Vec<Cell>,
    width: usize,
    year: i32,
    row_no: usize,
) -> Result<(), IngestError> {
    if cells.len() > width {
        if cells[width..].iter().any(|c| !c.is_empty()) {
            return Err(IngestError::structural(format!(
                "{year} block, data row {row_no} has values beyond the header"
            )));
        }
        cells.truncate(width);
    }
    cells.resize(width, Cell::Empty);
    Ok(())
}

fn region_code_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Number(n) => Some(format_number(*n)),
        Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
