//! Splits a stacked sheet into per-year blocks.
//!
//! # Expected Sheet Structure:
//! ```text
//! Row k:     [ ] [Leto 2018] ...          <- marker row
//! Row k+1:   [SR_12] [Neto_preb] ...      <- header row
//! Row k+2..: [1] [1234.5] ...             <- data rows (notes and blanks dropped)
//! Row m:     [ ] [Leto 2022] ...          <- next marker
//! ```
use regex::Regex;
use tracing::{debug, warn};

use crate::grid::{is_data_row, Cell, RawGrid, RawRow};
use crate::ingest::IngestError;

/// One year's table as found in the stacked sheet
#[derive(Debug, Clone, PartialEq)]
pub struct YearBlock {
    pub year: i32,
    /// Header row cells rendered as text, trailing blanks removed
    pub header: Vec<String>,
    /// Data rows that passed the validity filter
    pub rows: Vec<RawRow>,
}

/// Extract the year from a marker cell ("Leto 2018" -> 2018): the first run of digits
pub fn extract_year(marker: &str) -> Option<i32> {
    let re = Regex::new(r"\d+").ok()?;
    re.find(marker)?.as_str().parse::<i32>().ok()
}

/// Find every block in `grid` whose marker cell (in `marker_column`) contains
/// `marker_token`.
///
/// Returns an empty vector when no marker is present. A marker without an
/// extractable year, or without a header row, is a structural failure.
pub fn split_sections(
    grid: &RawGrid,
    marker_column: usize,
    marker_token: &str,
) -> Result<Vec<YearBlock>, IngestError> {
    let section_starts: Vec<usize> = grid
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.get(marker_column)
                .is_some_and(|cell| cell.contains_token(marker_token))
        })
        .map(|(idx, _)| idx)
        .collect();

    if section_starts.is_empty() {
        warn!("No '{}' markers found in column {}", marker_token, marker_column);
        return Ok(Vec::new());
    }

    let mut blocks = Vec::with_capacity(section_starts.len());

    for (i, &start_idx) in section_starts.iter().enumerate() {
        let marker_text = grid[start_idx][marker_column].to_string();
        let year = extract_year(&marker_text).ok_or_else(|| {
            IngestError::structural(format!(
                "marker '{marker_text}' at row {start_idx} has no year"
            ))
        })?;

        let end_idx = section_starts.get(i + 1).copied().unwrap_or(grid.len());
        let header_idx = start_idx + 1;
        if header_idx >= end_idx {
            return Err(IngestError::structural(format!(
                "marker '{marker_text}' at row {start_idx} has no header row"
            )));
        }

        let header = header_names(&grid[header_idx]);
        let total = end_idx - header_idx - 1;
        let rows: Vec<RawRow> = grid[header_idx + 1..end_idx]
            .iter()
            .filter(|row| is_data_row(row))
            .cloned()
            .collect();

        debug!(
            "Block {}: header row {}, {} data rows ({} dropped)",
            year,
            header_idx,
            rows.len(),
            total - rows.len()
        );

        blocks.push(YearBlock { year, header, rows });
    }

    Ok(blocks)
}

fn header_names(row: &[Cell]) -> Vec<String> {
    let width = row
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |last| last + 1);
    row[..width]
        .iter()
        .map(|cell| {
            cell.as_text()
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}
