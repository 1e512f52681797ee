//! Region code table ("PROSTORSKI ŠIFRANT") extraction.
//!
//! The code sheet is a plain lookup table preceded by an unknown number of title
//! and blank rows. The first row whose marker column contains the code token is
//! the header; rows above it are discarded and trailing notes are filtered out.
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::grid::{is_data_row, Cell, RawGrid};
use crate::ingest::{column_names, IngestError, REGION_CODE_COLUMN, REGION_NAME_COLUMN};

/// One registry row: stable numeric code, display name, passthrough columns
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEntry {
    pub code: i64,
    pub name: String,
    pub extra: Vec<Cell>,
}

/// Bidirectional region code <-> name mapping. Codes and names are each unique.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    extra_columns: Vec<String>,
    entries: Vec<RegionEntry>,
    by_code: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
}

impl RegionRegistry {
    pub fn new(extra_columns: Vec<String>) -> Self {
        Self {
            extra_columns,
            ..Default::default()
        }
    }

    /// Add an entry, rejecting duplicate codes or names
    pub fn insert(&mut self, entry: RegionEntry) -> Result<(), IngestError> {
        if self.by_code.contains_key(&entry.code) {
            return Err(IngestError::structural(format!(
                "duplicate region code {}",
                entry.code
            )));
        }
        if self.by_name.contains_key(&entry.name) {
            return Err(IngestError::structural(format!(
                "duplicate region name '{}'",
                entry.name
            )));
        }

        let idx = self.entries.len();
        self.by_code.insert(entry.code, idx);
        self.by_name.insert(entry.name.clone(), idx);
        self.entries.push(entry);
        Ok(())
    }

    pub fn code_for(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).map(|&idx| self.entries[idx].code)
    }

    pub fn name_for(&self, code: i64) -> Option<&str> {
        self.by_code
            .get(&code)
            .map(|&idx| self.entries[idx].name.as_str())
    }

    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the region registry from the code sheet.
///
/// `code_column` holds both the header token and the numeric codes;
/// `name_column` holds the region names. No header row means a structural
/// failure; no entries are ever fabricated.
pub fn extract_code_table(
    grid: &RawGrid,
    code_column: usize,
    marker_token: &str,
    name_column: usize,
) -> Result<RegionRegistry, IngestError> {
    let header_idx = grid
        .iter()
        .position(|row| {
            row.get(code_column)
                .is_some_and(|cell| cell.contains_token(marker_token))
        })
        .ok_or_else(|| {
            warn!("No '{}' header found in code sheet", marker_token);
            IngestError::structural(format!("code sheet has no '{marker_token}' header row"))
        })?;

    let header = column_names(&grid[header_idx]);
    if name_column >= header.len() {
        return Err(IngestError::structural(format!(
            "code sheet header has no name column at index {name_column}"
        )));
    }
    debug!("Code sheet header at row {}: {:?}", header_idx, header);

    let extra_idx: Vec<usize> = (0..header.len())
        .filter(|&idx| idx != code_column && idx != name_column)
        .collect();
    let extra_columns: Vec<String> = extra_idx.iter().map(|&idx| header[idx].clone()).collect();

    // Stored column names compare case-insensitively
    if let Some(clash) = extra_columns.iter().find(|name| {
        name.eq_ignore_ascii_case(REGION_CODE_COLUMN)
            || name.eq_ignore_ascii_case(REGION_NAME_COLUMN)
    }) {
        return Err(IngestError::structural(format!(
            "code sheet column '{clash}' collides with a registry column"
        )));
    }

    let mut registry = RegionRegistry::new(extra_columns);

    for (offset, row) in grid[header_idx + 1..].iter().enumerate() {
        if !is_data_row(row) {
            continue;
        }
        let row_idx = header_idx + 1 + offset;

        let code = row
            .get(code_column)
            .and_then(Cell::as_number)
            .filter(|n| n.fract() == 0.0)
            .ok_or_else(|| {
                IngestError::structural(format!("row {row_idx} has no integral region code"))
            })? as i64;

        let name = row
            .get(name_column)
            .and_then(Cell::as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                IngestError::structural(format!("row {row_idx} has no region name"))
            })?;

        let extra = extra_idx
            .iter()
            .map(|&idx| row.get(idx).cloned().unwrap_or(Cell::Empty))
            .collect();

        registry.insert(RegionEntry { code, name, extra })?;
    }

    info!("Extracted {} regions from code sheet", registry.len());
    Ok(registry)
}
