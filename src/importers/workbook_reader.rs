use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;
use tracing::{debug, info};

use crate::grid::{Cell, RawGrid};

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

/// Reader for the statistical workbook (.xlsx)
///
/// Sheets are returned as raw grids with absolute positions preserved: a sheet
/// whose used range starts at B3 still has its first value at row 2, column 1.
#[derive(Debug, Clone)]
pub struct WorkbookReader {
    workbook_path: String,
}

impl WorkbookReader {
    pub fn new(workbook_path: impl Into<String>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.workbook_path
    }

    // Opening is synchronous, async callers should use spawn_blocking
    fn open(&self) -> Result<Xlsx<BufReader<File>>, WorkbookError> {
        open_workbook::<Xlsx<_>, _>(&self.workbook_path)
            .map_err(|e| WorkbookError::WorkbookOpen(e.to_string()))
    }

    pub fn sheet_names(&self) -> Result<Vec<String>, WorkbookError> {
        Ok(self.open()?.sheet_names())
    }

    /// Read a single sheet into a raw grid
    pub fn read_sheet(&self, sheet_name: &str) -> Result<RawGrid, WorkbookError> {
        let mut workbook = self.open()?;
        read_range(&mut workbook, sheet_name)
    }

    /// Read several sheets with one open of the workbook, in the order requested
    pub fn read_sheets(&self, sheet_names: &[&str]) -> Result<Vec<RawGrid>, WorkbookError> {
        info!("Reading {} sheets from {}", sheet_names.len(), self.workbook_path);
        let mut workbook = self.open()?;
        sheet_names
            .iter()
            .map(|name| read_range(&mut workbook, name))
            .collect()
    }
}

fn read_range(
    workbook: &mut Xlsx<BufReader<File>>,
    sheet_name: &str,
) -> Result<RawGrid, WorkbookError> {
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|_| WorkbookError::SheetNotFound(sheet_name.to_string()))?;

    let grid = grid_from_range(&range);
    debug!("Sheet {}: {} rows", sheet_name, grid.len());
    Ok(grid)
}

/// Convert a calamine range to a raw grid anchored at A1
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut grid: RawGrid = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(cell_from_data));
        grid.push(cells);
    }
    grid
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_reader_creation() {
        let reader = WorkbookReader::new("podatki.xlsx");
        assert_eq!(reader.path(), "podatki.xlsx");
    }

    #[test]
    fn test_grid_from_range_converts_cells() {
        let mut range = Range::new((0, 0), (1, 2));
        range.set_value((0, 1), Data::String("Leto 2018".to_string()));
        range.set_value((1, 0), Data::Int(3));
        range.set_value((1, 1), Data::Float(12.5));
        range.set_value((1, 2), Data::Bool(true));

        let grid = grid_from_range(&range);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][0], Cell::Empty);
        assert_eq!(grid[0][1], Cell::text("Leto 2018"));
        assert_eq!(grid[1][0], Cell::Number(3.0));
        assert_eq!(grid[1][1], Cell::Number(12.5));
        assert_eq!(grid[1][2], Cell::text("true"));
    }

    #[test]
    fn test_grid_from_range_keeps_absolute_positions() {
        let mut range = Range::new((2, 1), (2, 1));
        range.set_value((2, 1), Data::String("Leto 2022".to_string()));

        let grid = grid_from_range(&range);
        assert_eq!(grid.len(), 3);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2], vec![Cell::Empty, Cell::text("Leto 2022")]);
    }
}
