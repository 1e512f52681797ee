//! Raw sheet values as read from the workbook, before any normalization.
//!
//! A sheet is modelled as rows of heterogeneous cells. Nothing here knows about
//! year blocks or code tables; it only answers "what does this cell hold".
use std::fmt;

/// A single workbook cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

/// One row of a sheet
pub type RawRow = Vec<Cell>;

/// One sheet: ordered rows, each an ordered sequence of cells
pub type RawGrid = Vec<RawRow>;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Coerce the cell to a number the way a lenient spreadsheet reader would:
    /// numbers pass through, text is parsed after trimming, everything else is None.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Cell rendered as text, None for empty cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
        }
    }

    /// True if the cell's text contains `token` (case-sensitive)
    pub fn contains_token(&self, token: &str) -> bool {
        match self {
            Cell::Text(s) => s.contains(token),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => Ok(()),
        }
    }
}

/// Integral numbers print without a fraction ("3", not "3.0")
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Returns true iff the row's first cell is coercible to a number.
///
/// Header repeats, blank separators and footnotes interleaved with data all fail
/// this check and are dropped silently.
pub fn is_data_row(row: &[Cell]) -> bool {
    row.first().and_then(Cell::as_number).is_some()
}
