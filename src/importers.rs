// ! Workbook importers: spreadsheet files to raw value grids

pub mod workbook_reader;

// Re-export commonly used items
pub use workbook_reader::{grid_from_range, WorkbookError, WorkbookReader};
