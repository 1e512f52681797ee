use stat_region_store::config::WorkbookLayout;
use stat_region_store::importers::WorkbookReader;
use stat_region_store::ingest::{extract_code_table, split_sections};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let file_path = if args.len() > 1 {
        args[1].as_str()
    } else {
        "data/raw/9_EvropskeStatIgre_naloga2_podatki.xlsx"
    };

    let layout = WorkbookLayout::from_env();
    let reader = WorkbookReader::new(file_path);

    println!("Opening workbook: {file_path}");
    println!("\nSheet names:");
    for (i, name) in reader.sheet_names()?.iter().enumerate() {
        println!("  {i}: {name}");
    }

    // Allow specifying which sheet to examine
    let sheet_name = if args.len() > 2 {
        args[2].clone()
    } else {
        layout.person_sheet.clone()
    };

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let grid = reader.read_sheet(&sheet_name)?;
    println!("Rows: {}", grid.len());
    println!("\nFirst 40 rows (showing first 10 columns):");
    println!("{}", "=".repeat(100));

    for (row_idx, row) in grid.iter().enumerate().take(40) {
        // Only print rows with data
        if row.iter().any(|cell| !cell.is_empty()) {
            print!("Row {:3}: ", row_idx + 1);
            for cell in row.iter().take(10) {
                if cell.is_empty() {
                    print!("[empty] ");
                } else {
                    print!("[{cell}] ");
                }
            }
            println!();
        }
    }

    println!("\n{}", "=".repeat(100));
    if sheet_name == layout.code_sheet {
        let registry = extract_code_table(
            &grid,
            layout.code_marker_column,
            &layout.code_marker,
            layout.region_name_column,
        )?;
        println!("Regions found: {}", registry.len());
        for entry in registry.entries() {
            println!("  {:3}  {}", entry.code, entry.name);
        }
    } else {
        let blocks = split_sections(&grid, layout.year_marker_column, &layout.year_marker)?;
        println!("Year blocks found: {}", blocks.len());
        for block in &blocks {
            println!(
                "  {}: {} columns, {} data rows",
                block.year,
                block.header.len(),
                block.rows.len()
            );
        }
    }

    Ok(())
}
