// Excel import (xlsx, xlsm, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use pricecheck_recon::model::{Cell, Table};

use crate::csv::header_names;

/// Import the first worksheet of an Excel file.
pub fn import(path: &Path) -> Result<Table, String> {
    import_sheet(path, None)
}

/// Import a named worksheet (or the first one when `sheet` is `None`).
///
/// The first non-blank row is the header row.
pub fn import_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| format!("sheet '{}' not found (have: {})", name, sheet_names.join(", ")))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut table: Option<Table> = None;
    for row in range.rows() {
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        match table.as_mut() {
            None => {
                let raw: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
                table = Some(Table::new(header_names(raw.iter().map(|s| s.as_str()))));
            }
            Some(t) => t.push_row(cells),
        }
    }

    table.ok_or_else(|| format!("sheet '{}' is empty", sheet_name))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_raw(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        // Store as TRUE/FALSE text like a spreadsheet would display it
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Serial date number; price lists rarely carry dates
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        // ISO date/duration strings and error values keep their display text
        other => Cell::from(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_conversion() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(cell_from_data(&Data::String(String::new())), Cell::Empty);
        assert_eq!(cell_from_data(&Data::String("64GB".into())), Cell::from("64GB"));
        assert_eq!(cell_from_data(&Data::Float(123.0)), Cell::Number(123.0));
        assert_eq!(cell_from_data(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(cell_from_data(&Data::Bool(true)), Cell::from("TRUE"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = import(Path::new("/nonexistent/prices.xlsx")).unwrap_err();
        assert!(err.contains("Failed to open Excel file"));
    }
}
