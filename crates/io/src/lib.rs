// File I/O operations

pub mod csv;
pub mod samples;
pub mod xlsx;

use std::path::Path;

use pricecheck_recon::model::Table;

/// Load a table, picking the reader by file extension.
pub fn load_table(path: &Path) -> Result<Table, String> {
    load_table_sheet(path, None)
}

/// Like [`load_table`], reading the named worksheet of a workbook.
///
/// A sheet name on a CSV/TSV file is an error.
pub fn load_table_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let is_workbook = matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "xlsb" | "ods");
    if let (Some(name), false) = (sheet, is_workbook) {
        return Err(format!(
            "{}: sheet '{name}' given, but the file is not a workbook",
            path.display()
        ));
    }

    let table = match ext.as_str() {
        "csv" | "txt" => crate::csv::import(path)?,
        "tsv" | "tab" => crate::csv::import_tsv(path)?,
        _ if is_workbook => xlsx::import_sheet(path, sheet)
            .map_err(|e| format!("{}: {e}", path.display()))?,
        "" => return Err(format!("{}: file has no extension", path.display())),
        other => {
            return Err(format!(
                "{}: unsupported file type '.{other}' (expected csv, tsv, xlsx, xls, xlsb or ods)",
                path.display()
            ))
        }
    };

    log::debug!(
        "loaded {}: {} columns, {} rows",
        path.display(),
        table.columns().len(),
        table.len()
    );
    Ok(table)
}
