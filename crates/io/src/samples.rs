// Example input files

use std::path::{Path, PathBuf};

use pricecheck_recon::model::{Cell, Table};

use crate::csv::export_table;

pub const STANDARD_FILE: &str = "sample_standard.csv";
pub const BIDS_FILE: &str = "sample_bids.csv";

fn table(columns: &[&str], rows: &[Vec<Cell>]) -> Table {
    let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        t.push_row(row.clone());
    }
    t
}

/// Standard price list with per-color price adjustment columns.
pub fn standard_table() -> Table {
    table(
        &["Model", "GB", "Grade", "價格", "Red", "White"],
        &[
            vec!["iPhone 12".into(), "64GB".into(), "DLS B+".into(), 123i64.into(), (-3i64).into(), 1i64.into()],
            vec!["iPhone 13".into(), "128GB".into(), "TPS B+".into(), 202i64.into(), (-3i64).into(), 1i64.into()],
        ],
    )
}

pub fn bids_table() -> Table {
    table(
        &["Model", "Capacity", "Color", "Grade", "Bid Price"],
        &[
            vec!["iPhone 12".into(), "64GB".into(), "Red".into(), "DLS B+".into(), 120i64.into()],
            vec!["iPhone 13".into(), "128GB".into(), "White".into(), "TPS B+".into(), 203i64.into()],
        ],
    )
}

/// Write both example files into `dir`, returning their paths.
pub fn write_samples(dir: &Path) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;

    let standard = dir.join(STANDARD_FILE);
    let bids = dir.join(BIDS_FILE);
    export_table(&standard_table(), &standard)?;
    export_table(&bids_table(), &bids)?;
    Ok(vec![standard, bids])
}
