// CSV/TSV import, result export

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use pricecheck_recon::model::{Cell, MatchResult, Table};
use pricecheck_recon::report;

/// UTF-8 byte order mark. Written on export so spreadsheet apps detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines with the same field count as line 1) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
///
/// A leading UTF-8 BOM is stripped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::debug!("{} is not valid UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text. The first non-blank record is the header row; blank rows are skipped.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table: Option<Table> = None;

    for (line_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("line {}: {e}", line_idx + 1))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match table.as_mut() {
            None => table = Some(Table::new(header_names(record.iter()))),
            Some(t) => t.push_row(record.iter().map(Cell::from_raw).collect()),
        }
    }

    table.ok_or_else(|| "file has no header row".to_string())
}

/// Header cells as column names: blanks become `Unnamed: <i>`, repeats get `.1`, `.2`, ...
pub(crate) fn header_names<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        names.push(candidate);
    }
    names
}

fn create_with_bom(path: &Path) -> Result<BufWriter<File>, String> {
    let file = File::create(path).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    Ok(out)
}

/// Write the result CSV (status, source_row, ... note) as UTF-8 with BOM.
pub fn export_results(results: &[MatchResult], path: &Path) -> Result<(), String> {
    let out = create_with_bom(path)?;
    report::write_csv(results, out).map_err(|e| e.to_string())
}

/// Write any table as UTF-8 CSV with BOM.
pub fn export_table(table: &Table, path: &Path) -> Result<(), String> {
    let out = create_with_bom(path)?;
    write_table(table, out)
}

/// Write a table as CSV to any writer (no BOM).
pub fn write_table<W: Write>(table: &Table, out: W) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(table.columns()).map_err(|e| e.to_string())?;
    for row in table.rows() {
        let record: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
