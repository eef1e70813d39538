use std::collections::BTreeMap;
use std::io::Write;

use crate::error::ReconError;
use crate::model::{format_number, Cell, MatchResult, MatchStatus, ReconReport, ReportSummary, Table};

/// Header of the result CSV. Downstream report consumers rely on this order.
pub const RESULT_COLUMNS: [&str; 10] = [
    "status",
    "source_row",
    "model",
    "capacity",
    "color",
    "grade",
    "bid_price",
    "expected_price",
    "delta",
    "note",
];

/// Columns appended to table B in [`result_table`].
pub const APPENDED_COLUMNS: [&str; 4] = ["status", "expected_price", "delta", "note"];

/// Rendering of a missing expected price or delta.
pub const NOT_AVAILABLE: &str = "N/A";

/// Compute summary statistics from per-row results.
pub fn compute_summary(results: &[MatchResult]) -> ReportSummary {
    let mut status_counts: BTreeMap<String, usize> = MatchStatus::ALL
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut matched = 0;
    let mut needs_review = 0;
    let mut no_model_capacity_match = 0;
    let mut no_grade_match = 0;

    for r in results {
        *status_counts.entry(r.status.to_string()).or_insert(0) += 1;

        match r.status {
            MatchStatus::Matched => matched += 1,
            MatchStatus::NeedsReview => needs_review += 1,
            MatchStatus::NoModelCapacityMatch => no_model_capacity_match += 1,
            MatchStatus::NoGradeMatch => no_grade_match += 1,
        }
    }

    let total = results.len();
    let errors = results.iter().filter(|r| r.status.is_error()).count();
    let success = total - errors - needs_review;
    let success_pct = if total == 0 {
        None
    } else {
        Some(success as f64 / total as f64 * 100.0)
    };

    ReportSummary {
        total,
        matched,
        needs_review,
        no_model_capacity_match,
        no_grade_match,
        errors,
        success,
        success_pct,
        status_counts,
    }
}

fn price_cell(value: Option<f64>) -> Cell {
    match value {
        Some(n) => Cell::Number(n),
        None => Cell::Text(NOT_AVAILABLE.to_string()),
    }
}

/// The full bid table with status, expected price, delta and note appended.
///
/// An appended name already used by the bid table gets a `.1`, `.2`, ... suffix.
pub fn result_table(results: &[MatchResult], bid_columns: &[String]) -> Table {
    let mut columns = bid_columns.to_vec();
    for name in APPENDED_COLUMNS {
        let mut candidate = name.to_string();
        let mut n = 1;
        while columns.contains(&candidate) {
            candidate = format!("{name}.{n}");
            n += 1;
        }
        columns.push(candidate);
    }

    let mut table = Table::new(columns);
    for r in results {
        let mut row = r.fields.clone();
        row.resize(bid_columns.len(), Cell::Empty);
        row.push(Cell::Text(r.status.to_string()));
        row.push(price_cell(r.expected_price));
        row.push(price_cell(r.delta));
        row.push(Cell::from(r.note.as_str()));
        table.push_row(row);
    }
    table
}

fn render_price(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Write results as CSV with the [`RESULT_COLUMNS`] header.
pub fn write_csv<W: Write>(results: &[MatchResult], writer: W) -> Result<(), ReconError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(RESULT_COLUMNS)
        .map_err(|e| ReconError::Output(e.to_string()))?;

    for r in results {
        let record = [
            r.status.to_string(),
            r.source_row.to_string(),
            r.model.to_string(),
            r.capacity.to_string(),
            r.color.to_string(),
            r.grade.to_string(),
            r.bid_price.to_string(),
            render_price(r.expected_price),
            render_price(r.delta),
            r.note.clone(),
        ];
        csv.write_record(&record)
            .map_err(|e| ReconError::Output(e.to_string()))?;
    }

    csv.flush().map_err(|e| ReconError::Output(e.to_string()))
}

/// Pretty JSON of a full run.
pub fn to_json(report: &ReconReport) -> Result<String, ReconError> {
    serde_json::to_string_pretty(report).map_err(|e| ReconError::Output(e.to_string()))
}
