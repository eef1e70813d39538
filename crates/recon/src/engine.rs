use log::{debug, trace};

use crate::config::ReconConfig;
use crate::detect::detect_columns;
use crate::error::ReconError;
use crate::matcher::{match_bid, normalize_bids, normalize_standard, MatchOutcome, StandardIndex};
use crate::model::{
    ColumnRoleMap, MatchResult, MatchStatus, ReconMeta, ReconReport, ReportSummary, Role,
    RoleMaps, RowView, Table, TableSide,
};
use crate::pricing::{PriceCalculator, PriceContext};
use crate::report::compute_summary;

/// Spreadsheet row number of a zero-based data row (row 1 is the header).
fn sheet_row(index: usize) -> usize {
    index + 2
}

/// Match every bid (table B) row against the standard-price table (table A).
///
/// Returns exactly one result per bid row, in bid order, plus the summary.
/// Fails only when a role map does not fit its table.
pub fn reconcile<P: PriceCalculator + ?Sized>(
    standard: &Table,
    bids: &Table,
    roles_a: &ColumnRoleMap,
    roles_b: &ColumnRoleMap,
    pricing: &P,
) -> Result<(Vec<MatchResult>, ReportSummary), ReconError> {
    let index_a = roles_a.resolve(standard)?;
    let index_b = roles_b.resolve(bids)?;

    let standard_rows = normalize_standard(standard, &index_a);
    let bid_rows = normalize_bids(bids, &index_b);
    let lookup = StandardIndex::build(&standard_rows);

    let mut results = Vec::with_capacity(bid_rows.len());

    for (bid, raw) in bid_rows.iter().zip(bids.rows()) {
        let outcome = match_bid(&lookup, bid);
        trace!("bid row {}: {:?}", sheet_row(bid.index), outcome);

        let (status, matched_row, quote, note) = match outcome {
            MatchOutcome::NoModelCapacity => (
                MatchStatus::NoModelCapacityMatch,
                None,
                None,
                "no model/capacity match in standard table".to_string(),
            ),
            MatchOutcome::NoGrade => (
                MatchStatus::NoGradeMatch,
                None,
                None,
                format!(
                    "no grade match in standard table: {}",
                    index_b.cell(raw, Role::Grade)
                ),
            ),
            MatchOutcome::Found(a_index) => {
                let ctx = PriceContext {
                    standard: RowView {
                        table: standard,
                        index: a_index,
                        roles: roles_a,
                    },
                    bid: RowView {
                        table: bids,
                        index: bid.index,
                        roles: roles_b,
                    },
                };
                match pricing.quote(&ctx) {
                    Some(quote) => (
                        MatchStatus::Matched,
                        Some(a_index),
                        Some(quote),
                        format!("standard row {}", sheet_row(a_index)),
                    ),
                    None => (
                        MatchStatus::NeedsReview,
                        Some(a_index),
                        None,
                        "price calculation pending".to_string(),
                    ),
                }
            }
        };

        results.push(MatchResult {
            status,
            source_row: sheet_row(bid.index),
            model: index_b.cell(raw, Role::Model).clone(),
            capacity: index_b.cell(raw, Role::Capacity).clone(),
            color: index_b.cell(raw, Role::Color).clone(),
            grade: index_b.cell(raw, Role::Grade).clone(),
            bid_price: index_b.cell(raw, Role::Price).clone(),
            standard_capacity: bid.standard_capacity.clone(),
            normalized_color: bid.normalized_color.clone().unwrap_or_default(),
            normalized_grade: bid.normalized_grade.clone(),
            matched_row,
            expected_price: quote.map(|q| q.expected_price),
            delta: quote.map(|q| q.delta),
            note,
            fields: raw.clone(),
        });
    }

    let summary = compute_summary(&results);
    debug!(
        "reconciled {} bid rows against {} standard rows: {} matched, {} needs review, {} errors",
        summary.total,
        standard.len(),
        summary.matched,
        summary.needs_review,
        summary.errors,
    );

    Ok((results, summary))
}

/// Detect both role maps using the config's keywords, then apply its column overrides.
pub fn detect_role_maps(
    config: &ReconConfig,
    standard: &Table,
    bids: &Table,
) -> Result<RoleMaps, ReconError> {
    let mut a = detect_columns(standard, TableSide::A, &config.keywords_for(TableSide::A))?;
    let mut b = detect_columns(bids, TableSide::B, &config.keywords_for(TableSide::B))?;
    config.columns.a.apply(&mut a);
    config.columns.b.apply(&mut b);
    Ok(RoleMaps { a, b })
}

/// Run reconciliation with already-settled role maps and wrap the outcome in a report.
pub fn run<P: PriceCalculator + ?Sized>(
    config: &ReconConfig,
    standard: &Table,
    bids: &Table,
    columns: RoleMaps,
    pricing: &P,
) -> Result<ReconReport, ReconError> {
    let (rows, summary) = reconcile(standard, bids, &columns.a, &columns.b, pricing)?;

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        columns,
        summary,
        rows,
    })
}
