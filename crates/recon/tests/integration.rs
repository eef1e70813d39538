use proptest::prelude::*;

use pricecheck_recon::engine::{detect_role_maps, reconcile, run};
use pricecheck_recon::model::{Cell, MatchStatus, Role, RoleMaps, Table};
use pricecheck_recon::pricing::{PendingPrice, PriceContext, PriceQuote};
use pricecheck_recon::report::{compute_summary, write_csv};
use pricecheck_recon::ReconConfig;

fn table_from_csv(data: &str) -> Table {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.unwrap();
        table.push_row(record.iter().map(Cell::from).collect());
    }
    table
}

fn default_maps(a: &Table, b: &Table) -> RoleMaps {
    detect_role_maps(&ReconConfig::default(), a, b).unwrap()
}

const STANDARD: &str = "\
Model,GB,Grade,價格,Red,White
iPhone 12,64GB,DLS B+,123,-3,1
iPhone 13,128GB,TPS B+,202,-3,1
iPhone 13,128GB,A,250,-3,1
iPhone 14 Pro,1TB,A,900,0,0
";

const BIDS: &str = "\
Model,Capacity,Color,Grade,Bid Price
iPhone 12,64GB,Red,DLS B+,120
iPhone 13,128 GB,Starlight,TPS B+,203
iPhone 99,64GB,Red,A,50
iPhone 13,128GB,Red,C,180
iPhone 14 Pro,1000gb,Midnight,A,880
";

// -------------------------------------------------------------------------
// End-to-end scenarios
// -------------------------------------------------------------------------

#[test]
fn single_row_pending_price() {
    let a = table_from_csv("Model,GB,Grade,Price\niPhone 12,64GB,DLS B+,123\n");
    let b = table_from_csv(
        "Model,Capacity,Color,Grade,BidPrice\niPhone 12,64GB,Red,DLS B+,120\n",
    );
    let maps = default_maps(&a, &b);
    let (results, summary) = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.status, MatchStatus::NeedsReview);
    assert_eq!(r.matched_row, Some(0));
    assert_eq!(r.normalized_grade, Cell::from("B+"));
    assert_eq!(r.expected_price, None);
    assert_eq!(r.delta, None);
    assert_eq!(summary.needs_review, 1);
    assert_eq!(summary.success_pct, Some(0.0));
}

#[test]
fn single_row_with_calculator() {
    let a = table_from_csv("Model,GB,Grade,Price\niPhone 12,64GB,DLS B+,123\n");
    let b = table_from_csv(
        "Model,Capacity,Color,Grade,BidPrice\niPhone 12,64GB,Red,DLS B+,120\n",
    );
    let maps = default_maps(&a, &b);
    let flat = |ctx: &PriceContext<'_>| -> Option<PriceQuote> {
        let expected = ctx.standard.role(Role::Price)?.as_f64()?;
        let bid = ctx.bid.role(Role::Price)?.as_f64()?;
        Some(PriceQuote {
            expected_price: expected,
            delta: bid - expected,
        })
    };
    let (results, summary) = reconcile(&a, &b, &maps.a, &maps.b, &flat).unwrap();

    assert_eq!(results[0].status, MatchStatus::Matched);
    assert_eq!(results[0].expected_price, Some(123.0));
    assert_eq!(results[0].delta, Some(-3.0));
    assert_eq!(summary.success, 1);
}

#[test]
fn sample_tables_end_to_end() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv(BIDS);
    let maps = default_maps(&a, &b);
    assert_eq!(maps.a.get(Role::Price), Some("價格"));
    assert_eq!(maps.b.get(Role::Price), Some("Bid Price"));

    let report = run(&ReconConfig::default(), &a, &b, maps, &PendingPrice).unwrap();
    let statuses: Vec<MatchStatus> = report.rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            MatchStatus::NeedsReview,
            MatchStatus::NeedsReview,
            MatchStatus::NoModelCapacityMatch,
            MatchStatus::NoGradeMatch,
            MatchStatus::NeedsReview,
        ]
    );
    // "TPS B+" collapses to "B+" and matches the first B+ candidate, not grade A.
    assert_eq!(report.rows[1].matched_row, Some(1));
    assert_eq!(report.rows[1].normalized_color, Cell::from("White"));
    assert_eq!(report.rows[4].matched_row, Some(3));
    assert_eq!(report.rows[4].standard_capacity, Cell::from("1000GB"));

    let s = &report.summary;
    assert_eq!(s.total, 5);
    assert_eq!(s.errors, 2);
    assert_eq!(s.needs_review, 3);
    assert_eq!(s.success, 0);
}

#[test]
fn calculator_can_decline_per_row() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv(BIDS);
    let maps = default_maps(&a, &b);
    // standard prices: 123 (row 0), 202 (row 1), 900 (row 3)
    let (results, summary) = reconcile(&a, &b, &maps.a, &maps.b, &priced_over(200.0)).unwrap();

    assert_eq!(results[0].status, MatchStatus::NeedsReview);
    assert_eq!(results[1].status, MatchStatus::Matched);
    assert_eq!(results[1].delta, Some(1.0));
    assert_eq!(results[4].status, MatchStatus::Matched);
    assert_eq!(results[4].delta, Some(-20.0));
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.success, 2);
    assert_eq!(summary.needs_review, 1);
    assert_eq!(summary.total, summary.errors + summary.needs_review + summary.success);
}

#[test]
fn unknown_model() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv("Model,Capacity,Color,Grade,Bid Price\niPhone 99,64GB,Red,A,1\n");
    let maps = default_maps(&a, &b);
    let (results, _) = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();
    assert_eq!(results[0].status, MatchStatus::NoModelCapacityMatch);
    assert_eq!(results[0].note, "no model/capacity match in standard table");
}

#[test]
fn grade_absent_for_model_capacity() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv("Model,Capacity,Color,Grade,Bid Price\niPhone 12,64GB,Red,C,1\n");
    let maps = default_maps(&a, &b);
    let (results, _) = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();
    assert_eq!(results[0].status, MatchStatus::NoGradeMatch);
}

#[test]
fn inputs_are_not_mutated() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv(BIDS);
    let (a_before, b_before) = (a.clone(), b.clone());
    let maps = default_maps(&a, &b);
    let (results, _) = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
    assert_eq!(results[2].fields, b.rows()[2]);
}

#[test]
fn config_overrides_fix_wrong_guess() {
    let a = table_from_csv("Device,Storage,Condition,Cost\niPhone 12,64GB,A,100\n");
    let b = table_from_csv("Device,Storage,Finish,Condition,Offer\niPhone 12,64GB,Red,A,90\n");

    // Nothing matches the default keywords for the model column.
    let guessed = default_maps(&a, &b);
    assert!(guessed.a.fallbacks().contains(&Role::Model));

    let config = ReconConfig::from_toml(
        r#"
[keywords.a]
grade = ["condition"]
price = ["cost"]

[keywords.b]
capacity = ["storage"]
grade = ["condition"]
color = ["finish"]
price = ["offer"]

[columns.a]
model = "Device"

[columns.b]
model = "Device"
"#,
    )
    .unwrap();
    let maps = detect_role_maps(&config, &a, &b).unwrap();
    assert!(maps.a.fallbacks().is_empty());
    assert!(maps.b.fallbacks().is_empty());

    let report = run(&config, &a, &b, maps, &PendingPrice).unwrap();
    assert_eq!(report.rows[0].status, MatchStatus::NeedsReview);
    assert_eq!(report.rows[0].bid_price, Cell::from("90"));
}

#[test]
fn csv_output_has_contract_header() {
    let a = table_from_csv(STANDARD);
    let b = table_from_csv(BIDS);
    let maps = default_maps(&a, &b);
    let (results, _) = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();

    let mut buf = Vec::new();
    write_csv(&results, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("status,source_row,model,capacity,color,grade,bid_price,expected_price,delta,note")
    );
    assert_eq!(
        lines.next(),
        Some("needs_review,2,iPhone 12,64GB,Red,DLS B+,120,N/A,N/A,price calculation pending")
    );
    assert_eq!(text.lines().count(), 6);
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn arb_row() -> impl Strategy<Value = Vec<String>> {
    (
        prop::sample::select(vec!["iPhone 12", "iPhone 13", "iPhone 99", ""]),
        prop::sample::select(vec!["64GB", "64 gb", "128GB", "1TB", "1000GB", ""]),
        prop::sample::select(vec!["Red", "Midnight", "Silver", ""]),
        prop::sample::select(vec!["A", "DLS B+", "TPS B+", "C", ""]),
        0u32..1000,
    )
        .prop_map(|(m, c, col, g, p)| {
            vec![m.to_string(), c.to_string(), col.to_string(), g.to_string(), p.to_string()]
        })
}

fn build(cols: &[&str], rows: &[Vec<String>]) -> Table {
    let mut t = Table::new(cols.iter().map(|c| c.to_string()).collect());
    for r in rows {
        t.push_row(r.iter().map(|v| Cell::from(v.as_str())).collect());
    }
    t
}

/// Quotes only when both price cells are numbers over `floor`; otherwise pending.
fn priced_over(floor: f64) -> impl Fn(&PriceContext<'_>) -> Option<PriceQuote> {
    move |ctx: &PriceContext<'_>| -> Option<PriceQuote> {
        let expected = ctx.standard.role(Role::Price)?.as_f64()?;
        let bid = ctx.bid.role(Role::Price)?.as_f64()?;
        if expected < floor {
            return None;
        }
        Some(PriceQuote {
            expected_price: expected,
            delta: bid - expected,
        })
    }
}

proptest! {
    #[test]
    fn summary_always_balances(
        a_rows in prop::collection::vec(arb_row(), 0..12),
        b_rows in prop::collection::vec(arb_row(), 0..12),
        // None = PendingPrice; Some(floor) = quote when the standard price >= floor
        floor in prop::option::of(0u32..1000),
    ) {
        let a = build(&["Model", "GB", "Color", "Grade", "Price"], &a_rows);
        let b = build(&["Model", "Capacity", "Color", "Grade", "Bid"], &b_rows);
        let maps = default_maps(&a, &b);
        let (results, summary) = match floor {
            None => reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap(),
            Some(f) => reconcile(&a, &b, &maps.a, &maps.b, &priced_over(f as f64)).unwrap(),
        };

        prop_assert_eq!(results.len(), b_rows.len());
        prop_assert_eq!(summary.total, summary.errors + summary.needs_review + summary.success);
        prop_assert_eq!(summary.success, summary.matched);
        prop_assert_eq!(&summary, &compute_summary(&results));
        if floor.is_none() {
            prop_assert_eq!(summary.matched, 0);
        }
        for r in &results {
            prop_assert_eq!(r.status == MatchStatus::Matched, r.expected_price.is_some());
            prop_assert_eq!(r.expected_price.is_some(), r.delta.is_some());
        }
        for (i, r) in results.iter().enumerate() {
            prop_assert_eq!(r.source_row, i + 2);
        }
    }

    #[test]
    fn reconcile_is_deterministic(
        a_rows in prop::collection::vec(arb_row(), 0..8),
        b_rows in prop::collection::vec(arb_row(), 0..8),
    ) {
        let a = build(&["Model", "GB", "Color", "Grade", "Price"], &a_rows);
        let b = build(&["Model", "Capacity", "Color", "Grade", "Bid"], &b_rows);
        let maps = default_maps(&a, &b);
        let first = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();
        let second = reconcile(&a, &b, &maps.a, &maps.b, &PendingPrice).unwrap();
        prop_assert_eq!(first, second);
    }
}
