use std::collections::HashMap;

use crate::model::{NormalizedRow, Role, RoleIndex, Table};
use crate::normalize::{normalize_color, normalize_grade, standardize_capacity};

/// Derive matching keys for every standard-price (table A) row.
pub fn normalize_standard(table: &Table, roles: &RoleIndex) -> Vec<NormalizedRow> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| NormalizedRow {
            index,
            model: roles.cell(row, Role::Model).clone(),
            standard_capacity: standardize_capacity(roles.cell(row, Role::Capacity)),
            normalized_grade: normalize_grade(roles.cell(row, Role::Grade)),
            normalized_color: None,
        })
        .collect()
}

/// Derive matching keys for every bid (table B) row, including the color.
pub fn normalize_bids(table: &Table, roles: &RoleIndex) -> Vec<NormalizedRow> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| NormalizedRow {
            index,
            model: roles.cell(row, Role::Model).clone(),
            standard_capacity: standardize_capacity(roles.cell(row, Role::Capacity)),
            normalized_grade: normalize_grade(roles.cell(row, Role::Grade)),
            normalized_color: Some(normalize_color(roles.cell(row, Role::Color))),
        })
        .collect()
}

/// (model, standard capacity). Rows with an empty model or capacity have no key.
fn key_of(row: &NormalizedRow) -> Option<(String, String)> {
    Some((row.model.string_form()?, row.standard_capacity.string_form()?))
}

/// Standard-price rows bucketed by (model, standard capacity), table order kept
/// within each bucket.
pub struct StandardIndex<'a> {
    buckets: HashMap<(String, String), Vec<&'a NormalizedRow>>,
}

impl<'a> StandardIndex<'a> {
    pub fn build(rows: &'a [NormalizedRow]) -> Self {
        let mut buckets: HashMap<(String, String), Vec<&'a NormalizedRow>> = HashMap::new();
        for row in rows {
            if let Some(key) = key_of(row) {
                buckets.entry(key).or_default().push(row);
            }
        }
        Self { buckets }
    }

    /// Rows with the same model and standard capacity as `bid`, in table order.
    pub fn candidates(&self, bid: &NormalizedRow) -> &[&'a NormalizedRow] {
        key_of(bid)
            .and_then(|key| self.buckets.get(&key))
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    NoModelCapacity,
    NoGrade,
    /// Index of the first grade-matching standard row.
    Found(usize),
}

/// Find the standard row for one bid: model + capacity, then grade, first wins.
pub fn match_bid(index: &StandardIndex<'_>, bid: &NormalizedRow) -> MatchOutcome {
    let candidates = index.candidates(bid);
    if candidates.is_empty() {
        return MatchOutcome::NoModelCapacity;
    }
    if bid.normalized_grade.is_empty() {
        return MatchOutcome::NoGrade;
    }
    candidates
        .iter()
        .find(|a| a.normalized_grade == bid.normalized_grade)
        .map(|a| MatchOutcome::Found(a.index))
        .unwrap_or(MatchOutcome::NoGrade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    fn row(index: usize, model: &str, cap: &str, grade: &str) -> NormalizedRow {
        NormalizedRow {
            index,
            model: Cell::from(model),
            standard_capacity: standardize_capacity(&Cell::from(cap)),
            normalized_grade: normalize_grade(&Cell::from(grade)),
            normalized_color: None,
        }
    }

    #[test]
    fn first_grade_match_wins() {
        let standard = vec![
            row(0, "iPhone 12", "64GB", "A"),
            row(1, "iPhone 12", "64GB", "DLS B+"),
            row(2, "iPhone 12", "64GB", "TPS B+"),
        ];
        let index = StandardIndex::build(&standard);
        let bid = row(0, "iPhone 12", "64 gb", "TPS B+");
        assert_eq!(match_bid(&index, &bid), MatchOutcome::Found(1));
    }

    #[test]
    fn model_is_case_sensitive() {
        let standard = vec![row(0, "iPhone 12", "64GB", "A")];
        let index = StandardIndex::build(&standard);
        let bid = row(0, "iphone 12", "64GB", "A");
        assert_eq!(match_bid(&index, &bid), MatchOutcome::NoModelCapacity);
    }

    #[test]
    fn terabytes_match_gigabytes() {
        let standard = vec![row(0, "iPhone 15 Pro", "1000GB", "A")];
        let index = StandardIndex::build(&standard);
        let bid = row(0, "iPhone 15 Pro", "1TB", "A");
        assert_eq!(match_bid(&index, &bid), MatchOutcome::Found(0));
    }

    #[test]
    fn grade_miss() {
        let standard = vec![row(0, "iPhone 12", "64GB", "A")];
        let index = StandardIndex::build(&standard);
        let bid = row(0, "iPhone 12", "64GB", "C");
        assert_eq!(match_bid(&index, &bid), MatchOutcome::NoGrade);
    }

    #[test]
    fn empty_keys_never_match() {
        let standard = vec![row(0, "", "64GB", ""), row(1, "iPhone 12", "64GB", "")];
        let index = StandardIndex::build(&standard);
        assert_eq!(
            match_bid(&index, &row(0, "", "64GB", "A")),
            MatchOutcome::NoModelCapacity
        );
        assert_eq!(
            match_bid(&index, &row(0, "iPhone 12", "64GB", "")),
            MatchOutcome::NoGrade
        );
    }
}
