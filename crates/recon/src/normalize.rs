//! Value normalization: maps raw cells to the canonical forms used as match keys.
//!
//! Every function passes `Cell::Empty` through unchanged.

use crate::model::Cell;

/// Color synonyms. Keys are matched exactly (case-sensitive).
pub const COLOR_SYNONYMS: &[(&str, &str)] = &[
    ("Midnight", "black"),
    ("Space Black", "black"),
    ("Graphite", "black"),
    ("Starlight", "White"),
    ("Silver", "White"),
    ("Pacific Blue", "Blue"),
    ("Sierra Blue", "Blue"),
    ("Blue", "Blue"),
    ("Deep Purple", "purple"),
    ("Alpine Green", "Green"),
    ("Green", "Green"),
];

/// Grade marker that collapses any grade containing it.
const GRADE_B_PLUS: &str = "B+";

/// Map a marketing color name to its canonical color. Unmapped names pass through.
pub fn normalize_color(value: &Cell) -> Cell {
    let Some(raw) = value.string_form() else {
        return Cell::Empty;
    };
    match COLOR_SYNONYMS.iter().find(|(name, _)| *name == raw) {
        Some((_, canonical)) => Cell::Text((*canonical).to_string()),
        None => Cell::Text(raw),
    }
}

/// Any grade containing "B+" ("DLS B+", "TPS B+") becomes exactly "B+".
pub fn normalize_grade(value: &Cell) -> Cell {
    let Some(raw) = value.string_form() else {
        return Cell::Empty;
    };
    if raw.contains(GRADE_B_PLUS) {
        Cell::Text(GRADE_B_PLUS.to_string())
    } else {
        Cell::Text(raw)
    }
}

/// Uppercase, strip whitespace, and express terabytes as gigabytes ("1TB" -> "1000GB").
///
/// A "TB" value with no digits is returned as-is (e.g. "TB").
pub fn standardize_capacity(value: &Cell) -> Cell {
    let Some(raw) = value.string_form() else {
        return Cell::Empty;
    };
    let compact: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if compact.contains("TB") {
        let digits: String = compact.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            // Decimal string shift: exact for any number of digits
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                return Cell::Text("0GB".to_string());
            }
            return Cell::Text(format!("{trimmed}000GB"));
        }
    }
    Cell::Text(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn empty_passes_through() {
        assert_eq!(normalize_color(&Cell::Empty), Cell::Empty);
        assert_eq!(normalize_grade(&Cell::Empty), Cell::Empty);
        assert_eq!(standardize_capacity(&Cell::Empty), Cell::Empty);
    }

    #[test]
    fn color_synonyms() {
        assert_eq!(normalize_color(&text("Midnight")), text("black"));
        assert_eq!(normalize_color(&text("Starlight")), text("White"));
        assert_eq!(normalize_color(&text("Pacific Blue")), text("Blue"));
        assert_eq!(normalize_color(&text("Deep Purple")), text("purple"));
        assert_eq!(normalize_color(&text("Alpine Green")), text("Green"));
    }

    #[test]
    fn color_unmapped_keeps_casing() {
        assert_eq!(normalize_color(&text("Unknown Color")), text("Unknown Color"));
        // lookup is case-sensitive
        assert_eq!(normalize_color(&text("midnight")), text("midnight"));
    }

    #[test]
    fn grade_b_plus_collapses() {
        assert_eq!(normalize_grade(&text("DLS B+")), text("B+"));
        assert_eq!(normalize_grade(&text("TPS B+")), text("B+"));
        assert_eq!(normalize_grade(&text("A B+ X")), text("B+"));
        assert_eq!(normalize_grade(&text("A")), text("A"));
        assert_eq!(normalize_grade(&text("B")), text("B"));
    }

    #[test]
    fn capacity_units() {
        assert_eq!(standardize_capacity(&text("1TB")), text("1000GB"));
        assert_eq!(standardize_capacity(&text("2 tb")), text("2000GB"));
        assert_eq!(standardize_capacity(&text("128 GB")), text("128GB"));
        assert_eq!(standardize_capacity(&text("64gb")), text("64GB"));
        assert_eq!(standardize_capacity(&text("128GB")), text("128GB"));
    }

    #[test]
    fn capacity_tb_beyond_u64() {
        assert_eq!(
            standardize_capacity(&text("20000000000000000TB")),
            text("20000000000000000000GB")
        );
        assert_eq!(
            standardize_capacity(&text("99999999999999999999TB")),
            text("99999999999999999999000GB")
        );
        assert_eq!(standardize_capacity(&text("002TB")), text("2000GB"));
        assert_eq!(standardize_capacity(&text("0TB")), text("0GB"));
    }

    #[test]
    fn capacity_tb_without_digits_is_literal() {
        assert_eq!(standardize_capacity(&text("TB")), text("TB"));
        assert_eq!(standardize_capacity(&text(" t b")), text("TB"));
    }

    #[test]
    fn capacity_numeric_cell() {
        assert_eq!(standardize_capacity(&Cell::Number(256.0)), text("256"));
    }

    #[test]
    fn numeric_grade_uses_string_form() {
        assert_eq!(normalize_grade(&Cell::Number(3.0)), text("3"));
    }
}
