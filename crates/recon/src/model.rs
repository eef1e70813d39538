use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cells + tables
// ---------------------------------------------------------------------------

/// A raw cell value as loaded from a spreadsheet or CSV file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Build a cell from raw text. Empty strings become `Cell::Empty`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// String form used for comparisons. `None` for empty cells.
    ///
    /// Integral numbers render without decimals (`123`, not `123.0`).
    pub fn string_form(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
        }
    }

    /// Numeric view of the cell. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from_raw(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// An in-memory table: ordered columns, ordered rows of cells aligned to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells, extra cells dropped.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Semantic role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Model,
    Capacity,
    Grade,
    Color,
    Price,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Capacity => "capacity",
            Self::Grade => "grade",
            Self::Color => "color",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two input tables a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSide {
    /// Standard price list.
    A,
    /// Bid price list being checked.
    B,
}

impl TableSide {
    /// Roles that must be mapped for this side.
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Self::A => &[Role::Model, Role::Capacity, Role::Grade, Role::Price],
            Self::B => &[Role::Model, Role::Capacity, Role::Grade, Role::Color, Role::Price],
        }
    }
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Role -> column name for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRoleMap {
    side: TableSide,
    columns: BTreeMap<Role, String>,
    /// Roles that were not detected and defaulted to the first column.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fallbacks: Vec<Role>,
}

impl ColumnRoleMap {
    pub fn new(side: TableSide) -> Self {
        Self {
            side,
            columns: BTreeMap::new(),
            fallbacks: Vec::new(),
        }
    }

    pub fn side(&self) -> TableSide {
        self.side
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(|c| c.as_str())
    }

    /// Set the column for a role. Clears any fallback mark on it.
    pub fn set(&mut self, role: Role, column: impl Into<String>) {
        self.columns.insert(role, column.into());
        self.fallbacks.retain(|r| *r != role);
    }

    pub fn with_override(mut self, role: Role, column: impl Into<String>) -> Self {
        self.set(role, column);
        self
    }

    pub(crate) fn set_fallback(&mut self, role: Role, column: impl Into<String>) {
        self.columns.insert(role, column.into());
        if !self.fallbacks.contains(&role) {
            self.fallbacks.push(role);
        }
    }

    pub fn fallbacks(&self) -> &[Role] {
        &self.fallbacks
    }

    /// Check every required role against `table` and return column indices.
    pub fn resolve(&self, table: &Table) -> Result<RoleIndex, ReconError> {
        if table.columns().is_empty() {
            return Err(ReconError::EmptyTable { side: self.side });
        }
        let mut indices = BTreeMap::new();
        for &role in self.side.roles() {
            let column = self.get(role).ok_or(ReconError::MissingRole {
                side: self.side,
                role,
            })?;
            let idx = table
                .column_index(column)
                .ok_or_else(|| ReconError::MissingColumn {
                    side: self.side,
                    role,
                    column: column.to_string(),
                })?;
            indices.insert(role, idx);
        }
        Ok(RoleIndex { indices })
    }
}

/// Column indices for each resolved role of one table.
#[derive(Debug, Clone)]
pub struct RoleIndex {
    indices: BTreeMap<Role, usize>,
}

impl RoleIndex {
    pub fn get(&self, role: Role) -> Option<usize> {
        self.indices.get(&role).copied()
    }

    /// Cell of `row` for `role`, or `Cell::Empty` when the role is unmapped.
    pub fn cell<'a>(&self, row: &'a [Cell], role: Role) -> &'a Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.get(role).and_then(|i| row.get(i)).unwrap_or(EMPTY)
    }
}

/// Read-only view of one row together with its table's role mapping.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub(crate) table: &'a Table,
    pub(crate) index: usize,
    pub(crate) roles: &'a ColumnRoleMap,
}

impl<'a> RowView<'a> {
    /// Zero-based row index in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell by column name.
    pub fn cell(&self, column: &str) -> Option<&'a Cell> {
        self.table.cell(self.index, column)
    }

    /// Cell of the column mapped to `role`.
    pub fn role(&self, role: Role) -> Option<&'a Cell> {
        self.roles.get(role).and_then(|c| self.cell(c))
    }
}

// ---------------------------------------------------------------------------
// Normalized rows
// ---------------------------------------------------------------------------

/// Canonical matching keys derived once per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub index: usize,
    pub model: Cell,
    pub standard_capacity: Cell,
    pub normalized_grade: Cell,
    /// Only derived for table B rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_color: Option<Cell>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    NoModelCapacityMatch,
    NoGradeMatch,
    NeedsReview,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 4] = [
        Self::Matched,
        Self::NoModelCapacityMatch,
        Self::NoGradeMatch,
        Self::NeedsReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NoModelCapacityMatch => "no_model_capacity_match",
            Self::NoGradeMatch => "no_grade_match",
            Self::NeedsReview => "needs_review",
        }
    }

    /// Statuses that mean no standard-price row could be found.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::NoModelCapacityMatch | Self::NoGradeMatch)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one table B row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub status: MatchStatus,
    /// Spreadsheet row number of the source row (header is row 1).
    pub source_row: usize,
    pub model: Cell,
    pub capacity: Cell,
    pub color: Cell,
    pub grade: Cell,
    pub bid_price: Cell,
    pub standard_capacity: Cell,
    pub normalized_color: Cell,
    pub normalized_grade: Cell,
    /// Zero-based index of the matched table A row.
    pub matched_row: Option<usize>,
    /// `None` = not computed.
    pub expected_price: Option<f64>,
    /// `None` = not applicable.
    pub delta: Option<f64>,
    pub note: String,
    /// Copy of every table B cell for this row, in table B column order.
    #[serde(skip)]
    pub fields: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub needs_review: usize,
    pub no_model_capacity_match: usize,
    pub no_grade_match: usize,
    pub errors: usize,
    pub success: usize,
    /// `None` when there are no rows.
    pub success_pct: Option<f64>,
    pub status_counts: BTreeMap<String, usize>,
}

impl ReportSummary {
    /// Rows that need a human: errors plus needs_review.
    pub fn problems(&self) -> usize {
        self.errors + self.needs_review
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleMaps {
    pub a: ColumnRoleMap,
    pub b: ColumnRoleMap,
}

/// Everything produced by one run: mappings used, summary, per-row results.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub columns: RoleMaps,
    pub summary: ReportSummary,
    pub rows: Vec<MatchResult>,
}
