//! Column role detection by keyword search over table headers.

use std::collections::BTreeMap;

use log::debug;

use crate::error::ReconError;
use crate::model::{ColumnRoleMap, Role, Table, TableSide};

/// Ordered keyword lists per role, for one table side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    roles: BTreeMap<Role, Vec<String>>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }

    /// Built-in keywords, including the Chinese headers used by the
    /// spreadsheets this tool was written for.
    pub fn defaults(side: TableSide) -> Self {
        let model: &[&str] = &["model", "型号", "Model"];
        let grade: &[&str] = &["grade", "等级", "级别"];

        let mut table = Self::new()
            .with(Role::Model, model)
            .with(Role::Grade, grade);
        match side {
            TableSide::A => {
                table = table
                    .with(Role::Capacity, &["gb", "容量", "storage", "容量"])
                    .with(Role::Price, &["價格", "价格", "price", "基础价格"]);
            }
            TableSide::B => {
                table = table
                    .with(Role::Capacity, &["capacity", "容量", "存储", "gb"])
                    .with(Role::Color, &["color", "颜色", "colour"])
                    .with(Role::Price, &["bid", "price", "报价", "价格", "bid price"]);
            }
        }
        table
    }

    pub fn with(mut self, role: Role, keywords: &[&str]) -> Self {
        self.set(role, keywords.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn set(&mut self, role: Role, keywords: Vec<String>) {
        self.roles.insert(role, keywords);
    }

    pub fn get(&self, role: Role) -> &[String] {
        self.roles.get(&role).map(|k| k.as_slice()).unwrap_or(&[])
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new()
    }
}

/// First column whose name contains any keyword (case-insensitive), else `None`.
fn search_columns<'t, S: AsRef<str>>(table: &'t Table, keywords: &[S]) -> Option<&'t str> {
    let lowered: Vec<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();
    table
        .columns()
        .iter()
        .find(|col| {
            let col = col.to_lowercase();
            lowered.iter().any(|k| col.contains(k.as_str()))
        })
        .map(|c| c.as_str())
}

/// Guess the column for a set of keywords.
///
/// Columns are scanned in order, keywords in order within each column; the
/// first hit wins. With no hit the first column is returned; `None` only
/// when the table has no columns at all.
pub fn find_column<'t, S: AsRef<str>>(table: &'t Table, keywords: &[S]) -> Option<&'t str> {
    let first = table.columns().first()?;
    Some(search_columns(table, keywords).unwrap_or(first))
}

/// Detect a column for every role required by `side`.
///
/// Roles with no keyword hit default to the first column and are listed in
/// [`ColumnRoleMap::fallbacks`].
pub fn detect_columns(
    table: &Table,
    side: TableSide,
    keywords: &KeywordTable,
) -> Result<ColumnRoleMap, ReconError> {
    let first = table
        .columns()
        .first()
        .ok_or(ReconError::EmptyTable { side })?;

    let mut map = ColumnRoleMap::new(side);
    for &role in side.roles() {
        match search_columns(table, keywords.get(role)) {
            Some(col) => map.set(role, col),
            None => {
                debug!("table {side}: no column matched role '{role}', using '{first}'");
                map.set_fallback(role, first.as_str());
            }
        }
    }
    Ok(map)
}
