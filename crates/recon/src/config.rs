use serde::Deserialize;

use crate::detect::KeywordTable;
use crate::error::ReconError;
use crate::model::{ColumnRoleMap, Role, TableSide};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub keywords: SidePair<RoleKeywords>,
    #[serde(default)]
    pub columns: SidePair<RoleColumns>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "pricecheck".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            keywords: SidePair::default(),
            columns: SidePair::default(),
            output: OutputConfig::default(),
        }
    }
}

/// One value per table: `a` = standard prices, `b` = bids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidePair<T> {
    #[serde(default)]
    pub a: T,
    #[serde(default)]
    pub b: T,
}

impl<T> SidePair<T> {
    pub fn get(&self, side: TableSide) -> &T {
        match side {
            TableSide::A => &self.a,
            TableSide::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, side: TableSide) -> &mut T {
        match side {
            TableSide::A => &mut self.a,
            TableSide::B => &mut self.b,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-role settings
// ---------------------------------------------------------------------------

/// Optional value per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoleSlots<T> {
    #[serde(default)]
    pub model: Option<T>,
    #[serde(default)]
    pub capacity: Option<T>,
    #[serde(default)]
    pub grade: Option<T>,
    #[serde(default)]
    pub color: Option<T>,
    #[serde(default)]
    pub price: Option<T>,
}

impl<T> RoleSlots<T> {
    pub fn get(&self, role: Role) -> Option<&T> {
        match role {
            Role::Model => self.model.as_ref(),
            Role::Capacity => self.capacity.as_ref(),
            Role::Grade => self.grade.as_ref(),
            Role::Color => self.color.as_ref(),
            Role::Price => self.price.as_ref(),
        }
    }

    pub fn set(&mut self, role: Role, value: T) {
        let slot = match role {
            Role::Model => &mut self.model,
            Role::Capacity => &mut self.capacity,
            Role::Grade => &mut self.grade,
            Role::Color => &mut self.color,
            Role::Price => &mut self.price,
        };
        *slot = Some(value);
    }

    /// Set slots in role order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [Role::Model, Role::Capacity, Role::Grade, Role::Color, Role::Price]
            .into_iter()
            .filter_map(move |role| self.get(role).map(|v| (role, v)))
    }
}

/// Replacement keyword lists for column detection.
pub type RoleKeywords = RoleSlots<Vec<String>>;

/// Explicit column names; these win over detection.
pub type RoleColumns = RoleSlots<String>;

impl RoleColumns {
    /// Write every override into `map`.
    pub fn apply(&self, map: &mut ColumnRoleMap) {
        for (role, column) in self.iter() {
            map.set(role, column.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Default path of the result CSV.
    #[serde(default)]
    pub csv: Option<String>,
    /// Default path of the JSON report.
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for side in [TableSide::A, TableSide::B] {
            let allowed = side.roles();

            for (role, keywords) in self.keywords.get(side).iter() {
                if !allowed.contains(&role) {
                    return Err(ReconError::ConfigValidation(format!(
                        "keywords.{}: role '{role}' does not apply to table {side}",
                        side_key(side)
                    )));
                }
                if keywords.is_empty() || keywords.iter().any(|k| k.trim().is_empty()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "keywords.{}.{role}: keywords must be non-empty",
                        side_key(side)
                    )));
                }
            }

            for (role, column) in self.columns.get(side).iter() {
                if !allowed.contains(&role) {
                    return Err(ReconError::ConfigValidation(format!(
                        "columns.{}: role '{role}' does not apply to table {side}",
                        side_key(side)
                    )));
                }
                if column.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "columns.{}.{role}: column name must be non-empty",
                        side_key(side)
                    )));
                }
            }
        }

        Ok(())
    }

    /// Built-in keywords for `side` with this config's replacements applied.
    pub fn keywords_for(&self, side: TableSide) -> KeywordTable {
        let mut table = KeywordTable::defaults(side);
        for (role, keywords) in self.keywords.get(side).iter() {
            table.set(role, keywords.clone());
        }
        table
    }
}

fn side_key(side: TableSide) -> &'static str {
    match side {
        TableSide::A => "a",
        TableSide::B => "b",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
