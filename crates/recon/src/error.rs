use std::fmt;

use crate::model::{Role, TableSide};

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty keyword list, bad override, etc.).
    ConfigValidation(String),
    /// A table has no columns, so no role can be resolved.
    EmptyTable { side: TableSide },
    /// A role map has no entry for a role the table side requires.
    MissingRole { side: TableSide, role: Role },
    /// A role map names a column the table does not have.
    MissingColumn { side: TableSide, role: Role, column: String },
    /// Result serialization error (CSV/JSON).
    Output(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyTable { side } => write!(f, "table {side} has no columns"),
            Self::MissingRole { side, role } => {
                write!(f, "table {side}: no column mapped for role '{role}'")
            }
            Self::MissingColumn { side, role, column } => {
                write!(f, "table {side}, role '{role}': missing column '{column}'")
            }
            Self::Output(msg) => write!(f, "output error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
