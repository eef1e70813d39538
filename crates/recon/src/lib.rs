//! `pricecheck-recon`: standard-price vs bid-price reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns per-row verdicts
//! and a summary. No CLI or IO dependencies.

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod pricing;
pub mod report;

pub use config::ReconConfig;
pub use detect::{detect_columns, find_column, KeywordTable};
pub use engine::{detect_role_maps, reconcile, run};
pub use error::ReconError;
pub use model::{
    Cell, ColumnRoleMap, MatchResult, MatchStatus, ReconReport, ReportSummary, Role, RoleMaps,
    Table, TableSide,
};
pub use pricing::{PendingPrice, PriceCalculator, PriceContext, PriceQuote};
