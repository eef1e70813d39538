//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | `run --strict`: some bid rows need attention              |
//! | 2    | CLI usage error (bad args, bad `--column` override)       |
//! | 3    | Input error (unreadable/unsupported/malformed file)       |
//! | 4    | Config error (TOML parse or validation)                   |
//! | 5    | Reconciliation aborted (table/role map mismatch)          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Rows with errors or pending review were found and `--strict` was given.
pub const EXIT_PROBLEMS: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file could not be read or parsed, or output could not be written.
pub const EXIT_INPUT: u8 = 3;

/// Config file could not be parsed or failed validation.
pub const EXIT_CONFIG: u8 = 4;

/// A table or role map is structurally unusable; no report was produced.
pub const EXIT_RECON: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &pricecheck_recon::ReconError) -> u8 {
    use pricecheck_recon::ReconError;
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Output(_) => EXIT_INPUT,
        ReconError::EmptyTable { .. }
        | ReconError::MissingRole { .. }
        | ReconError::MissingColumn { .. } => EXIT_RECON,
    }
}
