// pcheck - standard-price vs bid-price checks from the command line

mod check;
mod exit_codes;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};

/// Environment variable holding a log filter (e.g. `debug`, `pricecheck_recon=trace`).
const LOG_ENV: &str = "PCHECK_LOG";

#[derive(Parser)]
#[command(name = "pcheck")]
#[command(about = "Check a bid price list against a standard price list")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). PCHECK_LOG overrides.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every bid row against the standard price list and report the outcome
    #[command(after_help = "\
Each bid row gets one status: matched, needs_review, no_model_capacity_match
or no_grade_match. Without --output or --json the result CSV goes to stdout.

Examples:
  pcheck run standard.xlsx bids.xlsx -o result.csv
  pcheck run standard.csv bids.csv --json | jq .summary
  pcheck run standard.csv bids.csv --config pricecheck.toml --strict
  pcheck run a.csv b.csv --column a.model=Device --column b.color=Finish
  pcheck run a.csv b.csv --full -o checked_bids.csv
  pcheck run prices.xlsx prices.xlsx --standard-sheet Standard --bid-sheet Bids")]
    Run {
        /// Standard price list (table A)
        standard: PathBuf,

        /// Bid price list to check (table B)
        bids: PathBuf,

        #[command(flatten)]
        columns: check::ColumnArgs,

        /// Write the result CSV to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the whole bid table with status/expected_price/delta/note appended
        #[arg(long)]
        full: bool,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Exit 1 when any bid row is unmatched or needs review
        #[arg(long)]
        strict: bool,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show which column was picked for each role, and preview both tables
    #[command(after_help = "\
Roles that fell back to the first column are flagged; fix them with
--column or a [columns] section in the config.

Examples:
  pcheck detect standard.xlsx bids.xlsx
  pcheck detect standard.csv bids.csv --preview 10
  pcheck detect standard.csv bids.csv --json")]
    Detect {
        /// Standard price list (table A)
        standard: PathBuf,

        /// Bid price list (table B)
        bids: PathBuf,

        #[command(flatten)]
        columns: check::ColumnArgs,

        /// Number of rows to preview per table
        #[arg(long, default_value_t = 5)]
        preview: usize,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  pcheck validate pricecheck.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Write the built-in sample price lists to a directory
    #[command(after_help = "\
Examples:
  pcheck sample ./demo
  pcheck run demo/sample_standard.csv demo/sample_bids.csv")]
    Sample {
        /// Target directory (created if missing)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  pricecheck-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Route `log` records from the library crates to stderr.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            standard,
            bids,
            columns,
            output,
            full,
            json,
            report,
            strict,
            quiet,
        } => check::cmd_run(check::RunArgs {
            standard,
            bids,
            columns,
            output,
            full,
            json,
            report,
            strict,
            quiet,
        }),
        Commands::Detect { standard, bids, columns, preview, json } => {
            check::cmd_detect(standard, bids, columns, preview, json)
        }
        Commands::Validate { config } => check::cmd_validate(config),
        Commands::Sample { dir } => check::cmd_sample(dir),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: pricecheck_recon::ReconError) -> Self {
        use pricecheck_recon::ReconError;
        let code = exit_codes::recon_exit_code(&err);
        let hint = match &err {
            ReconError::MissingColumn { side, role, .. } => Some(format!(
                "run `pcheck detect` to list columns, then pass --column {}.{role}=<name>",
                side.to_string().to_lowercase()
            )),
            ReconError::EmptyTable { .. } => Some("the file needs a header row".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
