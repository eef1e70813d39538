//! `pcheck run|detect|validate|sample`

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use log::{info, warn};
use serde_json::{json, Map, Value};

use pricecheck_io::csv::{export_results, export_table, write_table};
use pricecheck_recon::engine::{detect_role_maps, run};
use pricecheck_recon::model::{ColumnRoleMap, ReconReport, ReportSummary, Role, RoleMaps, Table, TableSide};
use pricecheck_recon::report::{result_table, to_json, write_csv};
use pricecheck_recon::{PendingPrice, ReconConfig};

use crate::exit_codes::EXIT_PROBLEMS;
use crate::CliError;

/// Config file, per-column overrides and sheet choice shared by `run` and `detect`.
#[derive(Args, Debug, Default)]
pub struct ColumnArgs {
    /// TOML config with keywords, column overrides and output paths
    #[arg(long, short = 'c', env = "PCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force a column for a role: SIDE.ROLE=NAME (repeatable).
    /// Examples: a.price=Base, b.color=Finish
    #[arg(long = "column", value_name = "SIDE.ROLE=NAME")]
    pub column: Vec<String>,

    /// Worksheet of the standard workbook (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub standard_sheet: Option<String>,

    /// Worksheet of the bid workbook (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub bid_sheet: Option<String>,
}

pub struct RunArgs {
    pub standard: PathBuf,
    pub bids: PathBuf,
    pub columns: ColumnArgs,
    pub output: Option<PathBuf>,
    pub full: bool,
    pub json: bool,
    pub report: Option<PathBuf>,
    pub strict: bool,
    pub quiet: bool,
}

// ============================================================================
// Settings
// ============================================================================

struct Settings {
    config: ReconConfig,
    /// Directory of the config file; output paths in it are relative to this.
    base_dir: PathBuf,
}

impl Settings {
    fn load(args: &ColumnArgs) -> Result<Self, CliError> {
        let (mut config, base_dir) = match &args.config {
            Some(path) => (read_config(path)?, path.parent().map(Path::to_path_buf).unwrap_or_default()),
            None => (ReconConfig::default(), PathBuf::new()),
        };

        for arg in &args.column {
            let (side, role, name) = parse_column_override(arg)?;
            config.columns.get_mut(side).set(role, name);
        }
        config.validate().map_err(CliError::recon)?;

        Ok(Self { config, base_dir })
    }

    fn resolve(&self, path: Option<&str>) -> Option<PathBuf> {
        path.map(|p| self.base_dir.join(p))
    }
}

fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(CliError::recon)
}

/// Parse `SIDE.ROLE=NAME`, e.g. `b.color=Finish`.
pub fn parse_column_override(arg: &str) -> Result<(TableSide, Role, String), CliError> {
    let usage = || {
        CliError::args(format!("invalid --column '{arg}'"))
            .with_hint("expected SIDE.ROLE=NAME, e.g. --column b.color=Finish")
    };

    let (key, name) = arg.split_once('=').ok_or_else(usage)?;
    let (side, role) = key.split_once('.').ok_or_else(usage)?;

    let side = match side.trim().to_ascii_lowercase().as_str() {
        "a" => TableSide::A,
        "b" => TableSide::B,
        _ => return Err(usage()),
    };
    let role = TableSide::B
        .roles()
        .iter()
        .copied()
        .find(|r| r.as_str().eq_ignore_ascii_case(role.trim()))
        .ok_or_else(usage)?;
    if !side.roles().contains(&role) {
        return Err(CliError::args(format!(
            "--column '{arg}': role '{role}' does not apply to table {side}"
        )));
    }
    if name.is_empty() {
        return Err(usage());
    }

    Ok((side, role, name.to_string()))
}

fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, CliError> {
    pricecheck_io::load_table_sheet(path, sheet).map_err(CliError::input)
}

fn warn_fallbacks(maps: &RoleMaps) {
    for map in [&maps.a, &maps.b] {
        for &role in map.fallbacks() {
            warn!(
                "table {}: no column matches role '{role}', using first column '{}'",
                map.side(),
                map.get(role).unwrap_or_default()
            );
        }
    }
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let settings = Settings::load(&args.columns)?;
    let standard = load_table(&args.standard, args.columns.standard_sheet.as_deref())?;
    let bids = load_table(&args.bids, args.columns.bid_sheet.as_deref())?;

    let maps = detect_role_maps(&settings.config, &standard, &bids).map_err(CliError::recon)?;
    warn_fallbacks(&maps);

    let report = run(&settings.config, &standard, &bids, maps, &PendingPrice)
        .map_err(CliError::recon)?;

    let csv_path = args
        .output
        .or_else(|| settings.resolve(settings.config.output.csv.as_deref()));
    let json_path = args
        .report
        .or_else(|| settings.resolve(settings.config.output.json.as_deref()));

    match &csv_path {
        Some(path) => {
            if args.full {
                export_table(&result_table(&report.rows, bids.columns()), path)
            } else {
                export_results(&report.rows, path)
            }
            .map_err(CliError::input)?;
            info!("wrote {}", path.display());
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        // stdout belongs to the JSON report when --json is given
        None if !args.json => write_csv_stdout(&report, &bids, args.full)?,
        None => {}
    }

    if args.json || json_path.is_some() {
        let json_str = to_json(&report).map_err(CliError::recon)?;
        if let Some(ref path) = json_path {
            fs::write(path, &json_str)
                .map_err(|e| CliError::input(format!("cannot write {}: {e}", path.display())))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        if args.json {
            println!("{json_str}");
        }
    }

    let s = &report.summary;
    if !args.quiet {
        eprintln!("{}", summary_line(s));
    }

    if args.strict && s.problems() > 0 {
        return Err(CliError {
            code: EXIT_PROBLEMS,
            message: format!("{} of {} bid row(s) need attention", s.problems(), s.total),
            hint: None,
        });
    }

    Ok(())
}

fn write_csv_stdout(report: &ReconReport, bids: &Table, full: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if full {
        write_table(&result_table(&report.rows, bids.columns()), &mut out).map_err(CliError::input)?;
    } else {
        write_csv(&report.rows, &mut out).map_err(CliError::recon)?;
    }
    out.flush().map_err(|e| CliError::input(format!("cannot write stdout: {e}")))
}

pub fn summary_line(s: &ReportSummary) -> String {
    let pct = match s.success_pct {
        Some(p) => format!("{p:.1}%"),
        None => "N/A".to_string(),
    };
    format!(
        "{} bid row(s): {} matched, {} need review, {} no model/capacity match, {} no grade match (success {})",
        s.total, s.matched, s.needs_review, s.no_model_capacity_match, s.no_grade_match, pct,
    )
}

// ============================================================================
// detect
// ============================================================================

pub fn cmd_detect(
    standard_path: PathBuf,
    bids_path: PathBuf,
    columns: ColumnArgs,
    preview: usize,
    json_output: bool,
) -> Result<(), CliError> {
    let settings = Settings::load(&columns)?;
    let standard = load_table(&standard_path, columns.standard_sheet.as_deref())?;
    let bids = load_table(&bids_path, columns.bid_sheet.as_deref())?;

    let maps = detect_role_maps(&settings.config, &standard, &bids).map_err(CliError::recon)?;

    if json_output {
        let out = json!({
            "a": side_json(&standard_path, &standard, &maps.a, preview),
            "b": side_json(&bids_path, &bids, &maps.b, preview),
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::input(format!("JSON serialization error: {e}")))?;
        println!("{text}");
    } else {
        print_side("standard", &standard_path, &standard, &maps.a, preview);
        println!();
        print_side("bids", &bids_path, &bids, &maps.b, preview);
    }

    warn_fallbacks(&maps);
    Ok(())
}

/// Annotation for a role's column: fallback or not present in the table.
fn role_flag(table: &Table, map: &ColumnRoleMap, role: Role, column: &str) -> Option<&'static str> {
    if table.column_index(column).is_none() {
        Some("missing")
    } else if map.fallbacks().contains(&role) {
        Some("fallback")
    } else {
        None
    }
}

fn print_side(label: &str, path: &Path, table: &Table, map: &ColumnRoleMap, preview: usize) {
    println!(
        "table {} ({label}): {} ({} column(s), {} row(s))",
        map.side(),
        path.display(),
        table.columns().len(),
        table.len()
    );
    for &role in map.side().roles() {
        let column = map.get(role).unwrap_or_default();
        match role_flag(table, map, role, column) {
            Some(flag) => println!("  {:<9} -> {column}  [{flag}]", role.as_str()),
            None => println!("  {:<9} -> {column}", role.as_str()),
        }
    }

    let head = table.head(preview);
    if !head.is_empty() {
        println!("  preview:");
        println!("    {}", head.columns().join(" | "));
        for row in head.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            println!("    {}", cells.join(" | "));
        }
    }
}

fn side_json(path: &Path, table: &Table, map: &ColumnRoleMap, preview: usize) -> Value {
    let mut roles = Map::new();
    let mut flags = Map::new();
    for &role in map.side().roles() {
        let column = map.get(role).unwrap_or_default();
        roles.insert(role.as_str().to_string(), Value::from(column));
        if let Some(flag) = role_flag(table, map, role, column) {
            flags.insert(role.as_str().to_string(), Value::from(flag));
        }
    }

    let rows: Vec<Value> = table
        .head(preview)
        .rows()
        .iter()
        .map(|row| {
            let obj: Map<String, Value> = table
                .columns()
                .iter()
                .zip(row)
                .map(|(col, cell)| (col.clone(), Value::from(cell.to_string())))
                .collect();
            Value::Object(obj)
        })
        .collect();

    json!({
        "file": path.display().to_string(),
        "rows": table.len(),
        "columns": table.columns(),
        "roles": roles,
        "flags": flags,
        "preview": rows,
    })
}

// ============================================================================
// validate / sample
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let keywords = config.keywords.a.iter().count() + config.keywords.b.iter().count();
    let columns = config.columns.a.iter().count() + config.columns.b.iter().count();
    eprintln!(
        "valid: config '{}' with {} keyword override(s), {} column override(s)",
        config.name, keywords, columns,
    );
    Ok(())
}

pub fn cmd_sample(dir: PathBuf) -> Result<(), CliError> {
    let written = pricecheck_io::samples::write_samples(&dir).map_err(CliError::input)?;
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
