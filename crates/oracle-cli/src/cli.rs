// crates/oracle-cli/src/cli.rs
// ============================================================================
// Module: CLI Argument Definitions
// Description: The clap derive surface: global flags and every subcommand's
//              arguments.
// Purpose: Keep argument parsing declarative and separate from the handlers
//          that act on it.
// Dependencies: clap
// ============================================================================

use std::path::PathBuf;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

/// Default catalog path, relative to a working root.
pub const DEFAULT_CATALOG_PATH: &str = "config/event_catalog.json";
/// Default runs directory, relative to a working root.
pub const DEFAULT_RUNS_DIR: &str = "runs";
/// Default baseline config path, relative to a working root. Sits alongside
/// the catalog since, like it, it is hand-authored rather than generated.
pub const DEFAULT_BASELINE_CONFIG_PATH: &str = "config/baseline_config.json";
/// Default ensemble config path, relative to a working root.
pub const DEFAULT_ENSEMBLE_CONFIG_PATH: &str = "config/ensemble_config.json";

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "oracle",
    disable_help_subcommand = true,
    disable_version_flag = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to the event catalog document.
    #[arg(long, global = true, default_value = DEFAULT_CATALOG_PATH, value_name = "PATH")]
    pub catalog: PathBuf,
    /// Root directory holding run folders.
    #[arg(long, global = true, default_value = DEFAULT_RUNS_DIR, value_name = "DIR")]
    pub runs_dir: PathBuf,
    /// Root directory holding the three ledger files.
    #[arg(long, global = true, default_value = oracle_ledger::DEFAULT_LEDGER_DIR, value_name = "DIR")]
    pub ledger_dir: PathBuf,
    /// Directory reports are written under.
    #[arg(long, global = true, default_value = oracle_reporter::DEFAULT_REPORTS_DIR, value_name = "DIR")]
    pub reports_dir: PathBuf,
    /// Directory evidence snapshots are written under.
    #[arg(long, global = true, default_value = oracle_evidence::DEFAULT_EVIDENCE_DIR, value_name = "DIR")]
    pub evidence_dir: PathBuf,
    /// Path to the baseline config document.
    #[arg(long, global = true, default_value = DEFAULT_BASELINE_CONFIG_PATH, value_name = "PATH")]
    pub baseline_config: PathBuf,
    /// Path to the ensemble config document.
    #[arg(long, global = true, default_value = DEFAULT_ENSEMBLE_CONFIG_PATH, value_name = "PATH")]
    pub ensemble_config: PathBuf,
    /// Print one line per affected record instead of a summary only.
    #[arg(short = 'v', long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate base, baseline, and (optionally) ensemble forecasts from a
    /// run's compiled intelligence.
    Log(LogArgs),
    /// Resolve pending forecasts against later compiled intelligence.
    Resolve(ResolveArgs),
    /// Compute a scorecard over the current ledger.
    Score(ScoreArgs),
    /// Render and write a scorecard report.
    Report(ReportArgs),
    /// Print a ledger-wide forecast/resolution census.
    Status,
    /// Validate the event catalog and print a summary.
    Validate,
    /// List forecasts past their target date with no resolution yet.
    Queue,
}

/// The horizons a `log` or `score` command may be restricted to.
pub const ALLOWED_HORIZONS: &[u32] = &[1, 7, 15, 30];

/// Arguments for the `log` subcommand.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Explicit run folder name to forecast from; auto-selects the latest
    /// valid-and-reliable run when omitted.
    #[arg(long, value_name = "NAME")]
    pub run_dir: Option<String>,
    /// Restrict generation to a single horizon, overriding each event's
    /// configured `horizons_days`. Must be one of 1, 7, 15, 30.
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<u32>,
    /// Compute forecasts without appending them to the ledger.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// Also combine ensemble forecasts from the configured ensemble
    /// definitions.
    #[arg(long, action = ArgAction::SetTrue)]
    pub with_ensembles: bool,
}

/// Arguments for the `resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Days past an event's declared `max_resolution_lag_days` to allow,
    /// for events that declare no override.
    #[arg(long, default_value_t = oracle_resolver::DEFAULT_MAX_RESOLUTION_LAG_DAYS, value_name = "DAYS")]
    pub max_lag: i64,
    /// Report how many forecasts are eligible to resolve without resolving
    /// them (the resolver has no non-appending mode, so this counts pending,
    /// non-manual forecasts rather than actually evaluating them).
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Restrict scoring to a single event.
    #[arg(long, value_name = "ID")]
    pub event_id: Option<String>,
    /// Restrict scoring to a single horizon.
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<u32>,
    /// Write the JSON scorecard here instead of stdout.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Which serialized form(s) the `report` subcommand writes.
#[derive(ValueEnum, Copy, Clone, Debug, Default)]
pub enum ReportFormatArg {
    /// `scorecard.json` only.
    Json,
    /// `scorecard.md` only.
    Md,
    /// Both `scorecard.json` and `scorecard.md`.
    #[default]
    Both,
}

impl ReportFormatArg {
    /// Converts to the reporter crate's own format enum.
    #[must_use]
    pub const fn to_output_format(self) -> oracle_reporter::OutputFormat {
        match self {
            Self::Json => oracle_reporter::OutputFormat::Json,
            Self::Md => oracle_reporter::OutputFormat::Md,
            Self::Both => oracle_reporter::OutputFormat::Both,
        }
    }
}

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Which serialized form(s) to write.
    #[arg(long, value_enum, default_value_t = ReportFormatArg::Both)]
    pub format: ReportFormatArg,
    /// Restrict scoring to a single event.
    #[arg(long, value_name = "ID")]
    pub event_id: Option<String>,
    /// Restrict scoring to a single horizon.
    #[arg(long, value_name = "DAYS")]
    pub horizon: Option<u32>,
}
