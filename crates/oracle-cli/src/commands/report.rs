// crates/oracle-cli/src/commands/report.rs
// ============================================================================
// Module: `report` Command
// Description: Computes a scorecard and writes it under the reports
//              directory in one or both serialized forms.
// Purpose: The CLI's entry point onto `oracle-reporter::generate_report`.
// Dependencies: oracle-baseline, oracle-catalog, oracle-ledger,
//               oracle-reporter, oracle-scorer
// ============================================================================

use oracle_baseline::BaselineConfig;
use oracle_core::ResolutionMode;
use oracle_ledger::Ledger;
use oracle_reporter::ScorecardMetadata;

use crate::cli::Cli;
use crate::cli::ReportArgs;
use crate::error::CliResult;
use crate::io::print_line;

/// Every resolution mode, the scope a report's primary accuracy figures
/// cover.
const ALL_MODES: [ResolutionMode; 3] =
    [ResolutionMode::ExternalAuto, ResolutionMode::ExternalManual, ResolutionMode::ClaimsInferred];

/// Runs the `report` subcommand.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] if the catalog, ledger, or baseline
/// config cannot be read, scoring fails, or the report cannot be written.
pub fn run(cli: &Cli, args: &ReportArgs) -> CliResult<()> {
    let catalog = oracle_catalog::load_catalog(&cli.catalog)?;
    let ledger = Ledger::new(&cli.ledger_dir);
    let baseline_config = if cli.baseline_config.exists() {
        oracle_baseline::load_baseline_config(&cli.baseline_config)?
    } else {
        BaselineConfig::default()
    };
    let now = time::OffsetDateTime::now_utc();

    let forecasts = ledger.get_forecasts()?;
    let resolutions = ledger.get_resolutions()?;
    let corrections = ledger.get_corrections()?;

    let scorecard = oracle_scorer::compute_scores(
        &catalog,
        &forecasts,
        &resolutions,
        &corrections,
        &baseline_config,
        &ALL_MODES,
        args.event_id.as_deref(),
        args.horizon,
        now,
    )?;

    let metadata = ScorecardMetadata {
        event_id_filter: args.event_id.clone(),
        horizon_filter: args.horizon,
        mode_filter: vec![
            "external_auto".to_string(),
            "external_manual".to_string(),
            "claims_inferred".to_string(),
        ],
    };

    let written = oracle_reporter::generate_report(
        &scorecard,
        &metadata,
        now,
        &cli.reports_dir,
        args.format.to_output_format(),
    )?;

    if let Some(path) = &written.json_path {
        print_line(&format!("report: wrote {}", path.display()))?;
    }
    if let Some(path) = &written.md_path {
        print_line(&format!("report: wrote {}", path.display()))?;
    }

    Ok(())
}
