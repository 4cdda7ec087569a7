// crates/oracle-cli/src/commands/score.rs
// ============================================================================
// Module: `score` Command
// Description: Computes a scorecard over the current ledger and writes it
//              as JSON, to a file or to stdout.
// Purpose: The CLI's entry point onto `oracle-scorer`, independent of the
//          Markdown/file-writing concerns `report` adds.
// Dependencies: oracle-baseline, oracle-catalog, oracle-ledger,
//               oracle-reporter, oracle-scorer
// ============================================================================

use oracle_baseline::BaselineConfig;
use oracle_core::ResolutionMode;
use oracle_ledger::Ledger;
use oracle_reporter::ScorecardMetadata;

use crate::cli::Cli;
use crate::cli::ScoreArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::io::print_line;

/// Every resolution mode, the default scope a plain `score` call scores
/// over.
const ALL_MODES: [ResolutionMode; 3] =
    [ResolutionMode::ExternalAuto, ResolutionMode::ExternalManual, ResolutionMode::ClaimsInferred];

/// Runs the `score` subcommand.
///
/// # Errors
///
/// Returns [`CliError`] if the catalog, ledger, or baseline config cannot
/// be read, scoring fails, or `--output` cannot be written.
pub fn run(cli: &Cli, args: &ScoreArgs) -> CliResult<()> {
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
        mode_filter: ALL_MODES.iter().map(|m| mode_tag(*m).to_string()).collect(),
    };

    let text = oracle_reporter::generate_scorecard_json(&scorecard, &metadata, now)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
            print_line(&format!("score: wrote scorecard to {}", path.display()))?;
        }
        None => print_line(&text)?,
    }

    Ok(())
}

/// The wire tag for a resolution mode, for echoing the scope scored under.
const fn mode_tag(mode: ResolutionMode) -> &'static str {
    match mode {
        ResolutionMode::ExternalAuto => "external_auto",
        ResolutionMode::ExternalManual => "external_manual",
        ResolutionMode::ClaimsInferred => "claims_inferred",
    }
}
