// crates/oracle-cli/src/commands/log.rs
// ============================================================================
// Module: `log` Command
// Description: Generates base, baseline (climatology/persistence), and
//              optionally ensemble forecasts from a run's compiled
//              intelligence, and appends them to the ledger.
// Purpose: The CLI's single write path onto the forecast side of the
//          ledger.
// Dependencies: oracle-baseline, oracle-catalog, oracle-ensemble,
//               oracle-forecast, oracle-ledger, oracle-runs
// ============================================================================

use oracle_baseline::BaselineConfig;
use oracle_forecast::BaselineKind;
use oracle_forecast::GenerateForecastsOptions;
use oracle_ledger::BaselineMetadata;
use oracle_ledger::Ledger;

use crate::cli::ALLOWED_HORIZONS;
use crate::cli::Cli;
use crate::cli::LogArgs;
use crate::error::CliError;
use crate::error::CliResult;
use crate::io::print_line;

/// Config-format version stamped on every baseline forecast's
/// `baseline_metadata`, since [`BaselineConfig`] itself carries no version
/// field.
const BASELINE_CONFIG_VERSION: &str = "1.0";

/// Runs the `log` subcommand: generates and appends forecasts for the
/// selected (or auto-selected) run.
///
/// # Errors
///
/// Returns [`CliError`] if the catalog or ledger cannot be read, no valid
/// run can be selected, `--horizon` names a value outside
/// [`ALLOWED_HORIZONS`], or forecast/ensemble generation fails.
pub fn run(cli: &Cli, args: &LogArgs) -> CliResult<()> {
    if let Some(horizon) = args.horizon {
        if !ALLOWED_HORIZONS.contains(&horizon) {
            return Err(CliError::InvalidArgument(format!(
                "--horizon {horizon} is not one of {ALLOWED_HORIZONS:?}"
            )));
        }
    }

    let catalog = oracle_catalog::load_catalog(&cli.catalog)?;
    let ledger = Ledger::new(&cli.ledger_dir);
    let now = time::OffsetDateTime::now_utc();

    let baseline_config = if cli.baseline_config.exists() {
        oracle_baseline::load_baseline_config(&cli.baseline_config)?
    } else {
        BaselineConfig::default()
    };

    let options = GenerateForecastsOptions {
        run_dir: args.run_dir.clone(),
        horizon_override: args.horizon,
        dry_run: args.dry_run,
    };
    let base_forecasts = oracle_forecast::generate_forecasts(
        &catalog,
        &cli.runs_dir,
        &ledger,
        now,
        &baseline_config,
        &options,
    )?;
    for warning in &base_forecasts.warnings {
        print_line(&format!("log: warning: {warning}"))?;
    }

    let baseline_forecasts =
        generate_baseline_shadow_forecasts(cli, args, &catalog, &ledger, now, &baseline_config)?;

    let ensemble_forecasts = if args.with_ensembles {
        generate_ensembles(cli, args, &catalog, &ledger, now)?
    } else {
        Vec::new()
    };

    print_line(&format!(
        "log: {} base forecast(s), {} baseline forecast(s), {} ensemble forecast(s){}",
        base_forecasts.records.len(),
        baseline_forecasts.len(),
        ensemble_forecasts.len(),
        if args.dry_run { " (dry run, nothing appended)" } else { "" }
    ))?;

    if cli.verbose {
        for record in
            base_forecasts.records.iter().chain(baseline_forecasts.iter()).chain(ensemble_forecasts.iter())
        {
            print_line(&format!(
                "  {} [{}] {} @ {}d -> {}",
                record.forecast_id,
                record.forecaster_id,
                record.event_id,
                record.horizon_days,
                format_distribution(&record.probabilities)
            ))?;
        }
    }

    Ok(())
}

/// Generates a climatology and a persistence shadow forecast for every
/// forecastable, non-ensemble event and horizon the run selected for base
/// forecasting covers, skipping any whose deterministic id already exists
/// in the ledger.
fn generate_baseline_shadow_forecasts(
    cli: &Cli,
    args: &LogArgs,
    catalog: &oracle_catalog::EventCatalog,
    ledger: &Ledger,
    now: time::OffsetDateTime,
    baseline_config: &BaselineConfig,
) -> CliResult<Vec<oracle_ledger::ForecastRecord>> {
    let run = match &args.run_dir {
        Some(name) => oracle_runs::get_run_info(&cli.runs_dir, name, oracle_runs::RunMode::Observe),
        None => oracle_runs::find_latest_valid_run(&cli.runs_dir, oracle_runs::RunMode::Observe)?,
    };
    let manifest_path = oracle_forecast::run_manifest_path(&cli.runs_dir, &run.run_name);
    let manifest_id = oracle_ledger::compute_manifest_id(&manifest_path)?;

    let resolutions = ledger.get_resolutions()?;
    let corrections = ledger.get_corrections()?;
    let history = oracle_baseline::build_history_index(&resolutions, &corrections, baseline_config, now)?;

    let existing_ids: std::collections::BTreeSet<String> =
        ledger.get_forecasts()?.into_iter().map(|f| f.forecast_id).collect();

    let mut generated = Vec::new();
    for event in oracle_catalog::get_forecastable_events(catalog) {
        let horizons: Vec<u32> =
            args.horizon.map_or_else(|| event.horizons_days.clone(), |h| vec![h]);

        for horizon_days in horizons {
            let target_date_utc = now + time::Duration::days(i64::from(horizon_days));
            let event_config = oracle_baseline::get_event_config(&baseline_config, &event.event_id);
            let group = history.get(&event.event_id, horizon_days);

            let metadata = build_baseline_metadata(group, &event_config);

            let climatology = oracle_baseline::compute_climatology_distribution(
                group,
                &event.allowed_outcomes,
                &event_config,
            );
            let persistence = oracle_baseline::compute_persistence_distribution(
                group,
                &event.allowed_outcomes,
                &event_config,
            );

            for (kind, distribution) in
                [(BaselineKind::Climatology, climatology), (BaselineKind::Persistence, persistence)]
            {
                let record = oracle_forecast::generate_baseline_forecast_record(
                    event,
                    horizon_days,
                    now,
                    target_date_utc,
                    &run,
                    &manifest_id,
                    kind,
                    distribution,
                    metadata.clone(),
                )?;

                if existing_ids.contains(&record.forecast_id) {
                    continue;
                }
                if !args.dry_run {
                    ledger.append_forecast(&record)?;
                }
                generated.push(record);
            }
        }
    }

    Ok(generated)
}

/// Builds the provenance block stamped on every baseline forecast, from the
/// history group (if any) it was computed over.
fn build_baseline_metadata(
    group: Option<&oracle_baseline::HistoryGroup>,
    event_config: &oracle_baseline::BaselineEventConfig,
) -> BaselineMetadata {
    let history_n = group.map_or(0, |g| g.history_n);
    let fallback = if history_n < event_config.min_history_n { "uniform" } else { "none" };

    BaselineMetadata {
        baseline_history_n: history_n,
        baseline_fallback: fallback.to_string(),
        baseline_last_verified_at: group.and_then(|g| g.last_verified_at.clone()),
        baseline_staleness_days: group.and_then(|g| g.staleness_days),
        baseline_config_version: BASELINE_CONFIG_VERSION.to_string(),
        baseline_excluded_counts_by_reason: group
            .map(|g| g.excluded_counts_by_reason.clone())
            .unwrap_or_default(),
        baseline_resolution_modes: event_config.resolution_modes.clone(),
    }
}

/// Renders a probability distribution as `"OUTCOME=0.1234, ..."`, without
/// reaching for `Debug` formatting.
fn format_distribution(probabilities: &std::collections::BTreeMap<String, f64>) -> String {
    probabilities.iter().map(|(outcome, p)| format!("{outcome}={p:.4}")).collect::<Vec<_>>().join(", ")
}

/// Loads the ensemble config (if present) and combines ensemble forecasts
/// for the selected run.
fn generate_ensembles(
    cli: &Cli,
    args: &LogArgs,
    catalog: &oracle_catalog::EventCatalog,
    ledger: &Ledger,
    now: time::OffsetDateTime,
) -> CliResult<Vec<oracle_ledger::ForecastRecord>> {
    if !cli.ensemble_config.exists() {
        return Ok(Vec::new());
    }
    let config = oracle_ensemble::load_ensemble_config(&cli.ensemble_config)?;

    let run_name = match &args.run_dir {
        Some(name) => name.clone(),
        None => {
            oracle_runs::find_latest_valid_run(&cli.runs_dir, oracle_runs::RunMode::Observe)?.run_name
        }
    };

    Ok(oracle_ensemble::generate_ensemble_forecasts(
        catalog,
        &config,
        ledger,
        &run_name,
        now,
        args.dry_run,
    )?)
}
