// crates/oracle-cli/src/commands/resolve.rs
// ============================================================================
// Module: `resolve` Command
// Description: Resolves pending, non-manual forecasts against later
//              compiled intelligence.
// Purpose: The CLI's write path onto the resolution side of the ledger.
// Dependencies: oracle-catalog, oracle-ledger, oracle-resolver
// ============================================================================

use oracle_ledger::Ledger;
use oracle_resolver::ResolutionOutcome;

use crate::cli::Cli;
use crate::cli::ResolveArgs;
use crate::error::CliResult;
use crate::io::print_line;
use crate::io::write_stderr_line;

/// Runs the `resolve` subcommand.
///
/// `--dry-run` cannot invoke the resolver itself (it always appends on
/// success), so it instead counts the pending, non-manual forecasts that
/// would be attempted.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] if the catalog or ledger cannot be
/// read.
pub fn run(cli: &Cli, args: &ResolveArgs) -> CliResult<()> {
    let catalog = oracle_catalog::load_catalog(&cli.catalog)?;
    let ledger = Ledger::new(&cli.ledger_dir);
    let now = time::OffsetDateTime::now_utc();

    if args.dry_run {
        let pending = ledger.get_pending_forecasts()?;
        let eligible: Vec<_> = pending
            .iter()
            .filter(|f| {
                oracle_catalog::get_event(&catalog, &f.event_id)
                    .map(|event| !event.requires_manual_resolution)
                    .unwrap_or(false)
            })
            .collect();
        print_line(&format!(
            "resolve: {} forecast(s) eligible to resolve (dry run, nothing attempted)",
            eligible.len()
        ))?;
        if cli.verbose {
            for forecast in eligible {
                print_line(&format!("  {} ({})", forecast.forecast_id, forecast.event_id))?;
            }
        }
        return Ok(());
    }

    let outcomes = oracle_resolver::resolve_pending(
        &catalog,
        &ledger,
        &cli.runs_dir,
        &cli.evidence_dir,
        now,
        args.max_lag,
    )?;

    let resolved: Vec<_> =
        outcomes.iter().filter_map(|o| if let ResolutionOutcome::Resolved(r) = o { Some(r) } else { None }).collect();
    let failed = outcomes.len() - resolved.len();

    print_line(&format!("resolve: {} resolved, {failed} failed", resolved.len()))?;

    if cli.verbose {
        for record in &resolved {
            print_line(&format!(
                "  {} {} -> {} ({})",
                record.resolution_id, record.event_id, record.resolved_outcome, record.forecast_id
            ))?;
        }
    }

    for outcome in &outcomes {
        if let ResolutionOutcome::Failed { forecast_id, error } = outcome {
            write_stderr_line(&format!("resolve: {forecast_id} failed: {error}"))
                .map_err(|source| crate::error::CliError::Io { path: "<stderr>".to_string(), source })?;
        }
    }

    Ok(())
}
