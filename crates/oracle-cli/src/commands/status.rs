// crates/oracle-cli/src/commands/status.rs
// ============================================================================
// Module: `status` Command
// Description: Prints a ledger-wide forecast/resolution census.
// Purpose: The CLI's entry point onto `oracle-reporter::generate_status_report`.
// Dependencies: oracle-catalog, oracle-ledger, oracle-reporter
// ============================================================================

use oracle_ledger::Ledger;

use crate::cli::Cli;
use crate::error::CliResult;
use crate::io::print_line;

/// Runs the `status` subcommand: a fixed-width summary table, overall then
/// per event.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] if the catalog or ledger cannot be
/// read.
pub fn run(cli: &Cli) -> CliResult<()> {
    let catalog = oracle_catalog::load_catalog(&cli.catalog)?;
    let ledger = Ledger::new(&cli.ledger_dir);
    let report = oracle_reporter::generate_status_report(&catalog, &ledger)?;

    print_line(&format!(
        "{:<24} {:>8} {:>8} {:>8} {:>10}",
        "scope", "total", "resolved", "pending", "coverage"
    ))?;
    print_line(&format!(
        "{:<24} {:>8} {:>8} {:>8} {:>9.1}%",
        "overall",
        report.total_forecasts,
        report.total_resolved,
        report.total_pending,
        report.coverage_rate * 100.0
    ))?;

    for (event_id, counts) in &report.by_event {
        let coverage_pct = if counts.total == 0 {
            0.0
        } else {
            (counts.resolved as f64 / counts.total as f64) * 100.0
        };
        print_line(&format!(
            "{event_id:<24} {:>8} {:>8} {:>8} {coverage_pct:>9.1}%",
            counts.total, counts.resolved, counts.pending
        ))?;
    }

    Ok(())
}
