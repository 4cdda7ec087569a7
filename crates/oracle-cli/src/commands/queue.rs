// crates/oracle-cli/src/commands/queue.rs
// ============================================================================
// Module: `queue` Command
// Description: Lists forecasts past their target date with no resolution
//              yet, most-overdue-first.
// Purpose: Give an operator a worklist of what `resolve` has not (yet)
//          cleared, and which of those require manual adjudication.
// Dependencies: oracle-catalog, oracle-ledger
// ============================================================================

use oracle_ledger::Ledger;

use crate::cli::Cli;
use crate::error::CliResult;
use crate::io::print_line;

/// Days of grace assumed for events that declare no explicit `grace_days`.
const DEFAULT_GRACE_DAYS: i64 = 0;

/// Runs the `queue` subcommand: a fixed-width table of forecasts requiring
/// manual adjudication, most-overdue-first.
///
/// # Errors
///
/// Returns [`crate::error::CliError`] if the catalog or ledger cannot be
/// read, or a `target_date_utc` fails to parse.
pub fn run(cli: &Cli) -> CliResult<()> {
    let catalog = oracle_catalog::load_catalog(&cli.catalog)?;
    let ledger = Ledger::new(&cli.ledger_dir);
    let now = time::OffsetDateTime::now_utc();

    let pending = ledger.get_pending_forecasts()?;

    let requires_manual = |event_id: &str| {
        oracle_catalog::get_event(&catalog, event_id).map(|e| e.requires_manual_resolution).unwrap_or(false)
    };
    let grace_days_for = |event_id: &str| {
        oracle_catalog::get_event(&catalog, event_id)
            .ok()
            .and_then(|e| e.grace_days)
            .map_or(DEFAULT_GRACE_DAYS, i64::from)
    };

    // Computed per-event below since get_pending_manual_adjudication takes
    // one grace_days value for the whole batch; group by event to honor
    // each event's own override.
    let mut by_grace: std::collections::BTreeMap<i64, Vec<oracle_ledger::ForecastRecord>> =
        std::collections::BTreeMap::new();
    for forecast in pending {
        if !requires_manual(&forecast.event_id) {
            continue;
        }
        by_grace.entry(grace_days_for(&forecast.event_id)).or_default().push(forecast);
    }

    let mut entries = Vec::new();
    for (grace_days, forecasts) in by_grace {
        let batch =
            oracle_ledger::get_pending_manual_adjudication(&forecasts, |_| true, grace_days, now)?;
        entries.extend(batch);
    }
    entries.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));

    print_line(&format!(
        "{:<28} {:<14} {:>8} {:>10} {:<10}",
        "forecast_id", "event_id", "horizon", "overdue_d", "status"
    ))?;
    for entry in &entries {
        print_line(&format!(
            "{:<28} {:<14} {:>7}d {:>10} {:<10}",
            entry.forecast.forecast_id,
            entry.forecast.event_id,
            entry.forecast.horizon_days,
            entry.days_overdue,
            entry.status.as_str()
        ))?;
    }

    if entries.is_empty() {
        print_line("queue: nothing pending manual adjudication")?;
    }

    Ok(())
}
