// crates/oracle-reporter/src/status.rs
// ============================================================================
// Module: Status Report
// Description: A lightweight ledger census, independent of scoring.
// Purpose: Answer "how much has been logged and how much of it has
//          resolved" cheaply, without running the full scorer pipeline.
// Dependencies: oracle-catalog, oracle-ledger
// ============================================================================

use std::collections::BTreeMap;

use oracle_catalog::EventCatalog;
use oracle_ledger::Ledger;
use serde::Serialize;

use crate::error::ReporterError;

/// One event's forecast/resolution census.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventStatusCounts {
    /// Forecasts logged for this event.
    pub total: u64,
    /// Of those, forecasts with a matching resolution.
    pub resolved: u64,
    /// Of those, forecasts with no matching resolution yet.
    pub pending: u64,
}

/// A ledger-wide census: overall counts plus a per-event breakdown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Total forecast records in the ledger.
    pub total_forecasts: u64,
    /// Forecasts with a matching resolution.
    pub total_resolved: u64,
    /// Forecasts with no matching resolution yet.
    pub total_pending: u64,
    /// `total_resolved / total_forecasts`.
    pub coverage_rate: f64,
    /// Per-event breakdown, keyed by `event_id`, covering every event the
    /// catalog declares (even ones with zero forecasts logged).
    pub by_event: BTreeMap<String, EventStatusCounts>,
}

/// Computes a [`StatusReport`] over the full ledger, keyed against every
/// event the catalog declares.
///
/// # Errors
///
/// Returns [`ReporterError`] if the ledger cannot be read.
pub fn generate_status_report(
    catalog: &EventCatalog,
    ledger: &Ledger,
) -> Result<StatusReport, ReporterError> {
    let forecasts = ledger.get_forecasts()?;
    let resolutions = ledger.get_resolutions()?;

    let resolved_ids: std::collections::BTreeSet<&str> =
        resolutions.iter().map(|r| r.forecast_id.as_str()).collect();

    let mut by_event: BTreeMap<String, EventStatusCounts> = oracle_catalog::list_events(catalog)
        .iter()
        .map(|event| (event.event_id.clone(), EventStatusCounts::default()))
        .collect();

    let mut total_resolved = 0_u64;
    for forecast in &forecasts {
        let counts = by_event.entry(forecast.event_id.clone()).or_default();
        counts.total += 1;
        if resolved_ids.contains(forecast.forecast_id.as_str()) {
            counts.resolved += 1;
            total_resolved += 1;
        } else {
            counts.pending += 1;
        }
    }

    let total_forecasts = forecasts.len() as u64;
    let total_pending = total_forecasts - total_resolved;
    let coverage_rate = if total_forecasts == 0 { 0.0 } else { total_resolved as f64 / total_forecasts as f64 };

    Ok(StatusReport { total_forecasts, total_resolved, total_pending, coverage_rate, by_event })
}
