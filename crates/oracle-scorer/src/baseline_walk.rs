// crates/oracle-scorer/src/baseline_walk.rs
// ============================================================================
// Module: Baseline Walk
// Description: Walk-forward Brier scoring of a naive baseline against its
//              own resolution history.
// Purpose: `climatology_brier`/`persistence_brier` and their multinomial
//          counterparts are the same algorithm: for every known-outcome
//          resolution of an event/horizon, rebuild the no-lookahead history
//          as of that resolution (excluding the resolution itself) and score
//          the resulting baseline distribution against what actually
//          happened. Binary Brier is the `outcomes = ["YES", "NO"]` case of
//          multinomial Brier, normalized to `[0, 1]`, so one walk serves
//          both `binary` and `multinomial`.
// Dependencies: oracle-baseline, oracle-core, oracle-ledger
// ============================================================================

use oracle_baseline::BaselineConfig;
use oracle_baseline::BaselineError;
use oracle_baseline::HistoryIndex;
use oracle_core::UNKNOWN_OUTCOME;
use oracle_ledger::CorrectionRecord;
use oracle_ledger::ResolutionRecord;

/// Which naive baseline to walk forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineKind {
    /// Dirichlet/Laplace-smoothed climatology.
    Climatology,
    /// Stickiness-decayed persistence of the last known outcome.
    Persistence,
}

/// Walks every known-outcome resolution of `(event_id, horizon_days)` in
/// `target_date_utc` order, rebuilding a lookahead-safe history index as of
/// each resolution's `resolved_at_utc` (excluding that resolution itself),
/// and scores the resulting baseline distribution over `outcomes` against
/// the actual outcome.
///
/// Returns the mean normalized Brier score (raw multinomial Brier divided by
/// 2, landing in `[0, 1]`; for `outcomes = ["YES", "NO"]` this is
/// numerically identical to the standard binary Brier score) along with how
/// many resolutions were scored. Returns `(None, 0)` if no resolution for
/// this event/horizon has a known outcome.
///
/// # Errors
///
/// Returns [`BaselineError`] if a resolved timestamp on the record being
/// scored fails to parse; malformed timestamps on *other* history records
/// are tallied as history-index exclusions rather than propagated.
pub fn walk_baseline_brier(
    resolutions: &[ResolutionRecord],
    corrections: &[CorrectionRecord],
    config: &BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
    kind: BaselineKind,
) -> Result<(Option<f64>, usize), BaselineError> {
    let corrected = oracle_ledger::apply_corrections(resolutions.to_vec(), corrections);

    let mut scored: Vec<&ResolutionRecord> = corrected
        .iter()
        .filter(|r| r.event_id == event_id)
        .filter(|r| r.horizon_days == horizon_days)
        .filter(|r| r.resolved_outcome != UNKNOWN_OUTCOME)
        .collect();
    scored.sort_by(|a, b| a.target_date_utc.cmp(&b.target_date_utc));

    if scored.is_empty() {
        return Ok((None, 0));
    }

    let event_config = oracle_baseline::get_event_config(config, event_id);
    let mut total = 0.0;
    let mut n = 0_usize;

    for record in &scored {
        let as_of = oracle_core::parse_utc(&record.resolved_at_utc)?;
        let history_source: Vec<ResolutionRecord> = corrected
            .iter()
            .filter(|r| r.resolution_id != record.resolution_id)
            .cloned()
            .collect();
        let index: HistoryIndex =
            oracle_baseline::build_history_index(&history_source, &[], config, as_of)?;
        let group = index.get(event_id, horizon_days);

        let distribution = match kind {
            BaselineKind::Climatology => {
                oracle_baseline::compute_climatology_distribution(group, outcomes, &event_config)
            }
            BaselineKind::Persistence => {
                oracle_baseline::compute_persistence_distribution(group, outcomes, &event_config)
            }
        };

        let raw: f64 = outcomes
            .iter()
            .map(|outcome| {
                let p = distribution.get(outcome).copied().unwrap_or(0.0);
                let o = if outcome == &record.resolved_outcome { 1.0 } else { 0.0 };
                (p - o).powi(2)
            })
            .sum();
        total += raw / 2.0;
        n += 1;
    }

    Ok((Some(total / n as f64), n))
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    fn resolution(target_date: &str, resolved_at: &str, outcome: &str) -> ResolutionRecord {
        ResolutionRecord {
            resolution_id: format!("res_{target_date}"),
            forecast_id: format!("fcst_{target_date}"),
            event_id: "evt_a".to_string(),
            horizon_days: 7,
            target_date_utc: target_date.to_string(),
            resolved_outcome: outcome.to_string(),
            resolved_value: None,
            resolved_at_utc: resolved_at.to_string(),
            resolution_mode: oracle_core::ResolutionMode::ExternalAuto,
            reason_code: None,
            unknown_reason: None,
            run_id: None,
            resolution_manifest_id: None,
            rule_applied: None,
            evidence_refs: Vec::new(),
            evidence_hashes: Vec::new(),
            resolved_by: "oracle_resolver_v2".to_string(),
        }
    }

    #[test]
    fn no_history_returns_none() {
        let config = BaselineConfig::default();
        let (brier, n) = walk_baseline_brier(
            &[],
            &[],
            &config,
            "evt_a",
            7,
            &["YES".to_string(), "NO".to_string()],
            BaselineKind::Climatology,
        )
        .unwrap();
        assert_eq!(brier, None);
        assert_eq!(n, 0);
    }

    #[test]
    fn walk_scores_every_known_resolution_against_prior_history() {
        let mut resolutions = Vec::new();
        for day in 1 ..= 30 {
            resolutions.push(resolution(
                &format!("2026-01-{day:02}"),
                &format!("2026-01-{day:02}T00:00:00Z"),
                "YES",
            ));
        }
        let config = BaselineConfig::default();
        let (brier, n) = walk_baseline_brier(
            &resolutions,
            &[],
            &config,
            "evt_a",
            7,
            &["YES".to_string(), "NO".to_string()],
            BaselineKind::Climatology,
        )
        .unwrap();
        assert_eq!(n, 30);
        assert!(brier.unwrap() < 0.25);
    }

    #[test]
    fn unrelated_event_does_not_contribute() {
        let resolutions = vec![resolution("2026-01-01", "2026-01-01T00:00:00Z", "YES")];
        let config = BaselineConfig::default();
        let (brier, n) = walk_baseline_brier(
            &resolutions,
            &[],
            &config,
            "evt_b",
            7,
            &["YES".to_string(), "NO".to_string()],
            BaselineKind::Climatology,
        )
        .unwrap();
        assert_eq!(brier, None);
        assert_eq!(n, 0);
    }
}
