// crates/oracle-scorer/src/binary.rs
// ============================================================================
// Module: Binary Scoring
// Description: Brier score, log score, skill score, and naive-baseline
//              scoring for binary (YES/NO) events.
// Purpose: Score a forecaster's `p(YES)` against what actually happened,
//          and compare it to how well a naive climatology/persistence
//          baseline would have done with the same information.
// Dependencies: oracle-baseline, oracle-core, oracle-ledger
// ============================================================================

use crate::baseline_walk::BaselineKind;
use crate::baseline_walk::walk_baseline_brier;
use crate::error::ScorerError;

/// Clamp applied to a probability before taking its logarithm, avoiding
/// `ln(0) == -inf`.
const LOG_SCORE_EPSILON: f64 = 1e-10;

/// Mean squared error between predicted `p(YES)` and the observed indicator
/// (`1.0` if YES occurred, `0.0` otherwise), over `pairs`.
///
/// Returns `None` if `pairs` is empty.
#[must_use]
pub fn brier_score(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let sum: f64 = pairs.iter().map(|(p, o)| (p - o).powi(2)).sum();
    Some(sum / pairs.len() as f64)
}

/// Mean log-likelihood of the actual outcome under the predicted
/// distribution: `mean(ln(p_relevant))`, where `p_relevant` is `p` if YES
/// occurred and `1 - p` otherwise, clamped to [`LOG_SCORE_EPSILON`] before
/// the logarithm.
///
/// Returns `None` if `pairs` is empty.
#[must_use]
pub fn log_score(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let sum: f64 = pairs
        .iter()
        .map(|(p, o)| {
            let relevant = if *o >= 0.5 { *p } else { 1.0 - p };
            relevant.max(LOG_SCORE_EPSILON).ln()
        })
        .sum();
    Some(sum / pairs.len() as f64)
}

/// [`brier_score`] computed over a superset of pairs that substitutes
/// `p = 0.5` for abstained forecasts and `o = 0.5` for `UNKNOWN`
/// resolutions, rather than excluding them. Callers are responsible for
/// building `pairs` with those substitutions already applied; the formula
/// itself is identical to [`brier_score`].
#[must_use]
pub fn effective_brier_score(pairs: &[(f64, f64)]) -> Option<f64> {
    brier_score(pairs)
}

/// `1 - model_brier / baseline_brier`, the fraction of a naive baseline's
/// error a model avoids. Special-cased to `0.0` when `baseline_brier` is
/// `0.0` (a perfect baseline leaves no room to claim skill). Returns `None`
/// if either input is `None`.
#[must_use]
pub fn brier_skill_score(model_brier: Option<f64>, baseline_brier: Option<f64>) -> Option<f64> {
    let model = model_brier?;
    let baseline = baseline_brier?;
    if baseline == 0.0 {
        return Some(0.0);
    }
    Some(1.0 - model / baseline)
}

/// Walk-forward Brier score of the climatology baseline against its own
/// resolution history for one `(event_id, horizon_days)`.
///
/// # Errors
///
/// Returns [`ScorerError`] if a scored resolution's `resolved_at_utc` fails
/// to parse.
pub fn climatology_brier(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
) -> Result<(Option<f64>, usize), ScorerError> {
    let outcomes = vec!["YES".to_string(), "NO".to_string()];
    Ok(walk_baseline_brier(
        resolutions,
        corrections,
        config,
        event_id,
        horizon_days,
        &outcomes,
        BaselineKind::Climatology,
    )?)
}

/// Walk-forward Brier score of the persistence baseline against its own
/// resolution history for one `(event_id, horizon_days)`.
///
/// # Errors
///
/// See [`climatology_brier`].
pub fn persistence_brier(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
) -> Result<(Option<f64>, usize), ScorerError> {
    let outcomes = vec!["YES".to_string(), "NO".to_string()];
    Ok(walk_baseline_brier(
        resolutions,
        corrections,
        config,
        event_id,
        horizon_days,
        &outcomes,
        BaselineKind::Persistence,
    )?)
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

    #[test]
    fn brier_score_of_perfect_forecast_is_zero() {
        let pairs = vec![(1.0, 1.0), (0.0, 0.0)];
        assert_eq!(brier_score(&pairs), Some(0.0));
    }

    #[test]
    fn brier_score_of_maximally_wrong_forecast_is_one() {
        let pairs = vec![(1.0, 0.0)];
        assert_eq!(brier_score(&pairs), Some(1.0));
    }

    #[test]
    fn brier_score_of_empty_input_is_none() {
        assert_eq!(brier_score(&[]), None);
    }

    #[test]
    fn log_score_rewards_confident_correct_forecasts() {
        let confident = log_score(&[(0.99, 1.0)]).unwrap();
        let unsure = log_score(&[(0.51, 1.0)]).unwrap();
        assert!(confident > unsure);
    }

    #[test]
    fn log_score_clamps_against_negative_infinity() {
        let score = log_score(&[(0.0, 1.0)]).unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn skill_score_is_zero_against_a_perfect_baseline() {
        assert_eq!(brier_skill_score(Some(0.1), Some(0.0)), Some(0.0));
    }

    #[test]
    fn skill_score_is_positive_when_model_beats_baseline() {
        let skill = brier_skill_score(Some(0.1), Some(0.2)).unwrap();
        assert!((skill - 0.5).abs() < 1e-9);
    }

    #[test]
    fn skill_score_is_none_when_either_input_is_none() {
        assert_eq!(brier_skill_score(None, Some(0.2)), None);
        assert_eq!(brier_skill_score(Some(0.2), None), None);
    }
}
