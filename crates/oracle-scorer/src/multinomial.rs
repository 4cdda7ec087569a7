// crates/oracle-scorer/src/multinomial.rs
// ============================================================================
// Module: Multinomial Scoring
// Description: Brier score, log score, calibration, and naive-baseline
//              scoring for categorical and binned-continuous events.
// Purpose: Generalize binary scoring to K outcomes. Normalized multinomial
//          Brier (`raw / 2`) is mathematically identical to binary Brier
//          when `outcomes = ["YES", "NO"]`, so the walk-forward baseline
//          machinery in `baseline_walk` is shared rather than duplicated.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, oracle-ledger
// ============================================================================

use std::collections::BTreeMap;

use crate::baseline_walk::BaselineKind;
use crate::baseline_walk::walk_baseline_brier;
use crate::calibration::Calibration;
use crate::calibration::compute_calibration;
use crate::error::ScorerError;

/// Clamp applied to a probability before taking its logarithm.
const LOG_SCORE_EPSILON: f64 = 1e-10;

/// One scored forecast: its full distribution over `outcomes`, and the
/// outcome that actually occurred.
#[derive(Debug, Clone)]
pub struct MultinomialObservation {
    /// The forecast this observation was built from, for error reporting.
    pub forecast_id: String,
    /// Probability distribution over outcome labels.
    pub probabilities: BTreeMap<String, f64>,
    /// The actual outcome.
    pub actual_outcome: String,
}

/// A baseline distribution together with the history-index bookkeeping that
/// produced it, for provenance reporting alongside a scorecard.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineDistributionMeta {
    /// The computed distribution over `outcomes`.
    pub distribution: BTreeMap<String, f64>,
    /// Resolved-history count the distribution was computed from.
    pub history_n: u64,
    /// Whether the bootstrap gate forced a uniform fallback.
    pub fallback: bool,
}

/// The legal outcome labels for `event`, in catalog declaration order,
/// excluding the implicit `UNKNOWN` sentinel.
#[must_use]
pub fn get_outcomes_from_catalog(event: &oracle_catalog::EventDef) -> Vec<String> {
    event.allowed_outcomes.clone()
}

/// Checks that `probabilities` carries an entry for every outcome in
/// `outcomes`.
fn require_full_distribution(
    forecast_id: &str,
    probabilities: &BTreeMap<String, f64>,
    outcomes: &[String],
) -> Result<(), ScorerError> {
    for outcome in outcomes {
        if !probabilities.contains_key(outcome) {
            return Err(ScorerError::MissingOutcomeProbability {
                forecast_id: forecast_id.to_string(),
                outcome: outcome.clone(),
            });
        }
    }
    Ok(())
}

/// Raw multinomial Brier score (`sum_k (p_k - o_k)^2`, range `[0, 2]`)
/// normalized to `[0, 1]` by dividing by 2, for a single observation.
fn normalized_brier_for(
    observation: &MultinomialObservation,
    outcomes: &[String],
) -> Result<f64, ScorerError> {
    require_full_distribution(&observation.forecast_id, &observation.probabilities, outcomes)?;
    let raw: f64 = outcomes
        .iter()
        .map(|outcome| {
            let p = observation.probabilities.get(outcome).copied().unwrap_or(0.0);
            let o = if outcome == &observation.actual_outcome { 1.0 } else { 0.0 };
            (p - o).powi(2)
        })
        .sum();
    Ok(raw / 2.0)
}

/// Mean normalized Brier score across `observations`. Returns `Ok(None)` if
/// `observations` is empty.
///
/// # Errors
///
/// Returns [`ScorerError::MissingOutcomeProbability`] if any observation's
/// distribution is missing an entry for one of `outcomes`.
pub fn multinomial_brier_score(
    observations: &[MultinomialObservation],
    outcomes: &[String],
) -> Result<Option<f64>, ScorerError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let mut total = 0.0;
    for observation in observations {
        total += normalized_brier_for(observation, outcomes)?;
    }
    Ok(Some(total / observations.len() as f64))
}

/// One forecast scored under the effective/penalty regime: a predicted
/// distribution (substituted to uniform by the caller if the forecast
/// abstained) scored against a target distribution (substituted to uniform
/// by the caller if the resolution was `UNKNOWN`).
#[derive(Debug, Clone)]
pub struct EffectiveObservation {
    /// The forecast this observation was built from, for error reporting.
    pub forecast_id: String,
    /// Probability distribution over outcome labels.
    pub probabilities: BTreeMap<String, f64>,
    /// The distribution to score against: one-hot on the actual outcome, or
    /// uniform when the outcome is `UNKNOWN`.
    pub target: BTreeMap<String, f64>,
}

/// Mean normalized Brier score of `observations` against their `target`
/// distributions, rather than a single actual outcome. This generalizes
/// [`multinomial_brier_score`] to cover the effective/penalty regime, where
/// an abstained forecast's `probabilities` are uniform and an `UNKNOWN`
/// resolution's `target` is uniform; for a known outcome and a
/// non-abstained forecast the two functions agree exactly, since a
/// one-hot `target` makes the formulas identical.
///
/// # Errors
///
/// Returns [`ScorerError::MissingOutcomeProbability`] if any observation's
/// `probabilities` is missing an entry for one of `outcomes`.
pub fn effective_multinomial_brier_score(
    observations: &[EffectiveObservation],
    outcomes: &[String],
) -> Result<Option<f64>, ScorerError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let mut total = 0.0;
    for observation in observations {
        require_full_distribution(&observation.forecast_id, &observation.probabilities, outcomes)?;
        let raw: f64 = outcomes
            .iter()
            .map(|outcome| {
                let p = observation.probabilities.get(outcome).copied().unwrap_or(0.0);
                let t = observation.target.get(outcome).copied().unwrap_or(0.0);
                (p - t).powi(2)
            })
            .sum();
        total += raw / 2.0;
    }
    Ok(Some(total / observations.len() as f64))
}

/// An equal-weight distribution over `outcomes`, used as the effective-score
/// substitute for an abstained forecast's prediction or an `UNKNOWN`
/// resolution's target.
#[must_use]
pub fn uniform_target(outcomes: &[String]) -> BTreeMap<String, f64> {
    if outcomes.is_empty() {
        return BTreeMap::new();
    }
    let p = 1.0 / outcomes.len() as f64;
    outcomes.iter().map(|o| (o.clone(), p)).collect()
}

/// Mean log-likelihood of the actual outcome: `mean(ln(p[actual_outcome]))`,
/// clamped to [`LOG_SCORE_EPSILON`] before the logarithm.
///
/// # Errors
///
/// Returns [`ScorerError::MissingOutcomeProbability`] if any observation's
/// distribution is missing an entry for its own `actual_outcome`.
pub fn multinomial_log_score(
    observations: &[MultinomialObservation],
) -> Result<Option<f64>, ScorerError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let mut total = 0.0;
    for observation in observations {
        let Some(p) = observation.probabilities.get(&observation.actual_outcome) else {
            return Err(ScorerError::MissingOutcomeProbability {
                forecast_id: observation.forecast_id.clone(),
                outcome: observation.actual_outcome.clone(),
            });
        };
        total += p.max(LOG_SCORE_EPSILON).ln();
    }
    Ok(Some(total / observations.len() as f64))
}

/// Builds one [`Calibration`] table per outcome in `outcomes`: for outcome
/// `k`, bins `(p_k, indicator(actual_outcome == k))` across `observations`.
#[must_use]
pub fn per_outcome_calibration(
    observations: &[MultinomialObservation],
    outcomes: &[String],
) -> BTreeMap<String, Calibration> {
    let mut out = BTreeMap::new();
    for outcome in outcomes {
        let pairs: Vec<(f64, f64)> = observations
            .iter()
            .map(|observation| {
                let p = observation.probabilities.get(outcome).copied().unwrap_or(0.0);
                let indicator = if &observation.actual_outcome == outcome { 1.0 } else { 0.0 };
                (p, indicator)
            })
            .collect();
        out.insert(outcome.clone(), compute_calibration(&pairs));
    }
    out
}

/// Computes the climatology baseline distribution for one
/// `(event_id, horizon_days)` as of `as_of_utc`, with history bookkeeping
/// attached for provenance.
///
/// # Errors
///
/// Returns [`ScorerError`] if building the history index fails.
pub fn multinomial_climatology_baseline_with_metadata(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
    as_of_utc: time::OffsetDateTime,
) -> Result<BaselineDistributionMeta, ScorerError> {
    let index = oracle_baseline::build_history_index(resolutions, corrections, config, as_of_utc)?;
    let group = index.get(event_id, horizon_days);
    let event_config = oracle_baseline::get_event_config(config, event_id);
    let history_n = group.map_or(0, |g| g.history_n);
    let distribution =
        oracle_baseline::compute_climatology_distribution(group, outcomes, &event_config);
    Ok(BaselineDistributionMeta {
        distribution,
        history_n,
        fallback: history_n < event_config.min_history_n,
    })
}

/// Computes the persistence baseline distribution for one
/// `(event_id, horizon_days)` as of `as_of_utc`, with history bookkeeping
/// attached for provenance.
///
/// # Errors
///
/// See [`multinomial_climatology_baseline_with_metadata`].
pub fn multinomial_persistence_baseline_with_metadata(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
    as_of_utc: time::OffsetDateTime,
) -> Result<BaselineDistributionMeta, ScorerError> {
    let index = oracle_baseline::build_history_index(resolutions, corrections, config, as_of_utc)?;
    let group = index.get(event_id, horizon_days);
    let event_config = oracle_baseline::get_event_config(config, event_id);
    let history_n = group.map_or(0, |g| g.history_n);
    let distribution =
        oracle_baseline::compute_persistence_distribution(group, outcomes, &event_config);
    Ok(BaselineDistributionMeta {
        distribution,
        history_n,
        fallback: history_n < event_config.min_history_n,
    })
}

/// Walk-forward normalized Brier score of the climatology baseline against
/// its own resolution history for one `(event_id, horizon_days)` over
/// `outcomes`.
///
/// # Errors
///
/// Returns [`ScorerError`] if a scored resolution's `resolved_at_utc` fails
/// to parse.
pub fn multinomial_climatology_brier(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
) -> Result<(Option<f64>, usize), ScorerError> {
    Ok(walk_baseline_brier(
        resolutions,
        corrections,
        config,
        event_id,
        horizon_days,
        outcomes,
        BaselineKind::Climatology,
    )?)
}

/// Walk-forward normalized Brier score of the persistence baseline against
/// its own resolution history for one `(event_id, horizon_days)` over
/// `outcomes`.
///
/// # Errors
///
/// See [`multinomial_climatology_brier`].
pub fn multinomial_persistence_brier(
    resolutions: &[oracle_ledger::ResolutionRecord],
    corrections: &[oracle_ledger::CorrectionRecord],
    config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
) -> Result<(Option<f64>, usize), ScorerError> {
    Ok(walk_baseline_brier(
        resolutions,
        corrections,
        config,
        event_id,
        horizon_days,
        outcomes,
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

    fn observation(probabilities: &[(&str, f64)], actual: &str) -> MultinomialObservation {
        MultinomialObservation {
            forecast_id: "fcst_test".to_string(),
            probabilities: probabilities.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            actual_outcome: actual.to_string(),
        }
    }

    #[test]
    fn binary_special_case_matches_binary_brier_formula() {
        let outcomes = vec!["YES".to_string(), "NO".to_string()];
        let obs = observation(&[("YES", 0.7), ("NO", 0.3)], "YES");
        let brier = multinomial_brier_score(&[obs], &outcomes).unwrap().unwrap();
        let expected = (0.7_f64 - 1.0).powi(2);
        assert!((brier - expected).abs() < 1e-9);
    }

    #[test]
    fn missing_outcome_probability_is_an_error() {
        let outcomes = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let obs = observation(&[("A", 0.5), ("B", 0.5)], "A");
        let err = multinomial_brier_score(&[obs], &outcomes).unwrap_err();
        assert!(matches!(err, ScorerError::MissingOutcomeProbability { .. }));
    }

    #[test]
    fn perfect_categorical_forecast_scores_zero() {
        let outcomes = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let obs = observation(&[("A", 1.0), ("B", 0.0), ("C", 0.0)], "A");
        let brier = multinomial_brier_score(&[obs], &outcomes).unwrap().unwrap();
        assert!((brier - 0.0).abs() < 1e-9);
    }

    #[test]
    fn per_outcome_calibration_has_one_table_per_outcome() {
        let outcomes = vec!["A".to_string(), "B".to_string()];
        let observations = vec![
            observation(&[("A", 0.9), ("B", 0.1)], "A"),
            observation(&[("A", 0.1), ("B", 0.9)], "B"),
        ];
        let tables = per_outcome_calibration(&observations, &outcomes);
        assert_eq!(tables.len(), 2);
        assert!(tables.contains_key("A"));
        assert!(tables.contains_key("B"));
    }

    #[test]
    fn log_score_errors_on_missing_actual_outcome_probability() {
        let obs = observation(&[("A", 1.0)], "B");
        let err = multinomial_log_score(&[obs]).unwrap_err();
        assert!(matches!(err, ScorerError::MissingOutcomeProbability { .. }));
    }

    #[test]
    fn effective_score_with_unknown_target_matches_scenario_f() {
        let outcomes = vec!["YES".to_string(), "NO".to_string()];
        let observation = EffectiveObservation {
            forecast_id: "fcst_test".to_string(),
            probabilities: [("YES".to_string(), 0.9), ("NO".to_string(), 0.1)].into(),
            target: uniform_target(&outcomes),
        };
        let brier = effective_multinomial_brier_score(&[observation], &outcomes).unwrap().unwrap();
        assert!((brier - 0.16).abs() < 1e-9);
    }

    #[test]
    fn effective_score_with_one_hot_target_matches_plain_brier() {
        let outcomes = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let target: BTreeMap<String, f64> =
            [("A".to_string(), 1.0), ("B".to_string(), 0.0), ("C".to_string(), 0.0)].into();
        let observation = EffectiveObservation {
            forecast_id: "fcst_test".to_string(),
            probabilities: [("A".to_string(), 0.7), ("B".to_string(), 0.2), ("C".to_string(), 0.1)]
                .into(),
            target,
        };
        let effective =
            effective_multinomial_brier_score(&[observation], &outcomes).unwrap().unwrap();
        let plain = multinomial_brier_score(
            &[observation_struct(&[("A", 0.7), ("B", 0.2), ("C", 0.1)], "A")],
            &outcomes,
        )
        .unwrap()
        .unwrap();
        assert!((effective - plain).abs() < 1e-9);
    }

    fn observation_struct(probabilities: &[(&str, f64)], actual: &str) -> MultinomialObservation {
        observation(probabilities, actual)
    }
}
