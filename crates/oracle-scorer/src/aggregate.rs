// crates/oracle-scorer/src/aggregate.rs
// ============================================================================
// Module: Score Aggregation
// Description: Joins forecasts to resolutions, classifies coverage, and
//              folds binary/multinomial scoring into the per-forecaster,
//              per-mode, per-type, and per-event breakdowns a scorecard
//              reports.
// Purpose: One place that knows how a `ForecastRecord` and its (possibly
//          absent, possibly corrected) `ResolutionRecord` become a scored
//          observation, so `binary.rs`/`multinomial.rs` stay pure math.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, oracle-ledger
// ============================================================================

use std::collections::BTreeMap;

use oracle_catalog::EventCatalog;
use oracle_catalog::EventDef;
use oracle_core::ResolutionMode;
use oracle_core::UNKNOWN_OUTCOME;
use oracle_ledger::CorrectionRecord;
use oracle_ledger::ForecastRecord;
use oracle_ledger::ResolutionRecord;
use serde::Serialize;

use crate::binary;
use crate::calibration::Calibration;
use crate::calibration::compute_calibration;
use crate::error::ScorerError;
use crate::multinomial;
use crate::multinomial::EffectiveObservation;
use crate::multinomial::MultinomialObservation;

/// `forecaster_id` of the live, non-baseline, non-ensemble forecaster whose
/// accuracy is reported as the primary signal.
const PRIMARY_FORECASTER_ID: &str = oracle_forecast::BASE_FORECASTER_ID;

/// The default mode filter for [`ModeFilterKind::Core`].
const CORE_MODES: [ResolutionMode; 2] = [ResolutionMode::ExternalAuto, ResolutionMode::ExternalManual];
/// The mode filter for [`ModeFilterKind::ClaimsInferred`].
const CLAIMS_INFERRED_MODES: [ResolutionMode; 1] = [ResolutionMode::ClaimsInferred];
/// The mode filter for [`ModeFilterKind::Combined`]: every mode, unfiltered.
const COMBINED_MODES: [ResolutionMode; 3] =
    [ResolutionMode::ExternalAuto, ResolutionMode::ExternalManual, ResolutionMode::ClaimsInferred];

// ============================================================================
// SECTION: Counts and Coverage
// ============================================================================

/// Raw record counts across every forecast matched against `resolutions`
/// (after corrections), regardless of forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreCounts {
    /// Total forecast records present.
    pub total_forecasts: u64,
    /// Forecasts with a matching resolution record, known or `UNKNOWN`.
    pub resolved: u64,
    /// Forecasts with no matching resolution record yet.
    pub unresolved: u64,
    /// Forecasts the forecaster declined to produce a live distribution
    /// for.
    pub abstained: u64,
    /// Forecasts whose matching resolution resolved to `UNKNOWN`.
    pub unknown: u64,
}

/// The four mutually exclusive coverage categories every forecast record
/// falls into exactly once, plus the derived coverage rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CoverageMetrics {
    /// Resolved to a known outcome, forecaster did not abstain.
    pub resolved_known: u64,
    /// Resolved to `UNKNOWN`, forecaster did not abstain.
    pub resolved_unknown: u64,
    /// Forecaster abstained, regardless of resolution status.
    pub abstained: u64,
    /// No resolution yet, forecaster did not abstain.
    pub unresolved: u64,
    /// `resolved_known / total`, the fraction of forecasts that produced a
    /// verifiable accuracy signal.
    pub coverage_rate: f64,
}

/// Classifies every forecast in `forecasts` into exactly one of the four
/// [`CoverageMetrics`] buckets, matching it against `resolutions` (latest
/// correction applied) by `forecast_id`.
#[must_use]
pub fn compute_coverage_metrics(
    forecasts: &[ForecastRecord],
    resolutions: &[ResolutionRecord],
) -> CoverageMetrics {
    let by_forecast: BTreeMap<&str, &ResolutionRecord> =
        resolutions.iter().map(|r| (r.forecast_id.as_str(), r)).collect();

    let mut metrics = CoverageMetrics::default();
    for forecast in forecasts {
        if forecast.abstain {
            metrics.abstained += 1;
            continue;
        }
        match by_forecast.get(forecast.forecast_id.as_str()) {
            None => metrics.unresolved += 1,
            Some(resolution) if resolution.resolved_outcome == UNKNOWN_OUTCOME => {
                metrics.resolved_unknown += 1;
            }
            Some(_) => metrics.resolved_known += 1,
        }
    }

    let total = metrics.resolved_known + metrics.resolved_unknown + metrics.abstained + metrics.unresolved;
    metrics.coverage_rate = if total == 0 { 0.0 } else { metrics.resolved_known as f64 / total as f64 };
    metrics
}

/// Tallies [`ScoreCounts`] over `forecasts` matched against `resolutions`.
fn compute_counts(forecasts: &[ForecastRecord], resolutions: &[ResolutionRecord]) -> ScoreCounts {
    let by_forecast: BTreeMap<&str, &ResolutionRecord> =
        resolutions.iter().map(|r| (r.forecast_id.as_str(), r)).collect();

    let mut counts = ScoreCounts { total_forecasts: forecasts.len() as u64, ..ScoreCounts::default() };
    for forecast in forecasts {
        if forecast.abstain {
            counts.abstained += 1;
        }
        match by_forecast.get(forecast.forecast_id.as_str()) {
            None => counts.unresolved += 1,
            Some(resolution) => {
                counts.resolved += 1;
                if resolution.resolved_outcome == UNKNOWN_OUTCOME {
                    counts.unknown += 1;
                }
            }
        }
    }
    counts
}

// ============================================================================
// SECTION: Accuracy and Penalty Metrics
// ============================================================================

/// Pooled accuracy metrics, reported on the normalized `[0, 1]` Brier scale
/// shared by binary (`outcomes = ["YES", "NO"]`) and multinomial events
/// alike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AccuracyMetrics {
    /// Mean normalized Brier score over scored observations.
    pub brier: Option<f64>,
    /// Mean log score over scored observations.
    pub log_score: Option<f64>,
    /// Number of observations the metrics were computed from.
    pub n: u64,
}

/// Effective/penalty scoring: the same normalized Brier scale, but computed
/// over every resolved record (abstained forecasts scored as uniform,
/// `UNKNOWN` resolutions scored against uniform) instead of excluding them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PenaltyMetrics {
    /// Effective Brier score including abstained forecasts and `UNKNOWN`
    /// resolutions.
    pub effective_brier: Option<f64>,
    /// `effective_brier - primary_brier`; the cost of over-confidence on
    /// cases that could not be verified. `None` if either input is `None`.
    pub unknown_abstain_penalty: Option<f64>,
}

/// One matched `(forecast, resolution)` pair, with the resolution already
/// correction-applied and possibly absent.
struct Matched<'a> {
    /// The forecast half of the pair.
    forecast: &'a ForecastRecord,
    /// The matching resolution, if the forecast has been resolved.
    resolution: Option<&'a ResolutionRecord>,
}

/// Matches every forecast in `forecasts` to its resolution (if any) in
/// `resolutions`.
fn match_records<'a>(
    forecasts: &'a [ForecastRecord],
    resolutions: &'a [ResolutionRecord],
) -> Vec<Matched<'a>> {
    let by_forecast: BTreeMap<&str, &ResolutionRecord> =
        resolutions.iter().map(|r| (r.forecast_id.as_str(), r)).collect();
    forecasts
        .iter()
        .map(|forecast| Matched {
            forecast,
            resolution: by_forecast.get(forecast.forecast_id.as_str()).copied(),
        })
        .collect()
}

/// The outcomes a forecast's distribution should be scored over, given its
/// `distribution_type`.
fn outcomes_for(event: &EventDef) -> Vec<String> {
    if event.event_type == oracle_core::EventType::Binary {
        vec!["YES".to_string(), "NO".to_string()]
    } else {
        multinomial::get_outcomes_from_catalog(event)
    }
}

/// Computes [`AccuracyMetrics`] and [`PenaltyMetrics`] for `event` over
/// `forecasts` already filtered to one forecaster and `mode_filter`.
///
/// Primary accuracy excludes abstained forecasts and unresolved/`UNKNOWN`
/// resolutions. Penalty scoring includes every resolved record, substituting
/// a uniform prediction for abstained forecasts and a uniform target for
/// `UNKNOWN` resolutions.
///
/// # Errors
///
/// Returns [`ScorerError::MissingOutcomeProbability`] if a forecast's
/// `probabilities` is missing an entry for one of the event's outcomes.
fn score_matched(
    outcomes: &[String],
    matched: &[Matched<'_>],
    mode_filter: &[ResolutionMode],
) -> Result<(AccuracyMetrics, PenaltyMetrics, Calibration), ScorerError> {
    let eligible: Vec<&Matched<'_>> = matched
        .iter()
        .filter(|m| m.resolution.is_none_or(|r| mode_filter.contains(&r.resolution_mode)))
        .collect();

    let mut primary_observations = Vec::new();
    let mut effective_observations = Vec::new();

    for m in &eligible {
        let Some(resolution) = m.resolution else { continue };

        let is_known = resolution.resolved_outcome != UNKNOWN_OUTCOME;
        if !m.forecast.abstain && is_known {
            primary_observations.push(MultinomialObservation {
                forecast_id: m.forecast.forecast_id.clone(),
                probabilities: m.forecast.probabilities.clone(),
                actual_outcome: resolution.resolved_outcome.clone(),
            });
        }

        let probabilities = if m.forecast.abstain {
            multinomial::uniform_target(outcomes)
        } else {
            m.forecast.probabilities.clone()
        };
        let target = if is_known {
            outcomes
                .iter()
                .map(|o| (o.clone(), if o == &resolution.resolved_outcome { 1.0 } else { 0.0 }))
                .collect()
        } else {
            multinomial::uniform_target(outcomes)
        };
        effective_observations.push(EffectiveObservation {
            forecast_id: m.forecast.forecast_id.clone(),
            probabilities,
            target,
        });
    }

    let brier = multinomial::multinomial_brier_score(&primary_observations, outcomes)?;
    let log_score = multinomial::multinomial_log_score(&primary_observations)?;
    let effective_brier =
        multinomial::effective_multinomial_brier_score(&effective_observations, outcomes)?;
    let unknown_abstain_penalty = match (effective_brier, brier) {
        (Some(e), Some(b)) => Some(e - b),
        _ => None,
    };

    let calibration_pairs: Vec<(f64, f64)> = primary_observations
        .iter()
        .filter_map(|o| {
            let primary_outcome = outcomes.first()?;
            let p = o.probabilities.get(primary_outcome).copied()?;
            let indicator = if &o.actual_outcome == primary_outcome { 1.0 } else { 0.0 };
            Some((p, indicator))
        })
        .collect();

    Ok((
        AccuracyMetrics { brier, log_score, n: primary_observations.len() as u64 },
        PenaltyMetrics { effective_brier, unknown_abstain_penalty },
        compute_calibration(&calibration_pairs),
    ))
}

// ============================================================================
// SECTION: Per-Forecaster and Per-Type Breakdown
// ============================================================================

/// Groups `forecasts` by `forecaster_id`.
#[must_use]
pub fn group_by_forecaster(forecasts: &[ForecastRecord]) -> BTreeMap<String, Vec<ForecastRecord>> {
    let mut groups: BTreeMap<String, Vec<ForecastRecord>> = BTreeMap::new();
    for forecast in forecasts {
        groups.entry(forecast.forecaster_id.clone()).or_default().push(forecast.clone());
    }
    groups
}

/// Computes [`AccuracyMetrics`] per `forecaster_id`, scoring each
/// forecaster's own distributions against its own resolved, non-abstained,
/// known-outcome forecasts (unrestricted by `mode_filter`, so every
/// forecaster — including `oracle_baseline_*` ones — appears in the
/// breakdown even though baseline forecasters are excluded from the
/// *primary* accuracy figure).
///
/// # Errors
///
/// Returns [`ScorerError`] if a forecaster's distribution is missing an
/// outcome probability.
pub fn compute_scores_by_forecaster(
    catalog: &EventCatalog,
    forecasts: &[ForecastRecord],
    resolutions: &[ResolutionRecord],
) -> Result<BTreeMap<String, AccuracyMetrics>, ScorerError> {
    let mut out = BTreeMap::new();
    for (forecaster_id, group) in group_by_forecaster(forecasts) {
        let mut observations = Vec::new();
        for forecast in &group {
            if oracle_catalog::get_event(catalog, &forecast.event_id).is_err() {
                continue;
            }
            let Some(resolution) =
                resolutions.iter().find(|r| r.forecast_id == forecast.forecast_id)
            else {
                continue;
            };
            if forecast.abstain || resolution.resolved_outcome == UNKNOWN_OUTCOME {
                continue;
            }
            observations.push(MultinomialObservation {
                forecast_id: forecast.forecast_id.clone(),
                probabilities: forecast.probabilities.clone(),
                actual_outcome: resolution.resolved_outcome.clone(),
            });
        }
        let brier = pooled_brier(&observations)?;
        let log_score = multinomial::multinomial_log_score(&observations)?;
        out.insert(
            forecaster_id,
            AccuracyMetrics { brier, log_score, n: observations.len() as u64 },
        );
    }
    Ok(out)
}

/// Stable string tag for an [`oracle_core::EventType`], used as a map key.
const fn event_type_tag(event_type: oracle_core::EventType) -> &'static str {
    match event_type {
        oracle_core::EventType::Binary => "binary",
        oracle_core::EventType::Categorical => "categorical",
        oracle_core::EventType::BinnedContinuous => "binned_continuous",
        oracle_core::EventType::DiagnosticOnly => "diagnostic_only",
    }
}

// ============================================================================
// SECTION: Baselines
// ============================================================================

/// A naive baseline's walk-forward accuracy against its own resolution
/// history for one event, plus the skill it affords the primary forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BaselineSummary {
    /// Walk-forward normalized Brier score of the climatology baseline.
    pub climatology_brier: Option<f64>,
    /// Walk-forward normalized Brier score of the persistence baseline.
    pub persistence_brier: Option<f64>,
    /// `1 - model_brier / climatology_brier`.
    pub climatology_skill: Option<f64>,
    /// `1 - model_brier / persistence_brier`.
    pub persistence_skill: Option<f64>,
    /// Resolved-history count backing the most recent baseline distribution.
    pub history_n: u64,
    /// Whether the bootstrap gate forced a uniform fallback as of the last
    /// computed distribution.
    pub fallback: bool,
}

/// Computes [`BaselineSummary`] for one `(event_id, horizon_days)`.
///
/// # Errors
///
/// Returns [`ScorerError`] if a resolution's `resolved_at_utc` fails to
/// parse, or `as_of_utc` parsing fails inside the history-index build.
fn compute_baselines(
    resolutions: &[ResolutionRecord],
    corrections: &[CorrectionRecord],
    baseline_config: &oracle_baseline::BaselineConfig,
    event_id: &str,
    horizon_days: u32,
    outcomes: &[String],
    as_of_utc: time::OffsetDateTime,
    model_brier: Option<f64>,
) -> Result<BaselineSummary, ScorerError> {
    let (climatology_brier, _) = multinomial::multinomial_climatology_brier(
        resolutions,
        corrections,
        baseline_config,
        event_id,
        horizon_days,
        outcomes,
    )?;
    let (persistence_brier, _) = multinomial::multinomial_persistence_brier(
        resolutions,
        corrections,
        baseline_config,
        event_id,
        horizon_days,
        outcomes,
    )?;
    let latest = multinomial::multinomial_climatology_baseline_with_metadata(
        resolutions,
        corrections,
        baseline_config,
        event_id,
        horizon_days,
        outcomes,
        as_of_utc,
    )?;

    Ok(BaselineSummary {
        climatology_brier,
        persistence_brier,
        climatology_skill: binary::brier_skill_score(model_brier, climatology_brier),
        persistence_skill: binary::brier_skill_score(model_brier, persistence_brier),
        history_n: latest.history_n,
        fallback: latest.fallback,
    })
}

// ============================================================================
// SECTION: Per-Event Scoring
// ============================================================================

/// Scores for one event, broken down further by horizon.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventScores {
    /// The event this breakdown covers.
    pub event_id: String,
    /// Pooled accuracy across every horizon.
    pub accuracy: AccuracyMetrics,
    /// Pooled penalty metrics across every horizon.
    pub penalty: PenaltyMetrics,
    /// Calibration table for the event's primary outcome (the first entry
    /// of `allowed_outcomes` for binary events; per-outcome for
    /// categorical/binned events is available via [`HorizonScores`]).
    pub calibration: Calibration,
    /// Pooled baseline summary across every horizon.
    pub baselines: BaselineSummary,
    /// Per-horizon slices.
    pub by_horizon: BTreeMap<u32, HorizonScores>,
}

/// One horizon's slice of an event's scores.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HorizonScores {
    /// Accuracy at this horizon.
    pub accuracy: AccuracyMetrics,
    /// Penalty metrics at this horizon.
    pub penalty: PenaltyMetrics,
    /// Calibration table at this horizon.
    pub calibration: Calibration,
    /// Per-outcome calibration, populated for categorical/binned events.
    pub per_outcome_calibration: BTreeMap<String, Calibration>,
    /// Baseline summary at this horizon.
    pub baselines: BaselineSummary,
}

/// Computes [`EventScores`] for one event: the primary forecaster's
/// accuracy, penalty, calibration, and baseline comparison, pooled across
/// every horizon the event is forecasted at and broken out per horizon.
///
/// # Errors
///
/// Returns [`ScorerError`] if any per-horizon computation fails.
#[allow(clippy::too_many_arguments)]
pub fn compute_event_scores(
    event: &EventDef,
    forecasts: &[ForecastRecord],
    resolutions: &[ResolutionRecord],
    corrections: &[CorrectionRecord],
    baseline_config: &oracle_baseline::BaselineConfig,
    mode_filter: &[ResolutionMode],
    as_of_utc: time::OffsetDateTime,
) -> Result<EventScores, ScorerError> {
    let corrected = oracle_ledger::apply_corrections(resolutions.to_vec(), corrections);
    let outcomes = outcomes_for(event);
    let event_forecasts: Vec<ForecastRecord> = forecasts
        .iter()
        .filter(|f| f.event_id == event.event_id && f.forecaster_id == PRIMARY_FORECASTER_ID)
        .cloned()
        .collect();

    let mut pooled_primary = Vec::new();
    let mut pooled_effective = Vec::new();
    let mut pooled_calibration_pairs = Vec::new();
    let mut by_horizon = BTreeMap::new();

    for &horizon_days in &event.horizons_days {
        let horizon_forecasts: Vec<ForecastRecord> =
            event_forecasts.iter().filter(|f| f.horizon_days == horizon_days).cloned().collect();
        let matched = match_records(&horizon_forecasts, &corrected);

        let (accuracy, penalty, calibration) = score_matched(&outcomes, &matched, mode_filter)?;

        let per_outcome_calibration = if outcomes.len() > 2 {
            let observations: Vec<MultinomialObservation> = matched
                .iter()
                .filter_map(|m| {
                    let resolution = m.resolution?;
                    if m.forecast.abstain || resolution.resolved_outcome == UNKNOWN_OUTCOME {
                        return None;
                    }
                    Some(MultinomialObservation {
                        forecast_id: m.forecast.forecast_id.clone(),
                        probabilities: m.forecast.probabilities.clone(),
                        actual_outcome: resolution.resolved_outcome.clone(),
                    })
                })
                .collect();
            multinomial::per_outcome_calibration(&observations, &outcomes)
        } else {
            BTreeMap::new()
        };

        let baselines = compute_baselines(
            &corrected,
            &[],
            baseline_config,
            &event.event_id,
            horizon_days,
            &outcomes,
            as_of_utc,
            accuracy.brier,
        )?;

        for m in &matched {
            let Some(resolution) = m.resolution else { continue };
            if m.forecast.abstain || resolution.resolved_outcome == UNKNOWN_OUTCOME {
                continue;
            }
            pooled_primary.push(MultinomialObservation {
                forecast_id: m.forecast.forecast_id.clone(),
                probabilities: m.forecast.probabilities.clone(),
                actual_outcome: resolution.resolved_outcome.clone(),
            });
            if let Some(primary_outcome) = outcomes.first() {
                if let Some(p) = m.forecast.probabilities.get(primary_outcome) {
                    let indicator = if &resolution.resolved_outcome == primary_outcome {
                        1.0
                    } else {
                        0.0
                    };
                    pooled_calibration_pairs.push((*p, indicator));
                }
            }
        }

        by_horizon.insert(
            horizon_days,
            HorizonScores { accuracy, penalty, calibration, per_outcome_calibration, baselines },
        );
    }

    for m in match_records(&event_forecasts, &corrected) {
        let Some(resolution) = m.resolution else { continue };
        if m.forecast.abstain || resolution.resolved_outcome == UNKNOWN_OUTCOME {
            continue;
        }
        pooled_effective.push(EffectiveObservation {
            forecast_id: m.forecast.forecast_id.clone(),
            probabilities: m.forecast.probabilities.clone(),
            target: outcomes
                .iter()
                .map(|o| (o.clone(), if o == &resolution.resolved_outcome { 1.0 } else { 0.0 }))
                .collect(),
        });
    }

    let brier = multinomial::multinomial_brier_score(&pooled_primary, &outcomes)?;
    let log_score = multinomial::multinomial_log_score(&pooled_primary)?;
    let effective_brier =
        multinomial::effective_multinomial_brier_score(&pooled_effective, &outcomes)?;

    let pooled_history_n =
        by_horizon.values().map(|h| h.baselines.history_n).max().unwrap_or_default();
    let pooled_fallback = by_horizon.values().any(|h| h.baselines.fallback);
    let pooled_climatology = by_horizon
        .values()
        .filter_map(|h| h.baselines.climatology_brier)
        .collect::<Vec<_>>();
    let pooled_persistence = by_horizon
        .values()
        .filter_map(|h| h.baselines.persistence_brier)
        .collect::<Vec<_>>();
    let mean = |xs: &[f64]| -> Option<f64> {
        if xs.is_empty() { None } else { Some(xs.iter().sum::<f64>() / xs.len() as f64) }
    };

    Ok(EventScores {
        event_id: event.event_id.clone(),
        accuracy: AccuracyMetrics { brier, log_score, n: pooled_primary.len() as u64 },
        penalty: PenaltyMetrics {
            effective_brier,
            unknown_abstain_penalty: match (effective_brier, brier) {
                (Some(e), Some(b)) => Some(e - b),
                _ => None,
            },
        },
        calibration: compute_calibration(&pooled_calibration_pairs),
        baselines: BaselineSummary {
            climatology_brier: mean(&pooled_climatology),
            persistence_brier: mean(&pooled_persistence),
            climatology_skill: binary::brier_skill_score(brier, mean(&pooled_climatology)),
            persistence_skill: binary::brier_skill_score(brier, mean(&pooled_persistence)),
            history_n: pooled_history_n,
            fallback: pooled_fallback,
        },
        by_horizon,
    })
}

// ============================================================================
// SECTION: Top-Level Scorecard
// ============================================================================

/// Which mode-filtered slice of the ledger a score breakdown was computed
/// over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFilterKind {
    /// `{external_auto, external_manual}`.
    Core,
    /// `{claims_inferred}`.
    ClaimsInferred,
    /// Every mode, unfiltered.
    Combined,
}

impl ModeFilterKind {
    /// The concrete mode set this variant filters to.
    #[must_use]
    pub const fn modes(self) -> &'static [ResolutionMode] {
        match self {
            Self::Core => &CORE_MODES,
            Self::ClaimsInferred => &CLAIMS_INFERRED_MODES,
            Self::Combined => &COMBINED_MODES,
        }
    }
}

/// The complete scorecard produced by one [`compute_scores`] call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scorecard {
    /// Raw record counts.
    pub counts: ScoreCounts,
    /// Coverage breakdown and rate.
    pub coverage: CoverageMetrics,
    /// Primary forecaster accuracy, filtered to `mode_filter`.
    pub accuracy: AccuracyMetrics,
    /// Primary forecaster penalty metrics, filtered to `mode_filter`.
    pub penalty: PenaltyMetrics,
    /// Accuracy restricted to `{external_auto, external_manual}`.
    pub core_scores: AccuracyMetrics,
    /// Accuracy restricted to `{claims_inferred}`.
    pub claims_inferred_scores: AccuracyMetrics,
    /// Accuracy over every mode, unfiltered.
    pub combined_scores: AccuracyMetrics,
    /// Accuracy per `forecaster_id`, including baseline and ensemble
    /// forecasters.
    pub scores_by_forecaster: BTreeMap<String, AccuracyMetrics>,
    /// Accuracy per event type tag (`"binary"`, `"categorical"`,
    /// `"binned_continuous"`).
    pub scores_by_type: BTreeMap<String, AccuracyMetrics>,
    /// Full per-event breakdown, including per-horizon slices.
    pub scores_by_event: BTreeMap<String, EventScores>,
    /// Event ids where a baseline distribution fell back to uniform for
    /// lack of history.
    pub baseline_fallback_warnings: Vec<String>,
}

/// Computes the full scorecard's accuracy/penalty pair for `mode_filter`
/// against the primary forecaster's forecasts across `events`.
///
/// # Errors
///
/// Returns [`ScorerError`] if any per-event computation fails.
pub fn compute_scores_for_mode(
    events: &[&EventDef],
    forecasts: &[ForecastRecord],
    resolutions: &[ResolutionRecord],
    mode_filter: &[ResolutionMode],
) -> Result<(AccuracyMetrics, PenaltyMetrics), ScorerError> {
    let mut primary_observations = Vec::new();
    let mut effective_observations = Vec::new();

    for event in events {
        let outcomes = outcomes_for(event);
        let event_forecasts: Vec<ForecastRecord> = forecasts
            .iter()
            .filter(|f| f.event_id == event.event_id && f.forecaster_id == PRIMARY_FORECASTER_ID)
            .cloned()
            .collect();
        let matched = match_records(&event_forecasts, resolutions);
        for m in matched.iter().filter(|m| m.resolution.is_none_or(|r| mode_filter.contains(&r.resolution_mode)))
        {
            let Some(resolution) = m.resolution else { continue };
            let is_known = resolution.resolved_outcome != UNKNOWN_OUTCOME;
            if !m.forecast.abstain && is_known {
                primary_observations.push(MultinomialObservation {
                    forecast_id: m.forecast.forecast_id.clone(),
                    probabilities: m.forecast.probabilities.clone(),
                    actual_outcome: resolution.resolved_outcome.clone(),
                });
            }
            let probabilities = if m.forecast.abstain {
                multinomial::uniform_target(&outcomes)
            } else {
                m.forecast.probabilities.clone()
            };
            let target = if is_known {
                outcomes
                    .iter()
                    .map(|o| (o.clone(), if o == &resolution.resolved_outcome { 1.0 } else { 0.0 }))
                    .collect()
            } else {
                multinomial::uniform_target(&outcomes)
            };
            effective_observations.push(EffectiveObservation {
                forecast_id: m.forecast.forecast_id.clone(),
                probabilities,
                target,
            });
        }
    }

    // Observations from different event types share the same normalized
    // [0, 1] Brier scale, but each carries its own outcome set; score one
    // event-type cohort at a time and pool the means, weighted by count.
    let brier = pooled_brier(&primary_observations)?;
    let log_score = pooled_log_score(&primary_observations)?;
    let effective_brier = pooled_effective_brier(&effective_observations)?;
    let unknown_abstain_penalty = match (effective_brier, brier) {
        (Some(e), Some(b)) => Some(e - b),
        _ => None,
    };

    Ok((
        AccuracyMetrics { brier, log_score, n: primary_observations.len() as u64 },
        PenaltyMetrics { effective_brier, unknown_abstain_penalty },
    ))
}

/// Scores each observation against its own distribution's outcome keys
/// (sorted, since [`MultinomialObservation::probabilities`] already spans
/// exactly the event's outcomes) and pools the mean.
fn pooled_brier(observations: &[MultinomialObservation]) -> Result<Option<f64>, ScorerError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let mut total = 0.0;
    for observation in observations {
        let outcomes: Vec<String> = observation.probabilities.keys().cloned().collect();
        total += multinomial::multinomial_brier_score(std::slice::from_ref(observation), &outcomes)?
            .unwrap_or(0.0);
    }
    Ok(Some(total / observations.len() as f64))
}

/// As [`pooled_brier`], for log score.
fn pooled_log_score(observations: &[MultinomialObservation]) -> Result<Option<f64>, ScorerError> {
    multinomial::multinomial_log_score(observations)
}

/// As [`pooled_brier`], for effective/penalty Brier.
fn pooled_effective_brier(observations: &[EffectiveObservation]) -> Result<Option<f64>, ScorerError> {
    if observations.is_empty() {
        return Ok(None);
    }
    let mut total = 0.0;
    for observation in observations {
        let outcomes: Vec<String> = observation.probabilities.keys().cloned().collect();
        total += multinomial::effective_multinomial_brier_score(
            std::slice::from_ref(observation),
            &outcomes,
        )?
        .unwrap_or(0.0);
    }
    Ok(Some(total / observations.len() as f64))
}

/// Computes the complete [`Scorecard`]: counts, coverage, primary accuracy
/// and penalty under `mode_filter`, the three standard mode breakdowns,
/// per-forecaster and per-type accuracy, and a full per-event (per-horizon)
/// breakdown with baseline comparisons.
///
/// # Errors
///
/// Returns [`ScorerError`] if any per-event or per-forecaster computation
/// fails, most commonly [`ScorerError::MissingOutcomeProbability`] for a
/// malformed ledger record.
#[allow(clippy::too_many_arguments)]
pub fn compute_scores(
    catalog: &EventCatalog,
    forecasts: &[ForecastRecord],
    resolutions: &[ResolutionRecord],
    corrections: &[CorrectionRecord],
    baseline_config: &oracle_baseline::BaselineConfig,
    mode_filter: &[ResolutionMode],
    event_id_filter: Option<&str>,
    horizon_filter: Option<u32>,
    as_of_utc: time::OffsetDateTime,
) -> Result<Scorecard, ScorerError> {
    let corrected = oracle_ledger::apply_corrections(resolutions.to_vec(), corrections);

    let events: Vec<&EventDef> = oracle_catalog::get_forecastable_events(catalog)
        .into_iter()
        .filter(|e| event_id_filter.is_none_or(|id| e.event_id == id))
        .collect();

    let primary_forecasts: Vec<ForecastRecord> = forecasts
        .iter()
        .filter(|f| f.forecaster_id == PRIMARY_FORECASTER_ID)
        .filter(|f| event_id_filter.is_none_or(|id| f.event_id == id))
        .filter(|f| horizon_filter.is_none_or(|h| f.horizon_days == h))
        .cloned()
        .collect();

    let counts = compute_counts(&primary_forecasts, &corrected);
    let coverage = compute_coverage_metrics(&primary_forecasts, &corrected);

    let (accuracy, penalty) =
        compute_scores_for_mode(&events, &primary_forecasts, &corrected, mode_filter)?;
    let (core_scores, _) = compute_scores_for_mode(
        &events,
        &primary_forecasts,
        &corrected,
        ModeFilterKind::Core.modes(),
    )?;
    let (claims_inferred_scores, _) = compute_scores_for_mode(
        &events,
        &primary_forecasts,
        &corrected,
        ModeFilterKind::ClaimsInferred.modes(),
    )?;
    let (combined_scores, _) = compute_scores_for_mode(
        &events,
        &primary_forecasts,
        &corrected,
        ModeFilterKind::Combined.modes(),
    )?;

    let scores_by_forecaster = compute_scores_by_forecaster(
        catalog,
        &forecasts
            .iter()
            .filter(|f| event_id_filter.is_none_or(|id| f.event_id == id))
            .filter(|f| horizon_filter.is_none_or(|h| f.horizon_days == h))
            .cloned()
            .collect::<Vec<_>>(),
        &corrected,
    )?;

    let mut scores_by_type: BTreeMap<String, Vec<MultinomialObservation>> = BTreeMap::new();
    let mut scores_by_event = BTreeMap::new();
    let mut baseline_fallback_warnings = Vec::new();

    for event in &events {
        let mut event_horizons = event.horizons_days.clone();
        if let Some(h) = horizon_filter {
            event_horizons.retain(|&horizon| horizon == h);
        }
        let mut scoped_event = (*event).clone();
        scoped_event.horizons_days = event_horizons;
        if scoped_event.horizons_days.is_empty() {
            continue;
        }

        let event_scores = compute_event_scores(
            &scoped_event,
            &primary_forecasts,
            &corrected,
            &[],
            baseline_config,
            mode_filter,
            as_of_utc,
        )?;

        if event_scores.baselines.fallback {
            baseline_fallback_warnings.push(event.event_id.clone());
        }

        let type_bucket = scores_by_type.entry(event_type_tag(event.event_type).to_string()).or_default();
        for forecast in primary_forecasts.iter().filter(|f| f.event_id == event.event_id) {
            let Some(resolution) = corrected.iter().find(|r| r.forecast_id == forecast.forecast_id)
            else {
                continue;
            };
            if forecast.abstain || resolution.resolved_outcome == UNKNOWN_OUTCOME {
                continue;
            }
            type_bucket.push(MultinomialObservation {
                forecast_id: forecast.forecast_id.clone(),
                probabilities: forecast.probabilities.clone(),
                actual_outcome: resolution.resolved_outcome.clone(),
            });
        }

        scores_by_event.insert(event.event_id.clone(), event_scores);
    }

    let mut scores_by_type_metrics = BTreeMap::new();
    for (type_tag, observations) in scores_by_type {
        let brier = pooled_brier(&observations)?;
        let log_score = pooled_log_score(&observations)?;
        scores_by_type_metrics
            .insert(type_tag, AccuracyMetrics { brier, log_score, n: observations.len() as u64 });
    }

    Ok(Scorecard {
        counts,
        coverage,
        accuracy,
        penalty,
        core_scores,
        claims_inferred_scores,
        combined_scores,
        scores_by_forecaster,
        scores_by_type: scores_by_type_metrics,
        scores_by_event,
        baseline_fallback_warnings,
    })
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
    use oracle_catalog::ForecastSource;
    use oracle_catalog::ResolutionSource;

    fn forecast(event_id: &str, horizon: u32, p_yes: f64, forecaster: &str, abstain: bool) -> ForecastRecord {
        let mut probabilities = BTreeMap::new();
        probabilities.insert("YES".to_string(), p_yes);
        probabilities.insert("NO".to_string(), 1.0 - p_yes);
        ForecastRecord {
            forecast_id: format!("fcst_{event_id}_{horizon}d_{forecaster}"),
            event_id: event_id.to_string(),
            horizon_days: horizon,
            as_of_utc: "2026-04-15T00:00:00Z".to_string(),
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            run_id: "RUN_1".to_string(),
            manifest_id: "sha256:abc".to_string(),
            forecaster_id: forecaster.to_string(),
            forecaster_version: "1.0".to_string(),
            distribution_type: oracle_core::EventType::Binary,
            probabilities,
            abstain,
            abstain_reason: if abstain { Some("insufficient_data".to_string()) } else { None },
            seed: None,
            n_sims: None,
            artifact_hashes: BTreeMap::new(),
            ensemble_inputs: None,
            baseline_metadata: None,
            derivation_note: None,
        }
    }

    fn resolution(forecast_id: &str, event_id: &str, horizon: u32, outcome: &str) -> ResolutionRecord {
        ResolutionRecord {
            resolution_id: format!("res_{forecast_id}"),
            forecast_id: forecast_id.to_string(),
            event_id: event_id.to_string(),
            horizon_days: horizon,
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            resolved_outcome: outcome.to_string(),
            resolved_value: None,
            resolved_at_utc: "2026-04-22T00:00:00Z".to_string(),
            resolution_mode: oracle_core::ResolutionMode::ExternalAuto,
            reason_code: None,
            unknown_reason: None,
            run_id: Some("RUN_1".to_string()),
            resolution_manifest_id: None,
            rule_applied: None,
            evidence_refs: Vec::new(),
            evidence_hashes: Vec::new(),
            resolved_by: "oracle_resolver_v2".to_string(),
        }
    }

    fn event(event_id: &str) -> EventDef {
        EventDef {
            event_id: event_id.to_string(),
            title: "Test Event".to_string(),
            event_type: oracle_core::EventType::Binary,
            allowed_outcomes: vec!["YES".to_string(), "NO".to_string()],
            min_catalog_version: None,
            forecast_source: ForecastSource::SimulationOutput { field_path: "p".to_string() },
            resolution_source: ResolutionSource::None,
            horizons_days: vec![7],
            enabled: true,
            bin_spec: None,
            requires_manual_resolution: false,
            auto_resolve: false,
            grace_days: None,
            max_resolution_lag_days: None,
            effective_from_utc: None,
        }
    }

    #[test]
    fn coverage_invariant_holds_across_categories() {
        let forecasts = vec![
            forecast("evt_a", 7, 0.6, "oracle_v1", false),
            forecast("evt_b", 7, 0.5, "oracle_v1", true),
            forecast("evt_c", 7, 0.5, "oracle_v1", false),
        ];
        let resolutions = vec![
            resolution(&forecasts[0].forecast_id, "evt_a", 7, "YES"),
            resolution(&forecasts[2].forecast_id, "evt_c", 7, "UNKNOWN"),
        ];
        let coverage = compute_coverage_metrics(&forecasts, &resolutions);
        let total = coverage.resolved_known + coverage.resolved_unknown + coverage.abstained + coverage.unresolved;
        assert_eq!(total, forecasts.len() as u64);
        assert_eq!(coverage.resolved_known, 1);
        assert_eq!(coverage.resolved_unknown, 1);
        assert_eq!(coverage.abstained, 1);
        assert_eq!(coverage.unresolved, 0);
    }

    #[test]
    fn compute_scores_for_mode_excludes_abstain_and_unknown_from_primary_accuracy() {
        let events = vec![event("evt_a")];
        let event_refs: Vec<&EventDef> = events.iter().collect();
        let forecasts = vec![
            forecast("evt_a", 7, 0.9, "oracle_v1", false),
            forecast("evt_a", 7, 0.5, "oracle_v1", true),
        ];
        let resolutions = vec![
            resolution(&forecasts[0].forecast_id, "evt_a", 7, "YES"),
            resolution(&forecasts[1].forecast_id, "evt_a", 7, "UNKNOWN"),
        ];
        let (accuracy, penalty) = compute_scores_for_mode(
            &event_refs,
            &forecasts,
            &resolutions,
            ModeFilterKind::Core.modes(),
        )
        .unwrap();
        assert_eq!(accuracy.n, 1);
        assert!(penalty.effective_brier.is_some());
        assert!(penalty.unknown_abstain_penalty.unwrap() >= 0.0);
    }

    #[test]
    fn scores_by_forecaster_includes_baseline_ids() {
        let forecasts = vec![
            forecast("evt_a", 7, 0.8, "oracle_v1", false),
            forecast("evt_a", 7, 0.5, "oracle_baseline_climatology", false),
        ];
        let resolutions = vec![
            resolution(&forecasts[0].forecast_id, "evt_a", 7, "YES"),
            resolution(&forecasts[1].forecast_id, "evt_a", 7, "YES"),
        ];
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event("evt_a")] };
        let scores = compute_scores_by_forecaster(&catalog, &forecasts, &resolutions).unwrap();
        assert!(scores.contains_key("oracle_v1"));
        assert!(scores.contains_key("oracle_baseline_climatology"));
    }

    #[test]
    fn compute_scores_end_to_end_on_a_single_event() {
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event("evt_a")] };
        let forecasts = vec![forecast("evt_a", 7, 0.8, "oracle_v1", false)];
        let resolutions = vec![resolution(&forecasts[0].forecast_id, "evt_a", 7, "YES")];
        let baseline_config = oracle_baseline::BaselineConfig::default();
        let as_of = oracle_core::parse_utc("2026-04-23T00:00:00Z").unwrap();
        let scorecard = compute_scores(
            &catalog,
            &forecasts,
            &resolutions,
            &[],
            &baseline_config,
            ModeFilterKind::Core.modes(),
            None,
            None,
            as_of,
        )
        .unwrap();
        assert_eq!(scorecard.counts.total_forecasts, 1);
        assert_eq!(scorecard.counts.resolved, 1);
        assert!(scorecard.scores_by_event.contains_key("evt_a"));
        assert_eq!(scorecard.accuracy.n, 1);
    }
}
