// crates/oracle-ledger/src/records.rs
// ============================================================================
// Module: Ledger Record Types
// Description: The three record shapes appended to the forecast ledger.
// Purpose: Give the ledger, baseline, forecast, ensemble, resolver, and
//          scorer crates one definition of a forecast, resolution, and
//          correction record.
// Dependencies: oracle-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every record in the ledger is one JSON object per line (JSONL). Records
//! are never mutated or deleted in place; a correction is itself a new
//! append, linked back to the resolution it supersedes by id. Each record
//! shape is a closed set of fields, not a free-form map, so every crate in
//! the workspace agrees on exactly what a forecast or resolution carries.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Provenance for an ensemble-combined forecast: which members contributed,
/// what weight each was actually given, and which configured members were
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleInputs {
    /// The ensemble definition this forecast was produced by.
    pub ensemble_id: String,
    /// Member `forecaster_id`s whose distributions were actually combined.
    pub members_used: Vec<String>,
    /// The weight actually applied to each entry in `members_used`, in the
    /// same order.
    pub weights_used: Vec<f64>,
    /// Configured member `forecaster_id`s that were absent, abstained, or
    /// degenerate (all mass on `UNKNOWN`) for this group.
    pub members_missing: Vec<String>,
    /// Which missing-member policy fired (`"renormalize"` or `"skip"`).
    pub policy_applied: String,
}

/// Metadata describing how a baseline (climatology or persistence)
/// distribution was produced, carried on every baseline-sourced forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetadata {
    /// Count of resolutions that fed the history index at generation time.
    pub baseline_history_n: u64,
    /// `"uniform"` when the bootstrap gate triggered a fallback, `"none"`
    /// otherwise.
    pub baseline_fallback: String,
    /// RFC 3339 timestamp of the most recent resolution folded into the
    /// history, if any.
    #[serde(default)]
    pub baseline_last_verified_at: Option<String>,
    /// Whole days between `baseline_last_verified_at` and the forecast's
    /// `as_of_utc`.
    #[serde(default)]
    pub baseline_staleness_days: Option<i64>,
    /// The baseline config version this distribution was computed under.
    pub baseline_config_version: String,
    /// Counts of resolutions excluded from the history index, keyed by
    /// exclusion reason, for observability.
    pub baseline_excluded_counts_by_reason: BTreeMap<String, u64>,
    /// The resolution modes accepted into the history index.
    pub baseline_resolution_modes: Vec<oracle_core::ResolutionMode>,
}

/// A single logged forecast: a probability distribution over an event's
/// `allowed_outcomes`, as of a specific run and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Content-addressed identifier, `fcst_<date>_<run_id>_[<forecaster_id>_]<event_id>_<horizon>d`.
    pub forecast_id: String,
    /// The event this forecast concerns.
    pub event_id: String,
    /// Forecast horizon in days (one of `1`, `7`, `15`, `30`).
    pub horizon_days: u32,
    /// RFC 3339 timestamp this forecast was logged at.
    pub as_of_utc: String,
    /// RFC 3339 timestamp the forecast targets (`as_of_utc + horizon_days`).
    pub target_date_utc: String,
    /// The upstream simulation run this forecast was generated from.
    pub run_id: String,
    /// `sha256:<hex>` content hash of the source run's manifest file.
    pub manifest_id: String,
    /// The forecaster that produced this distribution (`oracle_v1`,
    /// `oracle_baseline_climatology`, an ensemble id, etc.).
    pub forecaster_id: String,
    /// The forecaster's version tag.
    pub forecaster_version: String,
    /// Event type this distribution is shaped for.
    pub distribution_type: oracle_core::EventType,
    /// Probability distribution over outcome labels, summing to 1.0 within
    /// tolerance.
    pub probabilities: BTreeMap<String, f64>,
    /// `true` when the forecaster declined to produce a live distribution
    /// (the emitted `probabilities` is a type-compatible placeholder).
    #[serde(default)]
    pub abstain: bool,
    /// Why the forecaster abstained, if `abstain` is `true`.
    #[serde(default)]
    pub abstain_reason: Option<String>,
    /// Random seed of the source simulation run, if applicable.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of Monte Carlo trials backing the source run, if applicable.
    #[serde(default)]
    pub n_sims: Option<u64>,
    /// Content hashes of artifacts consulted to produce this forecast,
    /// keyed by artifact filename.
    #[serde(default)]
    pub artifact_hashes: BTreeMap<String, String>,
    /// Ensemble provenance, present only on ensemble-combined forecasts.
    #[serde(default)]
    pub ensemble_inputs: Option<EnsembleInputs>,
    /// Baseline provenance, present only on baseline-sourced forecasts.
    #[serde(default)]
    pub baseline_metadata: Option<BaselineMetadata>,
    /// Free-text note on how a `simulation_derived` probability was
    /// produced, present only for that source type.
    #[serde(default)]
    pub derivation_note: Option<String>,
}

/// A single logged resolution: the ground-truth outcome of an event, as
/// determined at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    /// Content-addressed identifier, `res_<target_date>_<event_id>_<horizon>d`.
    pub resolution_id: String,
    /// The forecast this resolution closes out.
    pub forecast_id: String,
    /// The event this resolution concerns.
    pub event_id: String,
    /// Forecast horizon in days, carried over from the forecast for
    /// grouping convenience.
    pub horizon_days: u32,
    /// RFC 3339 timestamp the forecast targeted.
    pub target_date_utc: String,
    /// The determined outcome label, a member of the event's
    /// `allowed_outcomes`, or `UNKNOWN` if indeterminate.
    pub resolved_outcome: String,
    /// The raw extracted value (numeric or enum) the outcome was derived
    /// from, if any.
    #[serde(default)]
    pub resolved_value: Option<serde_json::Value>,
    /// RFC 3339 timestamp the outcome was determined at.
    pub resolved_at_utc: String,
    /// How the outcome was determined. Absent on legacy pre-tagging
    /// records, which are treated as [`oracle_core::ResolutionMode::ExternalAuto`].
    #[serde(default = "oracle_core::ResolutionMode::default_for_untagged_record")]
    pub resolution_mode: oracle_core::ResolutionMode,
    /// Machine-readable reason code (e.g. `"missing_value"`,
    /// `"rule_error:..."`), present when `resolved_outcome` is `UNKNOWN`.
    #[serde(default)]
    pub reason_code: Option<String>,
    /// Free-text note, set when `resolved_outcome` is `UNKNOWN` or the mode
    /// is `external_manual`.
    #[serde(default)]
    pub unknown_reason: Option<String>,
    /// The upstream simulation run the resolving evidence was read from,
    /// if any (manual/claims-inferred resolutions may have none).
    #[serde(default)]
    pub run_id: Option<String>,
    /// `sha256:<hex>` content hash of the resolution run's manifest file.
    #[serde(default)]
    pub resolution_manifest_id: Option<String>,
    /// Human-readable description of the rule applied, e.g.
    /// `"threshold_gte:1200000"`.
    #[serde(default)]
    pub rule_applied: Option<String>,
    /// Path(s) to the written evidence snapshot(s), present only for
    /// `external_auto` resolutions with a known outcome.
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    /// `sha256:<hex>` content hash(es) of the evidence snapshot(s), aligned
    /// positionally with `evidence_refs`.
    #[serde(default)]
    pub evidence_hashes: Vec<String>,
    /// Identifier of the process or operator that produced this
    /// resolution.
    pub resolved_by: String,
}

/// A retroactive amendment to a previously logged resolution's outcome,
/// appended as a new record rather than mutating the original in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Correction identifier.
    pub correction_id: String,
    /// The id of the resolution record being corrected.
    pub resolution_id: String,
    /// The replacement outcome label.
    pub corrected_outcome: String,
    /// RFC 3339 timestamp the correction was logged at.
    pub corrected_at_utc: String,
    /// Human-readable reason for the correction.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The three record shapes that can appear on one JSONL line in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum LedgerRecord {
    /// A [`ForecastRecord`].
    Forecast(ForecastRecord),
    /// A [`ResolutionRecord`].
    Resolution(ResolutionRecord),
    /// A [`CorrectionRecord`].
    Correction(CorrectionRecord),
}
