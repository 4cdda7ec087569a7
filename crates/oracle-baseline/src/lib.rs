// crates/oracle-baseline/src/lib.rs
// ============================================================================
// Crate: oracle-baseline
// Description: History-index construction and naive (climatology,
//              persistence) baseline distributions.
// Purpose: Give the forecast generator and scorer one shared, no-lookahead
//          view of "what has happened before" for a given event/horizon.
// Dependencies: oracle-core, oracle-ledger, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! A [`HistoryIndex`] is built fresh for every scoring or forecasting pass:
//! it folds corrections into resolutions, excludes anything that would be a
//! lookahead violation relative to `as_of_utc`, and groups what remains by
//! `(event_id, horizon_days)`. [`compute_climatology_distribution`] and
//! [`compute_persistence_distribution`] read a single group's summary and
//! never touch the raw ledger themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use oracle_core::ResolutionMode;
use oracle_core::StalenessDecay;
use oracle_core::UNKNOWN_OUTCOME;
use oracle_ledger::CorrectionRecord;
use oracle_ledger::ResolutionRecord;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised building a history index or computing a baseline
/// distribution.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    /// A resolution's `resolved_at_utc` or `target_date_utc` could not be
    /// parsed.
    #[error("failed to parse timestamp: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
    /// The baseline config file could not be read or parsed.
    #[error("failed to load baseline config {path}: {source}")]
    Config {
        /// Path the failing load targeted.
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The baseline config file could not be read from disk.
    #[error("failed to read baseline config {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Per-event baseline computation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEventConfig {
    /// Resolved-history count below which a climatology distribution falls
    /// back to uniform.
    pub min_history_n: u64,
    /// Rolling window, in days, of resolutions to include; `None` means no
    /// window (use all history).
    #[serde(default)]
    pub window_days: Option<u32>,
    /// Dirichlet/Laplace smoothing strength applied per outcome.
    pub smoothing_alpha: f64,
    /// Whether `UNKNOWN` resolutions count toward the history distribution.
    pub include_unknown: bool,
    /// Base stickiness weight given to the last known outcome at zero
    /// staleness.
    pub persistence_stickiness: f64,
    /// Days of staleness at which persistence stickiness has fully decayed
    /// to zero.
    pub max_staleness_days: u32,
    /// Shape of the stickiness decay curve.
    pub staleness_decay: StalenessDecay,
    /// Resolution modes whose records are eligible to enter the history
    /// index.
    pub resolution_modes: Vec<ResolutionMode>,
}

impl Default for BaselineEventConfig {
    fn default() -> Self {
        Self {
            min_history_n: 20,
            window_days: Some(180),
            smoothing_alpha: 1.0,
            include_unknown: false,
            persistence_stickiness: 0.7,
            max_staleness_days: 30,
            staleness_decay: StalenessDecay::Linear,
            resolution_modes: vec![ResolutionMode::ExternalAuto, ResolutionMode::ExternalManual],
        }
    }
}

/// A sparse per-event override of [`BaselineEventConfig`]; any field left
/// `None` inherits the default/global value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialBaselineEventConfig {
    /// Override for [`BaselineEventConfig::min_history_n`].
    #[serde(default)]
    pub min_history_n: Option<u64>,
    /// Override for [`BaselineEventConfig::window_days`]. A present-but-null
    /// value is indistinguishable from "inherit" here by design; callers
    /// that need to explicitly disable a window should omit the override
    /// entirely and rely on the default being `None` already being unlikely.
    #[serde(default)]
    pub window_days: Option<Option<u32>>,
    /// Override for [`BaselineEventConfig::smoothing_alpha`].
    #[serde(default)]
    pub smoothing_alpha: Option<f64>,
    /// Override for [`BaselineEventConfig::include_unknown`].
    #[serde(default)]
    pub include_unknown: Option<bool>,
    /// Override for [`BaselineEventConfig::persistence_stickiness`].
    #[serde(default)]
    pub persistence_stickiness: Option<f64>,
    /// Override for [`BaselineEventConfig::max_staleness_days`].
    #[serde(default)]
    pub max_staleness_days: Option<u32>,
    /// Override for [`BaselineEventConfig::staleness_decay`].
    #[serde(default)]
    pub staleness_decay: Option<StalenessDecay>,
    /// Override for [`BaselineEventConfig::resolution_modes`].
    #[serde(default)]
    pub resolution_modes: Option<Vec<ResolutionMode>>,
}

/// The full baseline configuration document: global defaults plus sparse
/// per-event overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Applies to every event without an entry in `overrides`.
    pub defaults: BaselineEventConfig,
    /// Sparse per-event overrides, keyed by `event_id`.
    #[serde(default)]
    pub overrides: BTreeMap<String, PartialBaselineEventConfig>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self { defaults: BaselineEventConfig::default(), overrides: BTreeMap::new() }
    }
}

/// Merges `config`'s defaults with any override registered for `event_id`,
/// producing the effective [`BaselineEventConfig`] for that event.
#[must_use]
pub fn get_event_config(config: &BaselineConfig, event_id: &str) -> BaselineEventConfig {
    let mut effective = config.defaults.clone();
    let Some(partial) = config.overrides.get(event_id) else {
        return effective;
    };
    if let Some(v) = partial.min_history_n {
        effective.min_history_n = v;
    }
    if let Some(v) = partial.window_days {
        effective.window_days = v;
    }
    if let Some(v) = partial.smoothing_alpha {
        effective.smoothing_alpha = v;
    }
    if let Some(v) = partial.include_unknown {
        effective.include_unknown = v;
    }
    if let Some(v) = partial.persistence_stickiness {
        effective.persistence_stickiness = v;
    }
    if let Some(v) = partial.max_staleness_days {
        effective.max_staleness_days = v;
    }
    if let Some(v) = partial.staleness_decay {
        effective.staleness_decay = v;
    }
    if let Some(v) = &partial.resolution_modes {
        effective.resolution_modes.clone_from(v);
    }
    effective
}

/// Loads a [`BaselineConfig`] document from a JSON file on disk.
///
/// # Errors
///
/// Returns [`BaselineError::Io`] if the file cannot be read, or
/// [`BaselineError::Config`] if it is not valid JSON matching the expected
/// shape.
pub fn load_baseline_config(path: &std::path::Path) -> Result<BaselineConfig, BaselineError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| BaselineError::Io { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| BaselineError::Config { path: path.display().to_string(), source })
}

/// Returns the JSON Schema (Draft 2020-12) document describing
/// [`BaselineConfig`], used both as documentation and for schema-validation
/// tests.
#[must_use]
pub fn baseline_config_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "BaselineConfig",
        "type": "object",
        "required": ["defaults"],
        "properties": {
            "defaults": { "$ref": "#/$defs/event_config" },
            "overrides": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/partial_event_config" }
            }
        },
        "$defs": {
            "event_config": {
                "type": "object",
                "required": [
                    "min_history_n", "smoothing_alpha", "include_unknown",
                    "persistence_stickiness", "max_staleness_days",
                    "staleness_decay", "resolution_modes"
                ],
                "properties": {
                    "min_history_n": { "type": "integer", "minimum": 0 },
                    "window_days": { "type": ["integer", "null"], "minimum": 1 },
                    "smoothing_alpha": { "type": "number", "minimum": 0.0 },
                    "include_unknown": { "type": "boolean" },
                    "persistence_stickiness": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "max_staleness_days": { "type": "integer", "minimum": 0 },
                    "staleness_decay": { "enum": ["linear", "exponential"] },
                    "resolution_modes": {
                        "type": "array",
                        "items": { "enum": ["external_auto", "external_manual", "claims_inferred"] }
                    }
                }
            },
            "partial_event_config": {
                "type": "object",
                "properties": {
                    "min_history_n": { "type": "integer", "minimum": 0 },
                    "smoothing_alpha": { "type": "number", "minimum": 0.0 },
                    "include_unknown": { "type": "boolean" },
                    "persistence_stickiness": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "max_staleness_days": { "type": "integer", "minimum": 0 },
                    "staleness_decay": { "enum": ["linear", "exponential"] }
                }
            }
        }
    })
}

// ============================================================================
// SECTION: History Index
// ============================================================================

/// Aggregated history for one `(event_id, horizon_days)` group, computed as
/// of a specific `as_of_utc`.
#[derive(Debug, Clone, Default)]
pub struct HistoryGroup {
    /// Count of eligible resolved outcomes, keyed by outcome label.
    pub counts_by_outcome: BTreeMap<String, u64>,
    /// Total eligible resolution count (`sum(counts_by_outcome.values())`).
    pub history_n: u64,
    /// The most recently resolved outcome in `target_date_utc` order, if any.
    pub last_resolved_outcome: Option<String>,
    /// RFC 3339 timestamp of the most recently resolved record, if any.
    pub last_verified_at: Option<String>,
    /// Whole days between `last_verified_at` and `as_of_utc`; `None` if no
    /// history exists yet.
    pub staleness_days: Option<i64>,
    /// Counts of resolutions excluded from this group, keyed by exclusion
    /// reason, for observability.
    pub excluded_counts_by_reason: BTreeMap<String, u64>,
}

/// A complete history index across every `(event_id, horizon_days)` group
/// observed in the ledger, as of one `as_of_utc`.
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    /// Per-group aggregates, keyed by `(event_id, horizon_days)`.
    pub groups: BTreeMap<(String, u32), HistoryGroup>,
}

impl HistoryIndex {
    /// Looks up the group for a given event/horizon, if any resolutions
    /// (eligible or excluded) were observed for it.
    #[must_use]
    pub fn get(&self, event_id: &str, horizon_days: u32) -> Option<&HistoryGroup> {
        self.groups.get(&(event_id.to_string(), horizon_days))
    }
}

/// Builds a [`HistoryIndex`] from resolutions (with corrections applied),
/// filtered by `config` per event and by the hard no-lookahead invariant.
///
/// Resolutions are excluded (and counted under `excluded_counts_by_reason`)
/// when:
/// - `resolved_at_utc > as_of_utc` (`"future_lookahead"`, unconditional).
/// - `window_days` is set and `resolved_at_utc` falls outside it
///   (`"outside_window"`).
/// - `resolution_mode` is not in the event's configured
///   `resolution_modes` (`"mode_{mode}"`).
/// - `resolved_outcome == UNKNOWN` and `include_unknown` is `false`
///   (`"unknown_outcome"`).
/// - `resolved_at_utc` is missing or fails to parse
///   (`"missing_resolved_at"` / `"invalid_resolved_at"`).
///
/// # Errors
///
/// Returns [`BaselineError::Timestamp`] only for `as_of_utc` itself; malformed
/// per-record timestamps are tallied as exclusions rather than aborting the
/// whole build.
pub fn build_history_index(
    resolutions: &[ResolutionRecord],
    corrections: &[CorrectionRecord],
    config: &BaselineConfig,
    as_of_utc: time::OffsetDateTime,
) -> Result<HistoryIndex, BaselineError> {
    let corrected = oracle_ledger::apply_corrections(resolutions.to_vec(), corrections);

    let mut by_group: BTreeMap<(String, u32), Vec<&ResolutionRecord>> = BTreeMap::new();
    for record in &corrected {
        by_group.entry((record.event_id.clone(), record.horizon_days)).or_default().push(record);
    }

    let mut index = HistoryIndex::default();
    for ((event_id, horizon_days), mut records) in by_group {
        records.sort_by(|a, b| a.target_date_utc.cmp(&b.target_date_utc));
        let event_config = get_event_config(config, &event_id);
        let mut group = HistoryGroup::default();

        for record in records {
            let Ok(resolved_at) = oracle_core::parse_utc(&record.resolved_at_utc) else {
                *group.excluded_counts_by_reason.entry("invalid_resolved_at".to_string()).or_insert(0) += 1;
                continue;
            };

            if resolved_at > as_of_utc {
                *group.excluded_counts_by_reason.entry("future_lookahead".to_string()).or_insert(0) += 1;
                continue;
            }

            if let Some(window_days) = event_config.window_days {
                let earliest = as_of_utc - time::Duration::days(i64::from(window_days));
                if resolved_at < earliest {
                    *group.excluded_counts_by_reason.entry("outside_window".to_string()).or_insert(0) += 1;
                    continue;
                }
            }

            if !event_config.resolution_modes.contains(&record.resolution_mode) {
                let mode_tag = mode_tag(record.resolution_mode);
                *group
                    .excluded_counts_by_reason
                    .entry(format!("mode_{mode_tag}"))
                    .or_insert(0) += 1;
                continue;
            }

            if record.resolved_outcome == UNKNOWN_OUTCOME && !event_config.include_unknown {
                *group.excluded_counts_by_reason.entry("unknown_outcome".to_string()).or_insert(0) += 1;
                continue;
            }

            *group.counts_by_outcome.entry(record.resolved_outcome.clone()).or_insert(0) += 1;
            group.history_n += 1;
            group.last_resolved_outcome = Some(record.resolved_outcome.clone());
            group.last_verified_at = Some(record.resolved_at_utc.clone());
        }

        if let Some(last_verified_at) = &group.last_verified_at {
            let last = oracle_core::parse_utc(last_verified_at)?;
            group.staleness_days = Some((as_of_utc - last).whole_days());
        }

        index.groups.insert((event_id, horizon_days), group);
    }

    Ok(index)
}

/// The exclusion-reason tag suffix for a given resolution mode.
const fn mode_tag(mode: ResolutionMode) -> &'static str {
    match mode {
        ResolutionMode::ExternalAuto => "external_auto",
        ResolutionMode::ExternalManual => "external_manual",
        ResolutionMode::ClaimsInferred => "claims_inferred",
    }
}

// ============================================================================
// SECTION: Climatology
// ============================================================================

/// Computes a Dirichlet/Laplace-smoothed climatology distribution over
/// `outcomes` from a single history group, falling back to uniform when
/// `group.history_n < min_history_n`.
///
/// `p_k = (count_k + alpha) / (N + K * alpha)`, rounded to 6 decimals with a
/// residual correction applied to the first outcome so the distribution
/// sums to exactly `1.0`.
#[must_use]
pub fn compute_climatology_distribution(
    group: Option<&HistoryGroup>,
    outcomes: &[String],
    config: &BaselineEventConfig,
) -> BTreeMap<String, f64> {
    let history_n = group.map_or(0, |g| g.history_n);
    if history_n < config.min_history_n || outcomes.is_empty() {
        return uniform_distribution(outcomes);
    }

    let k = outcomes.len() as f64;
    let alpha = config.smoothing_alpha;
    let total = history_n as f64 + k * alpha;

    let mut raw: Vec<f64> = outcomes
        .iter()
        .map(|outcome| {
            let count = group
                .and_then(|g| g.counts_by_outcome.get(outcome))
                .copied()
                .unwrap_or(0) as f64;
            (count + alpha) / total
        })
        .collect();

    round_and_repair(&mut raw);
    outcomes.iter().cloned().zip(raw).collect()
}

/// Computes the persistence-decayed distribution: a blend of the last known
/// outcome (weighted by decayed stickiness) and the climatology
/// distribution (the remainder), from a single history group.
#[must_use]
pub fn compute_persistence_distribution(
    group: Option<&HistoryGroup>,
    outcomes: &[String],
    config: &BaselineEventConfig,
) -> BTreeMap<String, f64> {
    let climatology = compute_climatology_distribution(group, outcomes, config);

    let Some(last_outcome) = group.and_then(|g| g.last_resolved_outcome.as_deref()) else {
        return climatology;
    };
    if !outcomes.iter().any(|o| o == last_outcome) {
        return climatology;
    }

    let staleness_days = group.and_then(|g| g.staleness_days).unwrap_or(0);
    let stickiness = decay_stickiness(
        config.persistence_stickiness,
        staleness_days,
        config.max_staleness_days,
        config.staleness_decay,
    );

    let mut raw: Vec<f64> = outcomes
        .iter()
        .map(|outcome| {
            let one_hot = if outcome == last_outcome { 1.0 } else { 0.0 };
            let climatology_p = climatology.get(outcome).copied().unwrap_or(0.0);
            stickiness.mul_add(one_hot, (1.0 - stickiness) * climatology_p)
        })
        .collect();

    round_and_repair(&mut raw);
    outcomes.iter().cloned().zip(raw).collect()
}

/// Decays `base_stickiness` toward zero as `staleness_days` grows toward
/// `max_staleness_days`. Linear decay reaches exactly `0.0` at or past
/// `max_staleness_days`; exponential decay uses a half-life of
/// `max_staleness_days / 2`. Negative or zero staleness returns
/// `base_stickiness` unchanged (full strength).
#[must_use]
pub fn decay_stickiness(
    base_stickiness: f64,
    staleness_days: i64,
    max_staleness_days: u32,
    decay: StalenessDecay,
) -> f64 {
    if staleness_days <= 0 {
        return base_stickiness;
    }
    if max_staleness_days == 0 || staleness_days as u64 >= u64::from(max_staleness_days) {
        return 0.0;
    }

    let staleness = staleness_days as f64;
    let max_staleness = f64::from(max_staleness_days);

    match decay {
        StalenessDecay::Linear => base_stickiness * (1.0 - staleness / max_staleness).max(0.0),
        StalenessDecay::Exponential => {
            let half_life = max_staleness / 2.0;
            base_stickiness * 0.5_f64.powf(staleness / half_life)
        }
    }
}

/// An equal-weight distribution over `outcomes`, rounded and repaired to
/// sum to exactly `1.0`.
fn uniform_distribution(outcomes: &[String]) -> BTreeMap<String, f64> {
    if outcomes.is_empty() {
        return BTreeMap::new();
    }
    let mut raw = vec![1.0 / outcomes.len() as f64; outcomes.len()];
    round_and_repair(&mut raw);
    outcomes.iter().cloned().zip(raw).collect()
}

/// Rounds every entry to 6 decimals, then corrects the first entry by the
/// residual so the vector sums to exactly `1.0`.
fn round_and_repair(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = (*v * 1e6).round() / 1e6;
    }
    let sum: f64 = values.iter().sum();
    let residual = 1.0 - sum;
    if let Some(first) = values.first_mut() {
        *first = ((*first + residual) * 1e6).round() / 1e6;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    fn resolution(event_id: &str, target_date: &str, resolved_at: &str, outcome: &str) -> ResolutionRecord {
        ResolutionRecord {
            resolution_id: format!("res_{target_date}_{event_id}"),
            forecast_id: format!("fcst_{target_date}_{event_id}"),
            event_id: event_id.to_string(),
            horizon_days: 7,
            target_date_utc: target_date.to_string(),
            resolved_outcome: outcome.to_string(),
            resolved_value: None,
            resolved_at_utc: resolved_at.to_string(),
            resolution_mode: ResolutionMode::ExternalAuto,
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
    fn lookahead_resolutions_are_excluded() {
        let resolutions = vec![resolution("evt_a", "2026-05-01", "2026-05-01T00:00:00Z", "YES")];
        let as_of = oracle_core::parse_utc("2026-04-01T00:00:00Z").unwrap();
        let index =
            build_history_index(&resolutions, &[], &BaselineConfig::default(), as_of).unwrap();
        let group = index.get("evt_a", 7).unwrap();
        assert_eq!(group.history_n, 0);
        assert_eq!(group.excluded_counts_by_reason.get("future_lookahead"), Some(&1));
    }

    #[test]
    fn climatology_falls_back_to_uniform_below_min_history() {
        let resolutions = vec![resolution("evt_a", "2026-01-01", "2026-01-01T00:00:00Z", "YES")];
        let as_of = oracle_core::parse_utc("2026-02-01T00:00:00Z").unwrap();
        let index =
            build_history_index(&resolutions, &[], &BaselineConfig::default(), as_of).unwrap();
        let group = index.get("evt_a", 7);
        let outcomes = vec!["YES".to_string(), "NO".to_string()];
        let dist = compute_climatology_distribution(
            group,
            &outcomes,
            &get_event_config(&BaselineConfig::default(), "evt_a"),
        );
        assert!((dist["YES"] - 0.5).abs() < 1e-9);
        assert!((dist["NO"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn climatology_sums_to_exactly_one() {
        let mut resolutions = Vec::new();
        for day in 1 ..= 25 {
            let outcome = if day % 3 == 0 { "NO" } else { "YES" };
            resolutions.push(resolution(
                "evt_a",
                &format!("2026-01-{day:02}"),
                &format!("2026-01-{day:02}T00:00:00Z"),
                outcome,
            ));
        }
        let as_of = oracle_core::parse_utc("2026-02-01T00:00:00Z").unwrap();
        let index =
            build_history_index(&resolutions, &[], &BaselineConfig::default(), as_of).unwrap();
        let group = index.get("evt_a", 7);
        let outcomes = vec!["YES".to_string(), "NO".to_string()];
        let dist = compute_climatology_distribution(
            group,
            &outcomes,
            &get_event_config(&BaselineConfig::default(), "evt_a"),
        );
        let sum: f64 = dist.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stickiness_decays_to_zero_at_max_staleness() {
        let decayed = decay_stickiness(0.7, 30, 30, StalenessDecay::Linear);
        assert_eq!(decayed, 0.0);
        let full = decay_stickiness(0.7, 0, 30, StalenessDecay::Linear);
        assert_eq!(full, 0.7);
        let half = decay_stickiness(0.7, 15, 30, StalenessDecay::Linear);
        assert!((half - 0.35).abs() < 1e-9);
    }

    #[test]
    fn exponential_decay_halves_at_half_life() {
        let decayed = decay_stickiness(0.8, 15, 30, StalenessDecay::Exponential);
        assert!((decayed - 0.4).abs() < 1e-9);
    }

    #[test]
    fn persistence_blends_last_outcome_with_climatology() {
        let mut resolutions = Vec::new();
        for day in 1 ..= 25 {
            resolutions.push(resolution(
                "evt_a",
                &format!("2026-01-{day:02}"),
                &format!("2026-01-{day:02}T00:00:00Z"),
                "YES",
            ));
        }
        let as_of = oracle_core::parse_utc("2026-01-26T00:00:00Z").unwrap();
        let index =
            build_history_index(&resolutions, &[], &BaselineConfig::default(), as_of).unwrap();
        let group = index.get("evt_a", 7);
        let outcomes = vec!["YES".to_string(), "NO".to_string()];
        let dist = compute_persistence_distribution(
            group,
            &outcomes,
            &get_event_config(&BaselineConfig::default(), "evt_a"),
        );
        assert!(dist["YES"] > 0.9);
    }

    #[test]
    fn event_override_replaces_min_history_n() {
        let mut config = BaselineConfig::default();
        config.overrides.insert(
            "evt_a".to_string(),
            PartialBaselineEventConfig { min_history_n: Some(2), ..Default::default() },
        );
        let effective = get_event_config(&config, "evt_a");
        assert_eq!(effective.min_history_n, 2);
        assert_eq!(effective.smoothing_alpha, config.defaults.smoothing_alpha);
    }

    #[test]
    fn schema_is_valid_json_schema() {
        let schema = baseline_config_schema();
        let validator = jsonschema::validator_for(&schema).unwrap();
        let instance = serde_json::to_value(BaselineConfig::default()).unwrap();
        assert!(validator.is_valid(&instance));
    }
}
