// crates/oracle-ensemble/src/lib.rs
// ============================================================================
// Crate: oracle-ensemble
// Description: Combines multiple forecasters' base forecasts into a single
//              weighted-average ensemble forecast per event/horizon/run.
// Purpose: Let the ledger carry a forecaster whose distribution is itself a
//          function of other forecasters' distributions, without special
//          casing it anywhere outside this crate.
// Dependencies: oracle-catalog, oracle-core, oracle-ledger, serde_json,
//               thiserror, time
// ============================================================================

//! ## Overview
//! An ensemble definition names a fixed set of member forecasters and their
//! weights. [`generate_ensemble_forecasts`] groups one run's base forecasts
//! by `(event_id, horizon_days, target_date_utc)`, matches members within a
//! short `as_of_utc` tolerance window, drops `UNKNOWN` mass before combining,
//! and appends one ensemble [`oracle_ledger::ForecastRecord`] per group.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use oracle_catalog::EventCatalog;
use oracle_catalog::EventDef;
use oracle_ledger::EnsembleInputs;
use oracle_ledger::ForecastRecord;
use oracle_ledger::Ledger;
use serde::Deserialize;
use serde::Serialize;

/// Tolerance an ensemble's combined weights must fall within of `1.0`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Window, in seconds, within which member forecasts' `as_of_utc` are
/// considered the same forecasting pass.
pub const AS_OF_UTC_TOLERANCE_SECONDS: i64 = 60;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised loading an ensemble config or generating ensemble
/// forecasts.
#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    /// The config file could not be read.
    #[error("failed to read ensemble config {path}: {source}")]
    Io {
        /// Path the failing read targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The config file was not valid JSON.
    #[error("failed to parse ensemble config {path}: {source}")]
    Parse {
        /// Path the failing parse targeted.
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The config parsed but failed semantic validation.
    #[error("ensemble config failed validation:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
    /// A ledger read or append failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
    /// A timestamp failed to parse or format.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// How a missing ensemble member is handled when combining a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMemberPolicy {
    /// Re-weight the available members so their weights sum to `1.0` and
    /// proceed if at least `min_members_required` are present.
    Renormalize,
    /// Abstain (emit no forecast) if any configured member is missing.
    Skip,
}

/// One named forecaster's fixed weight within an ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleMember {
    /// The member's `forecaster_id`, as it appears on a base
    /// [`ForecastRecord`].
    pub forecaster_id: String,
    /// This member's weight in the linear combination.
    pub weight: f64,
}

/// A single named ensemble definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleDef {
    /// Stable identifier, e.g. `"oracle_ensemble_core"`.
    pub ensemble_id: String,
    /// Member forecasters and their weights.
    pub members: Vec<EnsembleMember>,
    /// Policy applied when a configured member's forecast is absent for a
    /// group.
    pub missing_member_policy: MissingMemberPolicy,
    /// Minimum number of members that must be present for `renormalize` to
    /// proceed.
    pub min_members_required: usize,
    /// RFC 3339 timestamp from which this definition applies.
    pub effective_from_utc: String,
    /// Restricts this definition to events of these types, if present.
    #[serde(default)]
    pub apply_to_event_types: Option<Vec<oracle_core::EventType>>,
    /// Restricts this definition to these specific event ids, if present.
    #[serde(default)]
    pub apply_to_event_ids: Option<Vec<String>>,
}

/// The full ensemble configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Config schema version, e.g. `"1.0.0"`.
    pub config_version: String,
    /// All named ensemble definitions.
    pub ensembles: Vec<EnsembleDef>,
}

/// Loads an ensemble configuration document from disk.
///
/// # Errors
///
/// Returns [`EnsembleError::Io`]/[`EnsembleError::Parse`] on read or parse
/// failure.
pub fn load_ensemble_config(path: &Path) -> Result<EnsembleConfig, EnsembleError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| EnsembleError::Io { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| EnsembleError::Parse { path: path.display().to_string(), source })
}

// ============================================================================
// SECTION: Config Validation
// ============================================================================

/// Validates an ensemble configuration document, returning every error
/// found.
///
/// Checks, per definition: `config_version` is valid semver;
/// member weights sum to `1.0` within [`WEIGHT_SUM_TOLERANCE`];
/// `forecaster_id`s are unique within the definition; `min_members_required`
/// does not exceed the member count; `effective_from_utc` parses as RFC
/// 3339; `ensemble_id` matches `^oracle_ensemble_[a-z0-9_]+$` and is never
/// `"oracle_v1"` or prefixed `"oracle_baseline_"`; `apply_to_event_ids`, if
/// present, is non-empty.
#[must_use]
pub fn validate_ensemble_config(config: &EnsembleConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if parse_semver(&config.config_version).is_none() {
        errors.push(format!(
            "config_version is not a valid semver string: {}",
            config.config_version
        ));
    }

    for def in &config.ensembles {
        if !is_valid_ensemble_id(&def.ensemble_id) {
            errors.push(format!(
                "ensemble_id {} must match ^oracle_ensemble_[a-z0-9_]+$ and not collide with a base forecaster id",
                def.ensemble_id
            ));
        }

        let weight_sum: f64 = def.members.iter().map(|m| m.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!(
                "ensemble {}: member weights sum to {weight_sum}, not 1.0",
                def.ensemble_id
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for member in &def.members {
            if !seen.insert(member.forecaster_id.as_str()) {
                errors.push(format!(
                    "ensemble {}: duplicate member forecaster_id {}",
                    def.ensemble_id, member.forecaster_id
                ));
            }
        }

        if def.min_members_required > def.members.len() {
            errors.push(format!(
                "ensemble {}: min_members_required ({}) exceeds member count ({})",
                def.ensemble_id,
                def.min_members_required,
                def.members.len()
            ));
        }

        if oracle_core::parse_utc(&def.effective_from_utc).is_err() {
            errors.push(format!(
                "ensemble {}: effective_from_utc is not valid RFC 3339: {}",
                def.ensemble_id, def.effective_from_utc
            ));
        }

        if let Some(ids) = &def.apply_to_event_ids {
            if ids.is_empty() {
                errors.push(format!(
                    "ensemble {}: apply_to_event_ids, if present, must be non-empty",
                    def.ensemble_id
                ));
            }
        }
    }

    errors
}

/// Checks the `ensemble_id` shape rule: lowercase alphanumerics and
/// underscores after the `oracle_ensemble_` prefix, and never a reserved
/// base-forecaster id.
fn is_valid_ensemble_id(id: &str) -> bool {
    if id == "oracle_v1" || id.starts_with("oracle_baseline_") {
        return false;
    }
    let Some(suffix) = id.strip_prefix("oracle_ensemble_") else {
        return false;
    };
    !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Parses a `major.minor.patch` semver string.
fn parse_semver(raw: &str) -> Option<(u64, u64, u64)> {
    let mut parts = raw.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

// ============================================================================
// SECTION: Distribution Combination
// ============================================================================

/// Drops the `UNKNOWN` key from `distribution` and renormalizes the
/// remainder to sum to `1.0`. Returns an empty map if the result would be
/// degenerate (all weight was on `UNKNOWN`), signaling "member effectively
/// missing" to the caller.
#[must_use]
pub fn drop_unknown_and_renormalize(distribution: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let without_unknown: BTreeMap<String, f64> = distribution
        .iter()
        .filter(|(k, _)| k.as_str() != oracle_core::UNKNOWN_OUTCOME)
        .map(|(k, v)| (k.clone(), *v))
        .collect();

    let remaining: f64 = without_unknown.values().sum();
    if remaining <= 0.0 {
        return BTreeMap::new();
    }

    without_unknown.into_iter().map(|(k, v)| (k, v / remaining)).collect()
}

/// Combines one or more `(weight, distribution)` pairs via a weighted
/// linear sum per outcome, rounding and repairing the result to sum to
/// exactly `1.0` at 6 decimal places. Returns an empty map if `members` is
/// empty.
#[must_use]
pub fn combine_distributions(members: &[(f64, BTreeMap<String, f64>)]) -> BTreeMap<String, f64> {
    if members.is_empty() {
        return BTreeMap::new();
    }

    let mut combined: BTreeMap<String, f64> = BTreeMap::new();
    for (weight, distribution) in members {
        for (outcome, p) in distribution {
            *combined.entry(outcome.clone()).or_insert(0.0) += weight * p;
        }
    }

    let mut outcomes: Vec<String> = combined.keys().cloned().collect();
    outcomes.sort();
    let mut values: Vec<f64> = outcomes.iter().map(|o| combined[o]).collect();
    round_and_repair(&mut values);

    outcomes.into_iter().zip(values).collect()
}

/// Rounds each value to 6 decimal places, then corrects the first entry by
/// the residual so the set sums to exactly `1.0`.
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
// SECTION: Forecast ID
// ============================================================================

/// Builds an ensemble forecast's deterministic identifier:
/// `fcst_{as_of_date}_{run_id}_{ensemble_id}_{event_id}_{horizon_days}d`.
/// Including `run_id` prevents cross-run collisions. `as_of_date` must
/// already be the compact `YYYYMMDD` form (see
/// [`oracle_core::format_compact_date`]).
#[must_use]
pub fn generate_forecast_id(
    as_of_date: &str,
    run_id: &str,
    ensemble_id: &str,
    event_id: &str,
    horizon_days: u32,
) -> String {
    format!("fcst_{as_of_date}_{run_id}_{ensemble_id}_{event_id}_{horizon_days}d")
}

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Resolves which ensemble definition, if any, applies to `event`: the
/// first definition (in config order) whose `apply_to_event_ids` names the
/// event, or, failing that, whose `apply_to_event_types` includes the
/// event's type.
fn resolve_ensemble_def<'a>(config: &'a EnsembleConfig, event: &EventDef) -> Option<&'a EnsembleDef> {
    config.ensembles.iter().find(|def| {
        def.apply_to_event_ids.as_ref().is_some_and(|ids| ids.iter().any(|id| id == &event.event_id))
    }).or_else(|| {
        config.ensembles.iter().find(|def| {
            def.apply_to_event_types
                .as_ref()
                .is_some_and(|types| types.contains(&event.event_type))
        })
    })
}

/// Returns `true` if `def` is active as of `as_of_utc`.
fn is_effective(def: &EnsembleDef, as_of_utc: time::OffsetDateTime) -> bool {
    oracle_core::parse_utc(&def.effective_from_utc).is_ok_and(|from| from <= as_of_utc)
}

/// Finds a member forecast matching `forecaster_id` within
/// [`AS_OF_UTC_TOLERANCE_SECONDS`] of `as_of_utc`, among `candidates`
/// (already filtered to one `event_id`/`horizon_days`/`target_date_utc`/
/// `run_id` group).
fn find_member_forecast<'a>(
    candidates: &'a [ForecastRecord],
    forecaster_id: &str,
    as_of_utc: time::OffsetDateTime,
) -> Option<&'a ForecastRecord> {
    candidates.iter().find(|f| {
        if f.forecaster_id != forecaster_id {
            return false;
        }
        let Ok(f_as_of) = oracle_core::parse_utc(&f.as_of_utc) else {
            return false;
        };
        (f_as_of - as_of_utc).whole_seconds().abs() <= AS_OF_UTC_TOLERANCE_SECONDS
    })
}

/// Generates and (unless `dry_run`) appends one ensemble [`ForecastRecord`]
/// per `(event_id, horizon_days, target_date_utc)` group within `run_id`
/// that has an applicable, effective ensemble definition. A call that would
/// produce a `forecast_id` already present in the ledger is a no-op for
/// that id.
///
/// # Errors
///
/// Returns [`EnsembleError`] if the ledger cannot be read or appended to,
/// or a timestamp fails to parse.
pub fn generate_ensemble_forecasts(
    catalog: &EventCatalog,
    config: &EnsembleConfig,
    ledger: &Ledger,
    run_id: &str,
    as_of_utc: time::OffsetDateTime,
    dry_run: bool,
) -> Result<Vec<ForecastRecord>, EnsembleError> {
    let existing_ids: std::collections::BTreeSet<String> =
        ledger.get_forecasts()?.into_iter().map(|f| f.forecast_id).collect();
    let run_forecasts = ledger.get_forecasts_filtered(None, Some(run_id))?;

    let as_of_str = oracle_core::format_utc(as_of_utc)?;
    let as_of_date = oracle_core::format_compact_date(as_of_utc);

    let mut generated = Vec::new();

    for event in oracle_catalog::get_forecastable_events(catalog) {
        let Some(def) = resolve_ensemble_def(config, event) else {
            continue;
        };
        if !is_effective(def, as_of_utc) {
            continue;
        }

        let candidates: Vec<ForecastRecord> =
            run_forecasts.iter().filter(|f| f.event_id == event.event_id).cloned().collect();

        let mut groups: BTreeMap<(u32, String), Vec<ForecastRecord>> = BTreeMap::new();
        for f in candidates {
            groups.entry((f.horizon_days, f.target_date_utc.clone())).or_default().push(f);
        }

        for ((horizon_days, target_date_utc), group) in groups {
            let forecast_id =
                generate_forecast_id(&as_of_date, run_id, &def.ensemble_id, &event.event_id, horizon_days);
            if existing_ids.contains(&forecast_id) {
                continue;
            }

            let mut present = Vec::new();
            let mut missing = Vec::new();
            for member in &def.members {
                match find_member_forecast(&group, &member.forecaster_id, as_of_utc) {
                    Some(f) => present.push((member, f)),
                    None => missing.push(member.forecaster_id.clone()),
                }
            }

            if !missing.is_empty() && matches!(def.missing_member_policy, MissingMemberPolicy::Skip) {
                continue;
            }
            if present.len() < def.min_members_required {
                continue;
            }
            if present.is_empty() {
                continue;
            }

            let mut degenerate = false;
            let mut usable: Vec<(&EnsembleMember, BTreeMap<String, f64>)> = Vec::new();
            for (member, forecast) in &present {
                let cleaned = drop_unknown_and_renormalize(&forecast.probabilities);
                if cleaned.is_empty() {
                    missing.push(member.forecaster_id.clone());
                    degenerate = true;
                    continue;
                }
                usable.push((*member, cleaned));
            }

            if usable.is_empty() {
                continue;
            }
            if degenerate && matches!(def.missing_member_policy, MissingMemberPolicy::Skip) {
                continue;
            }
            if usable.len() < def.min_members_required {
                continue;
            }

            let weight_sum: f64 = usable.iter().map(|(m, _)| m.weight).sum();
            if weight_sum <= 0.0 {
                continue;
            }

            let mut weighted: Vec<(f64, BTreeMap<String, f64>)> = Vec::new();
            let mut members_used = Vec::new();
            let mut weights_used = Vec::new();
            for (member, cleaned) in usable {
                let normalized_weight = member.weight / weight_sum;
                weighted.push((normalized_weight, cleaned));
                members_used.push(member.forecaster_id.clone());
                weights_used.push(normalized_weight);
            }

            let combined = combine_distributions(&weighted);

            let record = ForecastRecord {
                forecast_id,
                event_id: event.event_id.clone(),
                horizon_days,
                as_of_utc: as_of_str.clone(),
                target_date_utc,
                run_id: run_id.to_string(),
                manifest_id: present
                    .first()
                    .map(|(_, f)| f.manifest_id.clone())
                    .unwrap_or_default(),
                forecaster_id: def.ensemble_id.clone(),
                forecaster_version: "1.0".to_string(),
                distribution_type: event.event_type,
                probabilities: combined,
                abstain: false,
                abstain_reason: None,
                seed: None,
                n_sims: None,
                artifact_hashes: BTreeMap::new(),
                ensemble_inputs: Some(EnsembleInputs {
                    ensemble_id: def.ensemble_id.clone(),
                    members_used,
                    weights_used,
                    members_missing: missing,
                    policy_applied: match def.missing_member_policy {
                        MissingMemberPolicy::Renormalize => "renormalize".to_string(),
                        MissingMemberPolicy::Skip => "skip".to_string(),
                    },
                }),
                baseline_metadata: None,
                derivation_note: None,
            };

            if !dry_run {
                ledger.append_forecast(&record)?;
            }
            generated.push(record);
        }
    }

    Ok(generated)
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

    fn sample_def() -> EnsembleDef {
        EnsembleDef {
            ensemble_id: "oracle_ensemble_core".to_string(),
            members: vec![
                EnsembleMember { forecaster_id: "oracle_v1".to_string(), weight: 0.6 },
                EnsembleMember { forecaster_id: "oracle_baseline_climatology".to_string(), weight: 0.4 },
            ],
            missing_member_policy: MissingMemberPolicy::Renormalize,
            min_members_required: 1,
            effective_from_utc: "2026-01-01T00:00:00Z".to_string(),
            apply_to_event_types: None,
            apply_to_event_ids: None,
        }
    }

    #[test]
    fn valid_config_has_no_errors() {
        let config =
            EnsembleConfig { config_version: "1.0.0".to_string(), ensembles: vec![sample_def()] };
        assert!(validate_ensemble_config(&config).is_empty());
    }

    #[test]
    fn weight_sum_mismatch_rejected() {
        let mut def = sample_def();
        def.members[1].weight = 0.1;
        let config = EnsembleConfig { config_version: "1.0.0".to_string(), ensembles: vec![def] };
        let errors = validate_ensemble_config(&config);
        assert!(errors.iter().any(|e| e.contains("sum to")));
    }

    #[test]
    fn ensemble_id_shape_enforced() {
        let mut def = sample_def();
        def.ensemble_id = "oracle_v1".to_string();
        let config = EnsembleConfig { config_version: "1.0.0".to_string(), ensembles: vec![def] };
        let errors = validate_ensemble_config(&config);
        assert!(errors.iter().any(|e| e.contains("ensemble_id")));
    }

    #[test]
    fn duplicate_members_rejected() {
        let mut def = sample_def();
        def.members.push(EnsembleMember { forecaster_id: "oracle_v1".to_string(), weight: 0.0 });
        let config = EnsembleConfig { config_version: "1.0.0".to_string(), ensembles: vec![def] };
        let errors = validate_ensemble_config(&config);
        assert!(errors.iter().any(|e| e.contains("duplicate member")));
    }

    #[test]
    fn drop_unknown_renormalizes_remainder() {
        let mut dist = BTreeMap::new();
        dist.insert("YES".to_string(), 0.3);
        dist.insert("NO".to_string(), 0.3);
        dist.insert("UNKNOWN".to_string(), 0.4);
        let cleaned = drop_unknown_and_renormalize(&dist);
        assert!((cleaned["YES"] - 0.5).abs() < 1e-9);
        assert!((cleaned["NO"] - 0.5).abs() < 1e-9);
        assert!(!cleaned.contains_key("UNKNOWN"));
    }

    #[test]
    fn drop_unknown_degenerate_case_is_empty() {
        let mut dist = BTreeMap::new();
        dist.insert("UNKNOWN".to_string(), 1.0);
        assert!(drop_unknown_and_renormalize(&dist).is_empty());
    }

    #[test]
    fn combine_distributions_weighted_average() {
        let mut a = BTreeMap::new();
        a.insert("YES".to_string(), 0.8);
        a.insert("NO".to_string(), 0.2);
        let mut b = BTreeMap::new();
        b.insert("YES".to_string(), 0.2);
        b.insert("NO".to_string(), 0.8);

        let combined = combine_distributions(&[(0.5, a), (0.5, b)]);
        assert!((combined["YES"] - 0.5).abs() < 1e-9);
        let sum: f64 = combined.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn generate_forecast_id_includes_run_and_ensemble() {
        let id = generate_forecast_id("20260415", "RUN_1", "oracle_ensemble_core", "evt_a", 7);
        assert_eq!(id, "fcst_20260415_RUN_1_oracle_ensemble_core_evt_a_7d");
    }

    #[test]
    fn generation_is_idempotent_against_existing_ledger_id() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        let catalog = EventCatalog {
            catalog_version: "1.0.0".to_string(),
            events: vec![oracle_catalog::EventDef {
                event_id: "evt_a".to_string(),
                title: "Event A".to_string(),
                event_type: oracle_core::EventType::Binary,
                allowed_outcomes: vec!["YES".to_string(), "NO".to_string()],
                min_catalog_version: None,
                forecast_source: oracle_catalog::ForecastSource::SimulationOutput {
                    field_path: "compiled.prob".to_string(),
                },
                resolution_source: oracle_catalog::ResolutionSource::ManualOnly,
                horizons_days: vec![7],
                enabled: true,
                bin_spec: None,
                requires_manual_resolution: false,
                auto_resolve: false,
                grace_days: None,
                max_resolution_lag_days: None,
                effective_from_utc: None,
            }],
        };
        let config =
            EnsembleConfig { config_version: "1.0.0".to_string(), ensembles: vec![sample_def()] };
        let as_of_utc = oracle_core::parse_utc("2026-04-15T00:00:00Z").unwrap();

        let mut probabilities_a = BTreeMap::new();
        probabilities_a.insert("YES".to_string(), 0.7);
        probabilities_a.insert("NO".to_string(), 0.3);
        let base_forecast = ForecastRecord {
            forecast_id: "fcst_2026-04-15_RUN_1_evt_a_7d".to_string(),
            event_id: "evt_a".to_string(),
            horizon_days: 7,
            as_of_utc: "2026-04-15T00:00:00Z".to_string(),
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            run_id: "RUN_1".to_string(),
            manifest_id: "sha256:abc".to_string(),
            forecaster_id: "oracle_v1".to_string(),
            forecaster_version: "1.0".to_string(),
            distribution_type: oracle_core::EventType::Binary,
            probabilities: probabilities_a,
            abstain: false,
            abstain_reason: None,
            seed: None,
            n_sims: None,
            artifact_hashes: BTreeMap::new(),
            ensemble_inputs: None,
            baseline_metadata: None,
            derivation_note: None,
        };
        ledger.append_forecast(&base_forecast).unwrap();

        let first_pass =
            generate_ensemble_forecasts(&catalog, &config, &ledger, "RUN_1", as_of_utc, false).unwrap();
        assert_eq!(first_pass.len(), 1);

        let second_pass =
            generate_ensemble_forecasts(&catalog, &config, &ledger, "RUN_1", as_of_utc, false).unwrap();
        assert!(second_pass.is_empty());
    }
}
