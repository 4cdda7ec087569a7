// crates/oracle-resolver/src/lib.rs
// ============================================================================
// Crate: oracle-resolver
// Description: Resolves pending forecasts against compiled intelligence,
//              writes evidence snapshots, and appends resolution records.
// Purpose: Turn a catalog event's resolution rule plus a later run's
//          compiled output into a ground-truth outcome, auditable after the
//          fact via its evidence snapshot and manifest hash.
// Dependencies: oracle-catalog, oracle-core, oracle-evidence, oracle-ledger,
//               oracle-runs, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`resolve_event`] is the unit of work: given one event and a target
//! date, find the earliest valid run whose data cutoff has passed the
//! target, extract the field the event's resolution rule names, apply that
//! rule, and append the resulting [`oracle_ledger::ResolutionRecord`].
//! [`resolve_pending`] runs this over every pending, non-manual forecast in
//! the ledger, continuing past a single event's failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use oracle_catalog::EventCatalog;
use oracle_catalog::EventDef;
use oracle_catalog::ResolutionFallback;
use oracle_catalog::ResolutionRule;
use oracle_catalog::ResolutionSource;
use oracle_ledger::ForecastRecord;
use oracle_ledger::Ledger;
use oracle_ledger::ResolutionRecord;
use oracle_runs::RunInfo;
use serde_json::Value;

/// The stable identifier stamped on every resolution this crate produces.
pub const RESOLVER_VERSION: &str = "oracle_resolver_v2";

/// Default lag window, in days, used when an event declares no
/// `max_resolution_lag_days` override.
pub const DEFAULT_MAX_RESOLUTION_LAG_DAYS: i64 = 14;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised resolving a single event or a batch of pending forecasts.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// No run satisfying the resolution lag window could be found.
    #[error("run selection failed: {0}")]
    RunSelection(#[from] oracle_runs::RunSelectorError),
    /// The compiled intelligence document could not be read.
    #[error("failed to read compiled intelligence at {path}: {source}")]
    CompiledIntel {
        /// Path the failing read targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The compiled intelligence document was not valid JSON.
    #[error("failed to parse compiled intelligence at {path}: {source}")]
    CompiledIntelParse {
        /// Path the failing parse targeted.
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The event has no `compiled_field` resolution source to evaluate.
    #[error("event {0} has no compiled_field resolution source")]
    NoResolutionSource(String),
    /// A ledger read or append failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
    /// An evidence snapshot could not be written.
    #[error("evidence error: {0}")]
    Evidence(#[from] oracle_evidence::EvidenceError),
    /// A catalog lookup failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] oracle_catalog::CatalogError),
    /// A timestamp failed to parse or format.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
}

// ============================================================================
// SECTION: Resolution Mode
// ============================================================================

/// Determines the initial resolution mode an event resolves under:
/// `ExternalManual` if the event requires manual resolution or declares a
/// `manual_only` resolution source; `ExternalAuto` if the event both opts
/// into `auto_resolve` and declares a `compiled_field` resolution source;
/// `ClaimsInferred` otherwise (the event has a live resolution path but has
/// not been marked auto-resolvable).
#[must_use]
pub fn determine_resolution_mode(event: &EventDef) -> oracle_core::ResolutionMode {
    if event.requires_manual_resolution || matches!(event.resolution_source, ResolutionSource::ManualOnly)
    {
        oracle_core::ResolutionMode::ExternalManual
    } else if event.auto_resolve && matches!(event.resolution_source, ResolutionSource::CompiledField { .. })
    {
        oracle_core::ResolutionMode::ExternalAuto
    } else {
        oracle_core::ResolutionMode::ClaimsInferred
    }
}

/// Reads an explicit `resolution_mode` field off a raw (untyped) resolution
/// document, defaulting to `ExternalAuto` when absent — back-compat with
/// ledger lines written before mode-tagging existed.
#[must_use]
pub fn get_resolution_mode(raw: &Value) -> oracle_core::ResolutionMode {
    raw.get("resolution_mode")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(oracle_core::ResolutionMode::ExternalAuto)
}

// ============================================================================
// SECTION: Value Extraction
// ============================================================================

/// Extracts a value for `field_path` from a run's compiled intelligence
/// document: a flat `compiled_fields` map is checked first (exact key
/// match), falling back to dot-path traversal into the document itself.
#[must_use]
pub fn extract_compiled_value<'a>(compiled_intel: &'a Value, field_path: &str) -> Option<&'a Value> {
    if let Some(flat) = compiled_intel.get("compiled_fields").and_then(Value::as_object) {
        if let Some(value) = flat.get(field_path) {
            return Some(value);
        }
    }
    extract_nested_value(compiled_intel, field_path)
}

/// Traverses `doc` along a dotted path (`"a.b.c"`), returning the value at
/// the terminal key, or `None` if any segment is absent or not an object.
fn extract_nested_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// ============================================================================
// SECTION: Rule Application
// ============================================================================

/// Applies a resolution rule to an extracted value, returning the resolved
/// outcome (a member of `allowed_outcomes`, or `UNKNOWN`) and, for
/// `UNKNOWN` outcomes, a machine-readable reason.
///
/// A missing value, an extraction type mismatch, or an evaluation error
/// never hard-fails; each maps to `(UNKNOWN, Some(reason))` so a batch
/// resolution run continues past a single bad event.
#[must_use]
pub fn apply_resolution_rule(
    rule: &ResolutionRule,
    extracted: Option<&Value>,
    bin_spec: Option<&oracle_catalog::BinSpec>,
    allowed_outcomes: &[String],
) -> (String, Option<String>) {
    let Some(value) = extracted else {
        return (oracle_core::UNKNOWN_OUTCOME.to_string(), Some("missing_value".to_string()));
    };

    match rule {
        ResolutionRule::ThresholdGte { threshold, outcome_if_true, outcome_if_false } => {
            apply_threshold(value, *threshold, outcome_if_true, outcome_if_false, |v, t| v >= t)
        }
        ResolutionRule::ThresholdGt { threshold, outcome_if_true, outcome_if_false } => {
            apply_threshold(value, *threshold, outcome_if_true, outcome_if_false, |v, t| v > t)
        }
        ResolutionRule::ThresholdLte { threshold, outcome_if_true, outcome_if_false } => {
            apply_threshold(value, *threshold, outcome_if_true, outcome_if_false, |v, t| v <= t)
        }
        ResolutionRule::ThresholdLt { threshold, outcome_if_true, outcome_if_false } => {
            apply_threshold(value, *threshold, outcome_if_true, outcome_if_false, |v, t| v < t)
        }
        ResolutionRule::EnumEquals => match value.as_str() {
            Some(observed) => match allowed_outcomes.iter().find(|o| o.eq_ignore_ascii_case(observed)) {
                Some(matched) => (matched.clone(), None),
                None => (
                    oracle_core::UNKNOWN_OUTCOME.to_string(),
                    Some(format!("rule_error:no allowed_outcomes match {observed}")),
                ),
            },
            None => (
                oracle_core::UNKNOWN_OUTCOME.to_string(),
                Some("rule_error:value is not a string".to_string()),
            ),
        },
        ResolutionRule::EnumIn { values, outcome_if_true, outcome_if_false } => match value.as_str() {
            Some(observed) => {
                let is_member = values.iter().any(|v| v.eq_ignore_ascii_case(observed));
                let outcome = if is_member { outcome_if_true } else { outcome_if_false };
                (outcome.clone(), None)
            }
            None => (
                oracle_core::UNKNOWN_OUTCOME.to_string(),
                Some("rule_error:value is not a string".to_string()),
            ),
        },
        ResolutionRule::EnumMatch { values } => match value.as_str() {
            Some(observed) => match values.iter().find(|v| v.eq_ignore_ascii_case(observed)) {
                Some(matched) => (matched.clone(), None),
                None => (
                    oracle_core::UNKNOWN_OUTCOME.to_string(),
                    Some(format!("rule_error:no configured value matches {observed}")),
                ),
            },
            None => (
                oracle_core::UNKNOWN_OUTCOME.to_string(),
                Some("rule_error:value is not a string".to_string()),
            ),
        },
        ResolutionRule::BinMap => {
            let Some(spec) = bin_spec else {
                return (
                    oracle_core::UNKNOWN_OUTCOME.to_string(),
                    Some("rule_error:event has no bin_spec".to_string()),
                );
            };
            match oracle_catalog::value_to_bin(value.as_f64(), spec) {
                Ok(bin_id) => (bin_id.to_string(), None),
                Err(e) => (
                    oracle_core::UNKNOWN_OUTCOME.to_string(),
                    Some(format!("rule_error:{}", e.reason_code())),
                ),
            }
        }
    }
}

/// Applies a numeric threshold comparison, mapping a non-numeric or `NaN`
/// value to an `UNKNOWN` rule error.
fn apply_threshold(
    value: &Value,
    threshold: f64,
    outcome_if_true: &str,
    outcome_if_false: &str,
    compare: impl Fn(f64, f64) -> bool,
) -> (String, Option<String>) {
    match value.as_f64() {
        Some(v) if !v.is_nan() => {
            let outcome = if compare(v, threshold) { outcome_if_true } else { outcome_if_false };
            (outcome.to_string(), None)
        }
        _ => (
            oracle_core::UNKNOWN_OUTCOME.to_string(),
            Some("rule_error:value is not a finite number".to_string()),
        ),
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Builds a resolution's deterministic identifier:
/// `res_{target_date}_{event_id}_{horizon_days}d`. `target_date` must
/// already be the compact `YYYYMMDD` form (see
/// [`oracle_core::format_compact_date`]) — embedding the full RFC 3339
/// timestamp here would put colons in the evidence filename derived from
/// this id.
#[must_use]
pub fn generate_resolution_id(target_date: &str, event_id: &str, horizon_days: u32) -> String {
    format!("res_{target_date}_{event_id}_{horizon_days}d")
}

/// Resolves one pending forecast against the earliest valid run whose data
/// cutoff satisfies the event's resolution lag window, writes an evidence
/// snapshot for auto-resolved, non-`UNKNOWN` outcomes, and appends the
/// resulting [`ResolutionRecord`].
///
/// # Errors
///
/// Returns [`ResolutionError::NoResolutionSource`] if the event has no
/// `compiled_field` resolution source, [`ResolutionError::RunSelection`] if
/// no run satisfies the lag window, or a read/parse/ledger/evidence error.
pub fn resolve_event(
    catalog: &EventCatalog,
    event: &EventDef,
    forecast: &ForecastRecord,
    runs_dir: &Path,
    evidence_dir: &Path,
    ledger: &Ledger,
    now: time::OffsetDateTime,
    default_max_lag_days: i64,
) -> Result<ResolutionRecord, ResolutionError> {
    let (field_path, rule, fallback) = match &event.resolution_source {
        ResolutionSource::CompiledField { field_path, rule, fallback } => (field_path, rule, fallback),
        ResolutionSource::None | ResolutionSource::ManualOnly => {
            return Err(ResolutionError::NoResolutionSource(event.event_id.clone()));
        }
    };

    let target_date_utc = oracle_core::parse_utc(&forecast.target_date_utc)?;
    let max_lag_days = event
        .max_resolution_lag_days
        .map_or(default_max_lag_days, |override_days| i64::from(override_days));
    let run = oracle_runs::find_resolution_run(
        runs_dir,
        oracle_runs::RunMode::Observe,
        target_date_utc,
        max_lag_days,
    )?;

    let compiled_path = run.path.join("compiled_intel.json");
    let compiled_intel = load_json(&compiled_path)?;

    let manifest_path = run.path.join("run_manifest.json");
    let resolution_manifest_id = oracle_ledger::compute_manifest_id(&manifest_path)?;

    let extracted = extract_compiled_value(&compiled_intel, field_path);
    let mut resolution_mode = determine_resolution_mode(event);
    let (resolved_outcome, unknown_reason) = if extracted.is_none() {
        if matches!(fallback, Some(ResolutionFallback::ClaimsBased)) {
            resolution_mode = oracle_core::ResolutionMode::ClaimsInferred;
            (oracle_core::UNKNOWN_OUTCOME.to_string(), Some("requires_claims_resolution".to_string()))
        } else {
            (oracle_core::UNKNOWN_OUTCOME.to_string(), Some("missing_path".to_string()))
        }
    } else {
        apply_resolution_rule(rule, extracted, event.bin_spec.as_ref(), &event.allowed_outcomes)
    };

    let target_date_compact = oracle_core::format_compact_date(target_date_utc);
    let resolution_id =
        generate_resolution_id(&target_date_compact, &event.event_id, forecast.horizon_days);
    let rule_applied = format!("{}:{}", rule_tag(rule), field_path);

    let mut evidence_refs = Vec::new();
    let mut evidence_hashes = Vec::new();
    if matches!(resolution_mode, oracle_core::ResolutionMode::ExternalAuto)
        && resolved_outcome != oracle_core::UNKNOWN_OUTCOME
    {
        let snapshot = oracle_evidence::EvidenceSnapshot {
            resolution_id: resolution_id.clone(),
            run_id: run.run_name.clone(),
            data_cutoff_utc: run.manifest.as_ref().and_then(|m| m.data_cutoff_utc.clone()),
            path_used: field_path.clone(),
            extracted_value: extracted.cloned().unwrap_or(Value::Null),
            rule_applied: rule_applied.clone(),
            snapshot_utc: String::new(),
        };
        let (path, hash) = oracle_evidence::write_snapshot(evidence_dir, &resolution_id, snapshot, now)?;
        evidence_refs.push(path.display().to_string());
        evidence_hashes.push(hash);
    }

    let _ = catalog;

    let record = ResolutionRecord {
        resolution_id,
        forecast_id: forecast.forecast_id.clone(),
        event_id: event.event_id.clone(),
        horizon_days: forecast.horizon_days,
        target_date_utc: forecast.target_date_utc.clone(),
        resolved_outcome,
        resolved_value: extracted.cloned(),
        resolved_at_utc: oracle_core::format_utc(now)?,
        resolution_mode,
        reason_code: None,
        unknown_reason,
        run_id: Some(run.run_name.clone()),
        resolution_manifest_id: Some(resolution_manifest_id),
        rule_applied: Some(rule_applied),
        evidence_refs,
        evidence_hashes,
        resolved_by: RESOLVER_VERSION.to_string(),
    };

    ledger.append_resolution(&record)?;
    Ok(record)
}

/// A short, stable tag identifying a resolution rule kind, used to build
/// `rule_applied`.
fn rule_tag(rule: &ResolutionRule) -> &'static str {
    match rule {
        ResolutionRule::ThresholdGte { .. } => "threshold_gte",
        ResolutionRule::ThresholdGt { .. } => "threshold_gt",
        ResolutionRule::ThresholdLte { .. } => "threshold_lte",
        ResolutionRule::ThresholdLt { .. } => "threshold_lt",
        ResolutionRule::EnumEquals => "enum_equals",
        ResolutionRule::EnumIn { .. } => "enum_in",
        ResolutionRule::EnumMatch { .. } => "enum_match",
        ResolutionRule::BinMap => "bin_map",
    }
}

/// Reads and parses a run artifact as JSON.
fn load_json(path: &Path) -> Result<Value, ResolutionError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ResolutionError::CompiledIntel { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| ResolutionError::CompiledIntelParse { path: path.display().to_string(), source })
}

// ============================================================================
// SECTION: Batch Resolution
// ============================================================================

/// The outcome of attempting to resolve one pending forecast within a
/// [`resolve_pending`] batch.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// The forecast was resolved and appended.
    Resolved(ResolutionRecord),
    /// Resolution was attempted but failed; the batch continues.
    Failed {
        /// The forecast that failed to resolve.
        forecast_id: String,
        /// Why resolution failed.
        error: ResolutionError,
    },
}

/// Resolves every pending forecast for events that do not require manual
/// resolution, continuing past a per-event failure rather than aborting the
/// batch.
///
/// # Errors
///
/// Returns [`ResolutionError::Ledger`] only if the initial read of pending
/// forecasts fails; per-event failures are reported as
/// [`ResolutionOutcome::Failed`] entries instead.
pub fn resolve_pending(
    catalog: &EventCatalog,
    ledger: &Ledger,
    runs_dir: &Path,
    evidence_dir: &Path,
    now: time::OffsetDateTime,
    default_max_lag_days: i64,
) -> Result<Vec<ResolutionOutcome>, ResolutionError> {
    let pending = ledger.get_pending_forecasts()?;
    let mut outcomes = Vec::new();

    for forecast in pending {
        let event = match oracle_catalog::get_event(catalog, &forecast.event_id) {
            Ok(event) => event,
            Err(e) => {
                outcomes.push(ResolutionOutcome::Failed {
                    forecast_id: forecast.forecast_id.clone(),
                    error: ResolutionError::Catalog(e),
                });
                continue;
            }
        };

        if event.requires_manual_resolution {
            continue;
        }

        match resolve_event(
            catalog,
            event,
            &forecast,
            runs_dir,
            evidence_dir,
            ledger,
            now,
            default_max_lag_days,
        ) {
            Ok(record) => outcomes.push(ResolutionOutcome::Resolved(record)),
            Err(error) => {
                outcomes.push(ResolutionOutcome::Failed { forecast_id: forecast.forecast_id, error });
            }
        }
    }

    Ok(outcomes)
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

    #[test]
    fn threshold_gte_above_is_yes() {
        let rule = ResolutionRule::ThresholdGte {
            threshold: 3.0,
            outcome_if_true: "YES".to_string(),
            outcome_if_false: "NO".to_string(),
        };
        let value = serde_json::json!(4.0);
        let (outcome, reason) = apply_resolution_rule(&rule, Some(&value), None, &[]);
        assert_eq!(outcome, "YES");
        assert!(reason.is_none());
    }

    #[test]
    fn missing_value_is_unknown_with_reason() {
        let rule = ResolutionRule::ThresholdGte {
            threshold: 3.0,
            outcome_if_true: "YES".to_string(),
            outcome_if_false: "NO".to_string(),
        };
        let (outcome, reason) = apply_resolution_rule(&rule, None, None, &[]);
        assert_eq!(outcome, oracle_core::UNKNOWN_OUTCOME);
        assert_eq!(reason, Some("missing_value".to_string()));
    }

    #[test]
    fn non_numeric_value_is_rule_error() {
        let rule = ResolutionRule::ThresholdGte {
            threshold: 3.0,
            outcome_if_true: "YES".to_string(),
            outcome_if_false: "NO".to_string(),
        };
        let value = serde_json::json!("not a number");
        let (outcome, reason) = apply_resolution_rule(&rule, Some(&value), None, &[]);
        assert_eq!(outcome, oracle_core::UNKNOWN_OUTCOME);
        assert!(reason.unwrap().starts_with("rule_error:"));
    }

    #[test]
    fn enum_equals_matches_case_insensitively() {
        let value = serde_json::json!("yes");
        let (outcome, _) = apply_resolution_rule(
            &ResolutionRule::EnumEquals,
            Some(&value),
            None,
            &["YES".to_string(), "NO".to_string()],
        );
        assert_eq!(outcome, "YES");
    }

    #[test]
    fn enum_in_checks_membership() {
        let rule = ResolutionRule::EnumIn {
            values: vec!["red".to_string(), "orange".to_string()],
            outcome_if_true: "YES".to_string(),
            outcome_if_false: "NO".to_string(),
        };
        let value = serde_json::json!("RED");
        let (outcome, _) = apply_resolution_rule(&rule, Some(&value), None, &[]);
        assert_eq!(outcome, "YES");
    }

    #[test]
    fn bin_map_delegates_to_value_to_bin() {
        use oracle_catalog::BinDef;
        use oracle_catalog::BinSpec;

        let spec = BinSpec {
            bins: vec![
                BinDef {
                    bin_id: "LOW".to_string(),
                    label: "Low".to_string(),
                    min: None,
                    max: Some(1.0),
                    include_min: true,
                    include_max: false,
                },
                BinDef {
                    bin_id: "HIGH".to_string(),
                    label: "High".to_string(),
                    min: Some(1.0),
                    max: None,
                    include_min: true,
                    include_max: false,
                },
            ],
        };
        let value = serde_json::json!(0.5);
        let (outcome, reason) =
            apply_resolution_rule(&ResolutionRule::BinMap, Some(&value), Some(&spec), &[]);
        assert_eq!(outcome, "LOW");
        assert!(reason.is_none());
    }

    #[test]
    fn extract_compiled_value_prefers_flat_fields() {
        let doc = serde_json::json!({
            "compiled_fields": {"alert_level": 4},
            "alert_level": 1
        });
        let value = extract_compiled_value(&doc, "alert_level").unwrap();
        assert_eq!(value.as_i64(), Some(4));
    }

    #[test]
    fn extract_compiled_value_falls_back_to_dotted_path() {
        let doc = serde_json::json!({"a": {"b": 7}});
        let value = extract_compiled_value(&doc, "a.b").unwrap();
        assert_eq!(value.as_i64(), Some(7));
    }

    #[test]
    fn resolution_id_has_expected_shape() {
        let id = generate_resolution_id("20260422", "evt_a", 7);
        assert_eq!(id, "res_20260422_evt_a_7d");
    }

    #[test]
    fn determine_resolution_mode_requires_auto_resolve_and_compiled_source() {
        let mut event = sample_event();
        event.auto_resolve = false;
        assert_eq!(determine_resolution_mode(&event), oracle_core::ResolutionMode::ClaimsInferred);

        event.auto_resolve = true;
        assert_eq!(determine_resolution_mode(&event), oracle_core::ResolutionMode::ExternalAuto);
    }

    #[test]
    fn determine_resolution_mode_manual_only_wins_over_auto_resolve() {
        let mut event = sample_event();
        event.auto_resolve = true;
        event.resolution_source = ResolutionSource::ManualOnly;
        assert_eq!(determine_resolution_mode(&event), oracle_core::ResolutionMode::ExternalManual);
    }

    fn sample_event() -> EventDef {
        EventDef {
            event_id: "evt_a".to_string(),
            title: "Test Event".to_string(),
            event_type: oracle_core::EventType::Binary,
            allowed_outcomes: vec!["YES".to_string(), "NO".to_string()],
            min_catalog_version: None,
            forecast_source: oracle_catalog::ForecastSource::SimulationOutput {
                field_path: "compiled.prob".to_string(),
            },
            resolution_source: ResolutionSource::CompiledField {
                field_path: "compiled.alert_level".to_string(),
                rule: ResolutionRule::ThresholdGte {
                    threshold: 3.0,
                    outcome_if_true: "YES".to_string(),
                    outcome_if_false: "NO".to_string(),
                },
                fallback: None,
            },
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
}
