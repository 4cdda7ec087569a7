// crates/oracle-catalog/src/catalog.rs
// ============================================================================
// Module: Event Catalog
// Description: Load, validate, and query the static definition of every
//              forecastable and diagnostic-only event.
// Purpose: Give every downstream crate (forecast, resolver, scorer) a single
//          authoritative source for "what events exist and how are they
//          resolved", loaded once from a catalog file on disk.
// Dependencies: oracle-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The catalog is a hand-authored JSON document, versioned independently of
//! the ledger. It never changes as a side effect of forecasting, resolving,
//! or scoring; it is read-only input to all three.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;

use oracle_core::EventId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::bins::BinSpec;
use crate::bins::validate_bin_spec;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Where a forecastable event's probability is produced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForecastSource {
    /// Diagnostic-only; never forecasted.
    DiagnosticOnly,
    /// Read directly from a named field of the run's compiled output.
    SimulationOutput {
        /// Dotted path into the compiled intelligence document.
        field_path: String,
    },
    /// Derived from a boolean expression over compiled-output fields.
    SimulationDerived {
        /// A flat comparison expression, e.g. `"compiled.alert_level >= 3"`.
        expression: String,
    },
    /// Stickiness-decayed persistence of the event's own resolution history;
    /// produced by `oracle-baseline`, not from a live run.
    BaselinePersistence,
    /// Dirichlet/Laplace-smoothed climatology over the event's own
    /// resolution history; produced by `oracle-baseline`, not from a live
    /// run.
    BaselineClimatology,
}

/// Where a resolved event's ground-truth outcome is produced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Never resolved; diagnostic-only.
    None,
    /// Compare a compiled intelligence field against a tagged rule.
    CompiledField {
        /// Dotted path into the compiled intelligence document.
        field_path: String,
        /// The comparison rule applied to the extracted value.
        rule: ResolutionRule,
        /// What to do when `field_path` is absent from compiled intel.
        #[serde(default)]
        fallback: Option<ResolutionFallback>,
    },
    /// Always requires human adjudication; queued, never auto-resolved.
    ManualOnly,
}

/// Behavior when a `compiled_field` resolution source's path is missing from
/// a run's compiled intelligence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionFallback {
    /// Downgrade the resolution mode to `claims_inferred` and emit
    /// `unknown_reason = "requires_claims_resolution"` instead of
    /// `"missing_path"`.
    ClaimsBased,
}

/// A tagged comparison rule for deriving an outcome from an extracted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ResolutionRule {
    /// Outcome is `YES` iff the extracted numeric value is `>= threshold`.
    ThresholdGte { threshold: f64, outcome_if_true: String, outcome_if_false: String },
    /// Outcome is `YES` iff the extracted numeric value is `> threshold`.
    ThresholdGt { threshold: f64, outcome_if_true: String, outcome_if_false: String },
    /// Outcome is `YES` iff the extracted numeric value is `<= threshold`.
    ThresholdLte { threshold: f64, outcome_if_true: String, outcome_if_false: String },
    /// Outcome is `YES` iff the extracted numeric value is `< threshold`.
    ThresholdLt { threshold: f64, outcome_if_true: String, outcome_if_false: String },
    /// Outcome equals the extracted value directly, if it appears in
    /// `allowed_outcomes`.
    EnumEquals,
    /// Outcome is `outcome_if_true` iff the extracted value is a member of
    /// `values`.
    EnumIn { values: Vec<String>, outcome_if_true: String, outcome_if_false: String },
    /// Outcome is whichever member of `values` the extracted value matches
    /// case-insensitively.
    EnumMatch { values: Vec<String> },
    /// Outcome is the bin identifier the extracted numeric value maps to,
    /// per the owning event's top-level `bin_spec`.
    BinMap,
}

/// A single event's static definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    /// Unique event identifier, stable across runs.
    pub event_id: String,
    /// Human-readable title.
    pub title: String,
    /// Event type, determining the shape of `allowed_outcomes`.
    pub event_type: oracle_core::EventType,
    /// Legal outcome labels, excluding the implicit `UNKNOWN` sentinel.
    pub allowed_outcomes: Vec<String>,
    /// Minimum catalog schema version this event requires, e.g. `"1.2.0"`.
    #[serde(default)]
    pub min_catalog_version: Option<String>,
    /// How a live forecast's probability is produced.
    pub forecast_source: ForecastSource,
    /// How this event's ground truth is resolved.
    pub resolution_source: ResolutionSource,
    /// Horizons, in days, this event is forecasted at; a non-empty subset
    /// of `{1, 7, 15, 30}`.
    pub horizons_days: Vec<u32>,
    /// Whether this event is currently forecasted and resolved. Disabled
    /// events are retained in the catalog for historical scoring but are
    /// skipped by forecast generation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Bin partition for `binned_continuous` events; required when
    /// `event_type == BinnedContinuous`, absent otherwise.
    #[serde(default)]
    pub bin_spec: Option<BinSpec>,
    /// Whether this event's outcome always requires a human to adjudicate,
    /// even when a `compiled_field` resolution source is present.
    #[serde(default)]
    pub requires_manual_resolution: bool,
    /// Whether this event is eligible for fully automatic resolution. The
    /// initial resolution mode is `external_auto` only when this is `true`
    /// and `resolution_source.type == compiled_field`; otherwise it starts
    /// `claims_inferred`.
    #[serde(default)]
    pub auto_resolve: bool,
    /// Grace period, in days, after `target_date_utc` before a pending
    /// manual adjudication is flagged overdue. Defaults to the ledger's
    /// own default when absent.
    #[serde(default)]
    pub grace_days: Option<u32>,
    /// Maximum lag, in days, after `target_date_utc` a compiled-field
    /// resolution run may still be accepted for this event.
    #[serde(default)]
    pub max_resolution_lag_days: Option<u32>,
    /// RFC 3339 timestamp from which this event becomes eligible for
    /// forecasting and resolution; required for `binned_continuous` events
    /// in catalogs at `catalog_version >= 3.0.0`.
    #[serde(default)]
    pub effective_from_utc: Option<String>,
}

/// Default for [`EventDef::enabled`] when the field is absent from an
/// older catalog document.
const fn default_enabled() -> bool {
    true
}

/// The full, versioned catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCatalog {
    /// Catalog schema version, e.g. `"1.3.0"`.
    pub catalog_version: String,
    /// All defined events, forecastable and diagnostic alike.
    pub events: Vec<EventDef>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur loading or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read from disk.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The catalog file was not valid JSON, or did not match the expected
    /// shape.
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The catalog parsed successfully but failed semantic validation.
    #[error("catalog failed validation:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
    /// The requested event id is not present in the catalog.
    #[error("unknown event_id: {0}")]
    UnknownEvent(String),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a catalog document from a JSON file on disk.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the file cannot be read,
/// [`CatalogError::Parse`] if it is not valid JSON, or
/// [`CatalogError::Invalid`] if it fails semantic validation.
pub fn load_catalog(path: &Path) -> Result<EventCatalog, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog: EventCatalog =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        return Err(CatalogError::Invalid(errors));
    }
    Ok(catalog)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a catalog document, returning every error found.
///
/// Checks, in order:
/// 1. `catalog_version` is a well-formed `major.minor.patch` string.
/// 2. No duplicate `event_id`s.
/// 3. Every `event_id` is non-empty.
/// 4. Binary events declare exactly `["YES", "NO"]` (order-insensitive).
/// 5. Categorical and `binned_continuous` events declare at least 2 outcomes.
/// 6. `UNKNOWN` is never listed explicitly in `allowed_outcomes`. This
///    catalog intentionally diverges from a stricter, version-gated variant
///    of this rule; see the grounding ledger for the reasoning.
/// 7. `binned_continuous` events carry a top-level `bin_spec` whose bins
///    validate, whose `bin_id`s match `allowed_outcomes` exactly, and whose
///    resolution rule is `bin_map`.
/// 8. `enum_in`/`enum_match` rule outcomes/values are non-empty.
/// 9. `min_catalog_version`, if present, is `<=` the catalog's own version.
/// 10. `horizons_days` is non-empty and every entry is one of `{1, 7, 15, 30}`.
/// 11. `binned_continuous` events at `catalog_version >= 3.0.0` declare
///     `effective_from_utc`.
#[must_use]
pub fn validate_catalog(catalog: &EventCatalog) -> Vec<String> {
    let mut errors = Vec::new();

    if parse_semver(&catalog.catalog_version).is_none() {
        errors.push(format!(
            "catalog_version is not a valid semver string: {}",
            catalog.catalog_version
        ));
    }

    let mut seen_ids = BTreeSet::new();
    for event in &catalog.events {
        if event.event_id.is_empty() {
            errors.push("event_id must not be empty".to_string());
            continue;
        }
        if !seen_ids.insert(event.event_id.as_str()) {
            errors.push(format!("duplicate event_id: {}", event.event_id));
        }

        if event.allowed_outcomes.iter().any(|o| o == oracle_core::UNKNOWN_OUTCOME) {
            errors.push(format!(
                "event {} must not list UNKNOWN explicitly in allowed_outcomes",
                event.event_id
            ));
        }

        match event.event_type {
            oracle_core::EventType::Binary => {
                let mut sorted = event.allowed_outcomes.clone();
                sorted.sort();
                if sorted != vec!["NO".to_string(), "YES".to_string()] {
                    errors.push(format!(
                        "binary event {} must declare exactly [YES, NO]",
                        event.event_id
                    ));
                }
            }
            oracle_core::EventType::Categorical | oracle_core::EventType::BinnedContinuous => {
                if event.allowed_outcomes.len() < 2 {
                    errors.push(format!(
                        "event {} must declare at least 2 allowed_outcomes",
                        event.event_id
                    ));
                }
            }
            oracle_core::EventType::DiagnosticOnly => {}
        }

        if matches!(event.event_type, oracle_core::EventType::BinnedContinuous) {
            let uses_bin_map_rule = matches!(
                &event.resolution_source,
                ResolutionSource::CompiledField { rule: ResolutionRule::BinMap, .. }
            );
            if !uses_bin_map_rule {
                errors.push(format!(
                    "binned_continuous event {} must use a compiled_field resolution source with a bin_map rule",
                    event.event_id
                ));
            }
            match &event.bin_spec {
                Some(bin_spec) => {
                    for e in validate_bin_spec(bin_spec) {
                        errors.push(format!("event {}: {}", event.event_id, e));
                    }
                    let mut bin_ids: Vec<&str> =
                        bin_spec.bins.iter().map(|b| b.bin_id.as_str()).collect();
                    bin_ids.sort_unstable();
                    let mut outcomes = event.allowed_outcomes.clone();
                    outcomes.sort();
                    if bin_ids != outcomes.iter().map(String::as_str).collect::<Vec<_>>() {
                        errors.push(format!(
                            "event {}: bin_spec bin_ids must match allowed_outcomes exactly",
                            event.event_id
                        ));
                    }
                }
                None => errors.push(format!(
                    "binned_continuous event {} must declare a bin_spec",
                    event.event_id
                )),
            }
            if let Some(catalog_version) = parse_semver(&catalog.catalog_version) {
                if version_gte(catalog_version, (3, 0, 0)) && event.effective_from_utc.is_none() {
                    errors.push(format!(
                        "event {}: binned_continuous events require effective_from_utc at catalog_version >= 3.0.0",
                        event.event_id
                    ));
                }
            }
        }

        if event.horizons_days.is_empty() {
            errors.push(format!("event {}: horizons_days must not be empty", event.event_id));
        }
        for h in &event.horizons_days {
            if !matches!(h, 1 | 7 | 15 | 30) {
                errors.push(format!(
                    "event {}: horizons_days entry {h} is not one of {{1, 7, 15, 30}}",
                    event.event_id
                ));
            }
        }

        if let ResolutionSource::CompiledField { rule, .. } = &event.resolution_source {
            match rule {
                ResolutionRule::EnumIn { values, .. } | ResolutionRule::EnumMatch { values } => {
                    if values.is_empty() {
                        errors.push(format!(
                            "event {}: enum resolution rule must list at least one value",
                            event.event_id
                        ));
                    }
                }
                _ => {}
            }
        }

        if let Some(min_version) = &event.min_catalog_version {
            match parse_semver(min_version) {
                None => errors.push(format!(
                    "event {}: min_catalog_version is not a valid semver string: {}",
                    event.event_id, min_version
                )),
                Some(min) => {
                    if let Some(catalog_version) = parse_semver(&catalog.catalog_version) {
                        if !version_gte(catalog_version, min) {
                            errors.push(format!(
                                "event {} requires catalog_version >= {} but catalog is {}",
                                event.event_id, min_version, catalog.catalog_version
                            ));
                        }
                    }
                }
            }
        }
    }

    errors
}

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

fn version_gte(actual: (u64, u64, u64), required: (u64, u64, u64)) -> bool {
    actual >= required
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Looks up an event definition by id.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownEvent`] if no event with `event_id`
/// exists.
pub fn get_event<'a>(
    catalog: &'a EventCatalog,
    event_id: &str,
) -> Result<&'a EventDef, CatalogError> {
    catalog
        .events
        .iter()
        .find(|e| e.event_id == event_id)
        .ok_or_else(|| CatalogError::UnknownEvent(event_id.to_string()))
}

/// Returns every event in the catalog, in declaration order.
#[must_use]
pub fn list_events(catalog: &EventCatalog) -> &[EventDef] {
    &catalog.events
}

/// Returns events whose `forecast_source` produces a live forecast.
#[must_use]
pub fn get_forecastable_events(catalog: &EventCatalog) -> Vec<&EventDef> {
    catalog
        .events
        .iter()
        .filter(|e| !matches!(e.forecast_source, ForecastSource::DiagnosticOnly))
        .collect()
}

/// Returns events marked `diagnostic_only`, tracked but never forecasted.
#[must_use]
pub fn get_diagnostic_events(catalog: &EventCatalog) -> Vec<&EventDef> {
    catalog
        .events
        .iter()
        .filter(|e| matches!(e.event_type, oracle_core::EventType::DiagnosticOnly))
        .collect()
}

/// Re-validates a single event's bin specification, independent of the
/// whole-catalog pass, for use by callers that only hold one `EventDef`.
#[must_use]
pub fn validate_event_bins(event: &EventDef) -> Vec<String> {
    match &event.bin_spec {
        Some(bin_spec) => validate_bin_spec(bin_spec),
        None => Vec::new(),
    }
}

/// Converts a string event identifier into the shared [`EventId`] newtype,
/// provided for callers that received the id as raw JSON.
#[must_use]
pub fn to_event_id(raw: &str) -> EventId {
    EventId::from(raw)
}

/// Extracts the catalog's raw JSON `Value`, used by the CLI `validate`
/// subcommand to report schema errors without a typed round-trip.
///
/// # Errors
///
/// Returns [`CatalogError::Io`]/[`CatalogError::Parse`] on the same
/// conditions as [`load_catalog`].
pub fn load_catalog_raw(path: &Path) -> Result<Value, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })
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

    fn binary_event(id: &str) -> EventDef {
        EventDef {
            event_id: id.to_string(),
            title: "Test Event".to_string(),
            event_type: oracle_core::EventType::Binary,
            allowed_outcomes: vec!["YES".to_string(), "NO".to_string()],
            min_catalog_version: None,
            forecast_source: ForecastSource::SimulationOutput {
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
            auto_resolve: true,
            grace_days: None,
            max_resolution_lag_days: None,
            effective_from_utc: None,
        }
    }

    #[test]
    fn valid_catalog_has_no_errors() {
        let catalog =
            EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![binary_event("e1")] };
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn duplicate_event_ids_are_rejected() {
        let catalog = EventCatalog {
            catalog_version: "1.0.0".to_string(),
            events: vec![binary_event("e1"), binary_event("e1")],
        };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("duplicate event_id")));
    }

    #[test]
    fn binary_event_must_declare_yes_no() {
        let mut event = binary_event("e1");
        event.allowed_outcomes = vec!["MAYBE".to_string()];
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("exactly [YES, NO]")));
    }

    #[test]
    fn malformed_version_is_rejected() {
        let catalog =
            EventCatalog { catalog_version: "v1".to_string(), events: vec![binary_event("e1")] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("catalog_version")));
    }

    #[test]
    fn min_catalog_version_enforced() {
        let mut event = binary_event("e1");
        event.min_catalog_version = Some("2.0.0".to_string());
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("requires catalog_version >=")));
    }

    #[test]
    fn get_event_returns_unknown_for_missing_id() {
        let catalog =
            EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![binary_event("e1")] };
        assert!(matches!(get_event(&catalog, "nope"), Err(CatalogError::UnknownEvent(_))));
    }

    #[test]
    fn unknown_outcome_explicit_listing_rejected() {
        let mut event = binary_event("e1");
        event.allowed_outcomes.push(oracle_core::UNKNOWN_OUTCOME.to_string());
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("must not list UNKNOWN")));
    }

    #[test]
    fn empty_horizons_days_rejected() {
        let mut event = binary_event("e1");
        event.horizons_days = Vec::new();
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("horizons_days must not be empty")));
    }

    #[test]
    fn unsupported_horizon_rejected() {
        let mut event = binary_event("e1");
        event.horizons_days = vec![14];
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("not one of {1, 7, 15, 30}")));
    }

    #[test]
    fn binned_continuous_without_bin_spec_rejected() {
        let mut event = binary_event("e1");
        event.event_type = oracle_core::EventType::BinnedContinuous;
        event.allowed_outcomes = vec!["LOW".to_string(), "HIGH".to_string()];
        event.resolution_source = ResolutionSource::CompiledField {
            field_path: "compiled.value".to_string(),
            rule: ResolutionRule::BinMap,
            fallback: None,
        };
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("must declare a bin_spec")));
    }

    #[test]
    fn binned_continuous_at_v3_requires_effective_from() {
        use crate::bins::BinDef;

        let mut event = binary_event("e1");
        event.event_type = oracle_core::EventType::BinnedContinuous;
        event.allowed_outcomes = vec!["LOW".to_string(), "HIGH".to_string()];
        event.resolution_source = ResolutionSource::CompiledField {
            field_path: "compiled.value".to_string(),
            rule: ResolutionRule::BinMap,
            fallback: None,
        };
        event.bin_spec = Some(BinSpec {
            bins: vec![
                BinDef {
                    bin_id: "LOW".to_string(),
                    label: "Low".to_string(),
                    min: None,
                    max: Some(0.5),
                    include_min: true,
                    include_max: false,
                },
                BinDef {
                    bin_id: "HIGH".to_string(),
                    label: "High".to_string(),
                    min: Some(0.5),
                    max: None,
                    include_min: true,
                    include_max: false,
                },
            ],
        });
        let catalog = EventCatalog { catalog_version: "3.0.0".to_string(), events: vec![event] };
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("require effective_from_utc")));
    }
}
