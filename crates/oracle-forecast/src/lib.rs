// crates/oracle-forecast/src/lib.rs
// ============================================================================
// Crate: oracle-forecast
// Description: Derives probability distributions from simulation artifacts
//              and assembles them into ledger-ready forecast records.
// Purpose: Turn a catalog event definition plus one run's compiled output
//          into a validated `ForecastRecord`, for every configured horizon.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, oracle-ledger,
//               oracle-runs, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! One call to [`generate_forecasts`] walks every forecastable event in a
//! catalog, derives a probability for each of its configured horizons, and
//! appends the resulting [`oracle_ledger::ForecastRecord`]s. Derivation
//! dispatches on [`oracle_catalog::ForecastSource`]: `simulation_output` and
//! `simulation_derived` events read the selected run's compiled
//! intelligence, with `simulation_output` going through
//! [`hazard_rate_conversion`] to translate a native 90-day probability to
//! the requested horizon; `baseline_persistence` and `baseline_climatology`
//! events are instead routed through `oracle-baseline`'s history-index
//! machinery, since they have no live run output to read. A distribution
//! that fails validation is skipped with a collected warning rather than
//! aborting the whole pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use oracle_baseline::BaselineConfig;
use oracle_baseline::HistoryGroup;
use oracle_baseline::HistoryIndex;
use oracle_catalog::EventDef;
use oracle_catalog::EventCatalog;
use oracle_catalog::ForecastSource;
use oracle_ledger::BaselineMetadata;
use oracle_ledger::ForecastRecord;
use oracle_ledger::Ledger;
use oracle_runs::RunInfo;
use serde_json::Value;

/// Tolerance a probability distribution's sum must fall within `1.0`.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// The native horizon, in days, a `simulation_output` probability is read
/// at before [`hazard_rate_conversion`] projects it onto the requested
/// horizon.
const NATIVE_HORIZON_DAYS: f64 = 90.0;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised deriving or assembling a forecast.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The compiled intelligence document could not be read or parsed.
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
    /// A probability distribution failed validation.
    #[error("invalid distribution for event {event_id}: {reason}")]
    InvalidDistribution {
        /// The event the distribution was built for.
        event_id: String,
        /// Human-readable reason the distribution failed validation.
        reason: String,
    },
    /// Run selection failed.
    #[error("run selection failed: {0}")]
    RunSelection(#[from] oracle_runs::RunSelectorError),
    /// Catalog loading or lookup failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] oracle_catalog::CatalogError),
    /// The baseline engine failed to build a history index.
    #[error("baseline error: {0}")]
    Baseline(#[from] oracle_baseline::BaselineError),
    /// A ledger read or append failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
    /// A timestamp failed to parse or format.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
}

// ============================================================================
// SECTION: Distribution Validation
// ============================================================================

/// Validates a forecast's probability distribution: no `NaN`, no negative
/// entries, every value in `[0, 1]`, the sum within
/// [`PROBABILITY_SUM_TOLERANCE`] of `1.0`, and keys exactly equal to
/// `allowed_outcomes` (order-insensitive).
///
/// # Errors
///
/// Returns [`ForecastError::InvalidDistribution`] describing the first
/// violation found.
pub fn validate_distribution(
    event_id: &str,
    probabilities: &BTreeMap<String, f64>,
    allowed_outcomes: &[String],
) -> Result<(), ForecastError> {
    let fail = |reason: &str| {
        Err(ForecastError::InvalidDistribution { event_id: event_id.to_string(), reason: reason.to_string() })
    };

    for (outcome, p) in probabilities {
        if p.is_nan() {
            return fail(&format!("probability for {outcome} is NaN"));
        }
        if *p < 0.0 {
            return fail(&format!("probability for {outcome} is negative"));
        }
        if *p > 1.0 {
            return fail(&format!("probability for {outcome} exceeds 1.0"));
        }
    }

    let sum: f64 = probabilities.values().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return fail(&format!("distribution sums to {sum}, not 1.0"));
    }

    let mut expected: Vec<&str> = allowed_outcomes.iter().map(String::as_str).collect();
    expected.sort_unstable();
    let mut actual: Vec<&str> = probabilities.keys().map(String::as_str).collect();
    actual.sort_unstable();
    if expected != actual {
        return fail("distribution keys do not match allowed_outcomes exactly");
    }

    Ok(())
}

// ============================================================================
// SECTION: Hazard-rate Conversion
// ============================================================================

/// Converts a native 90-day probability to an arbitrary horizon via the
/// hazard-rate formula `P_h = 1 - (1 - P_90)^(h/90)`, clamped to `0.0` when
/// `p_90 <= 0` and `1.0` when `p_90 >= 1`.
#[must_use]
pub fn hazard_rate_conversion(p_90: f64, horizon_days: u32) -> f64 {
    if p_90 <= 0.0 {
        return 0.0;
    }
    if p_90 >= 1.0 {
        return 1.0;
    }
    let exponent = f64::from(horizon_days) / NATIVE_HORIZON_DAYS;
    1.0 - (1.0 - p_90).powf(exponent)
}

// ============================================================================
// SECTION: Nested Value Extraction
// ============================================================================

/// Traverses `doc` along a dotted path (`"a.b.c"`), returning the value at
/// the terminal key, or `None` if any segment is absent or not an object.
#[must_use]
pub fn extract_nested_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// ============================================================================
// SECTION: Probability Derivation
// ============================================================================

/// The outcome of deriving a probability from simulation artifacts: the
/// binary `P(YES)` value, plus free-form provenance for the resulting
/// forecast record.
#[derive(Debug, Clone, Default)]
pub struct DerivedProbability {
    /// `P(YES)` for the event's horizon.
    pub p_yes: f64,
    /// `true` if the derivation could not produce a live value and `p_yes`
    /// is a type-compatible placeholder (`0.5`).
    pub abstain: bool,
    /// Reason for abstaining, if `abstain` is `true`.
    pub abstain_reason: Option<String>,
    /// Free-text note describing how the value was derived, set only for
    /// `simulation_derived` sources.
    pub derivation_note: Option<String>,
}

/// Derives a binary `P(YES)` value for `event` at `horizon_days` from
/// `compiled_intel`, dispatching on the event's `forecast_source`.
///
/// `diagnostic_only` events never produce a value directly (they are
/// already excluded from [`oracle_catalog::get_forecastable_events`], so in
/// practice this function is never called for them). `baseline_persistence`
/// and `baseline_climatology` events also never produce a value here: they
/// are routed through `oracle-baseline`'s history index by
/// [`generate_forecasts`] before this function would otherwise be reached,
/// so the arms below exist only to keep the match exhaustive and abstain if
/// ever called directly.
#[must_use]
pub fn derive_probability_from_simulation(
    event: &EventDef,
    compiled_intel: &Value,
    horizon_days: u32,
) -> DerivedProbability {
    match &event.forecast_source {
        ForecastSource::DiagnosticOnly => DerivedProbability {
            p_yes: 0.0,
            abstain: true,
            abstain_reason: Some("diagnostic_only".to_string()),
            derivation_note: None,
        },
        ForecastSource::SimulationOutput { field_path } => {
            match extract_nested_value(compiled_intel, field_path).and_then(Value::as_f64) {
                Some(p_90) => DerivedProbability {
                    p_yes: hazard_rate_conversion(p_90, horizon_days),
                    abstain: false,
                    abstain_reason: None,
                    derivation_note: None,
                },
                None => DerivedProbability {
                    p_yes: 0.5,
                    abstain: true,
                    abstain_reason: Some(format!("missing_field:{field_path}")),
                    derivation_note: None,
                },
            }
        }
        ForecastSource::SimulationDerived { expression } => {
            match evaluate_derivation_expression(expression, compiled_intel) {
                Some(p_yes) => DerivedProbability {
                    p_yes,
                    abstain: false,
                    abstain_reason: None,
                    derivation_note: Some(expression.clone()),
                },
                None => DerivedProbability {
                    p_yes: 0.5,
                    abstain: false,
                    abstain_reason: None,
                    derivation_note: Some(format!("{expression} (parse failed, fell back to 0.5)")),
                },
            }
        }
        ForecastSource::BaselinePersistence | ForecastSource::BaselineClimatology => DerivedProbability {
            p_yes: 0.5,
            abstain: true,
            abstain_reason: Some("baseline_routed_separately".to_string()),
            derivation_note: None,
        },
    }
}

/// Parses and evaluates a derivation string of the shape
/// `"if X op Y then P(YES)=a else P(YES)=b"`, returning `None` on any parse
/// failure (the caller falls back to `0.5`).
fn evaluate_derivation_expression(expression: &str, compiled_intel: &Value) -> Option<f64> {
    let body = expression.trim().strip_prefix("if ")?;
    let (condition, rest) = body.split_once(" then ")?;
    let (then_clause, else_clause) = rest.split_once(" else ")?;

    let then_value = parse_p_yes_clause(then_clause)?;
    let else_value = parse_p_yes_clause(else_clause)?;

    let (field_path, op, literal) = parse_condition(condition)?;
    let extracted = extract_nested_value(compiled_intel, field_path)?;

    if evaluate_condition(extracted, op, literal) {
        Some(then_value)
    } else {
        Some(else_value)
    }
}

/// Parses a `"P(YES)=<number>"` clause into its numeric value.
fn parse_p_yes_clause(clause: &str) -> Option<f64> {
    clause.trim().strip_prefix("P(YES)=")?.trim().parse::<f64>().ok()
}

/// Splits a condition of the shape `"<path> <op> <literal>"` into its three
/// parts, trying the longest operators first so `>=`/`<=` are not mistaken
/// for `>`/`<`.
fn parse_condition(condition: &str) -> Option<(&str, &str, &str)> {
    const OPERATORS: [&str; 5] = [">=", "<=", "==", ">", "<"];
    for op in OPERATORS {
        if let Some(idx) = condition.find(op) {
            let field_path = condition[.. idx].trim();
            let literal = condition[idx + op.len() ..].trim();
            if !field_path.is_empty() && !literal.is_empty() {
                return Some((field_path, op, literal));
            }
        }
    }
    None
}

/// Evaluates `extracted <op> literal`, comparing numerically when both
/// sides parse as numbers, and falling back to case-sensitive string
/// equality for `==` otherwise.
fn evaluate_condition(extracted: &Value, op: &str, literal: &str) -> bool {
    let literal_trimmed = literal.trim_matches('"');
    if let (Some(lhs), Ok(rhs)) = (extracted.as_f64(), literal_trimmed.parse::<f64>()) {
        return match op {
            ">" => lhs > rhs,
            ">=" => lhs >= rhs,
            "<" => lhs < rhs,
            "<=" => lhs <= rhs,
            "==" => (lhs - rhs).abs() < f64::EPSILON,
            _ => false,
        };
    }
    if op == "==" {
        if let Some(lhs) = extracted.as_str() {
            return lhs == literal_trimmed;
        }
    }
    false
}

// ============================================================================
// SECTION: Distribution Assembly
// ============================================================================

/// Builds a two-outcome `{YES, NO}` distribution from a binary `P(YES)`
/// value.
#[must_use]
pub fn binary_distribution(p_yes: f64) -> BTreeMap<String, f64> {
    let mut dist = BTreeMap::new();
    dist.insert("YES".to_string(), p_yes);
    dist.insert("NO".to_string(), 1.0 - p_yes);
    dist
}

// ============================================================================
// SECTION: Forecast ID and Record Assembly
// ============================================================================

/// The base forecaster's stable identifier.
pub const BASE_FORECASTER_ID: &str = "oracle_v1";
/// The base forecaster's version tag.
pub const BASE_FORECASTER_VERSION: &str = "1.0";

/// Builds a base forecast's deterministic identifier:
/// `fcst_{as_of_date}_{run_id}_{event_id}_{horizon_days}d`. `as_of_date`
/// must already be the compact `YYYYMMDD` form (see
/// [`oracle_core::format_compact_date`]).
#[must_use]
pub fn generate_forecast_id(as_of_date: &str, run_id: &str, event_id: &str, horizon_days: u32) -> String {
    format!("fcst_{as_of_date}_{run_id}_{event_id}_{horizon_days}d")
}

/// Builds a non-base forecaster's deterministic identifier, folding the
/// forecaster id in so a baseline shadow forecast never collides with the
/// base forecaster's id for the same event, run, and horizon:
/// `fcst_{as_of_date}_{run_id}_{forecaster_id}_{event_id}_{horizon_days}d`.
/// `as_of_date` must already be the compact `YYYYMMDD` form.
#[must_use]
pub fn generate_forecaster_scoped_forecast_id(
    as_of_date: &str,
    run_id: &str,
    forecaster_id: &str,
    event_id: &str,
    horizon_days: u32,
) -> String {
    format!("fcst_{as_of_date}_{run_id}_{forecaster_id}_{event_id}_{horizon_days}d")
}

/// Assembles a complete [`ForecastRecord`] for a live (non-baseline)
/// forecaster, from a derived distribution and run provenance.
#[must_use]
#[allow(clippy::too_many_arguments, reason = "mirrors the original system's single assembly call")]
pub fn generate_forecast_record(
    event: &EventDef,
    horizon_days: u32,
    as_of_utc: time::OffsetDateTime,
    target_date_utc: time::OffsetDateTime,
    run: &RunInfo,
    manifest_id: &str,
    probabilities: BTreeMap<String, f64>,
    derived: &DerivedProbability,
) -> Result<ForecastRecord, ForecastError> {
    let as_of_str = oracle_core::format_utc(as_of_utc)?;
    let as_of_date = oracle_core::format_compact_date(as_of_utc);
    let forecast_id = generate_forecast_id(&as_of_date, &run.run_name, &event.event_id, horizon_days);

    Ok(ForecastRecord {
        forecast_id,
        event_id: event.event_id.clone(),
        horizon_days,
        as_of_utc: as_of_str,
        target_date_utc: oracle_core::format_utc(target_date_utc)?,
        run_id: run.run_name.clone(),
        manifest_id: manifest_id.to_string(),
        forecaster_id: BASE_FORECASTER_ID.to_string(),
        forecaster_version: BASE_FORECASTER_VERSION.to_string(),
        distribution_type: event.event_type,
        probabilities,
        abstain: derived.abstain,
        abstain_reason: derived.abstain_reason.clone(),
        seed: run.manifest.as_ref().and_then(|m| m.seed),
        n_sims: None,
        artifact_hashes: run.manifest.as_ref().map(|m| m.hashes.clone()).unwrap_or_default(),
        ensemble_inputs: None,
        baseline_metadata: None,
        derivation_note: derived.derivation_note.clone(),
    })
}

/// Assembles a baseline-sourced [`ForecastRecord`] (`oracle_baseline_climatology`
/// or `oracle_baseline_persistence`), carrying [`BaselineMetadata`]
/// provenance instead of run-derivation provenance.
#[must_use]
#[allow(clippy::too_many_arguments, reason = "mirrors the original system's single assembly call")]
pub fn generate_baseline_forecast_record(
    event: &EventDef,
    horizon_days: u32,
    as_of_utc: time::OffsetDateTime,
    target_date_utc: time::OffsetDateTime,
    run: &RunInfo,
    manifest_id: &str,
    baseline_kind: BaselineKind,
    probabilities: BTreeMap<String, f64>,
    baseline_metadata: BaselineMetadata,
) -> Result<ForecastRecord, ForecastError> {
    let as_of_str = oracle_core::format_utc(as_of_utc)?;
    let as_of_date = oracle_core::format_compact_date(as_of_utc);
    let forecaster_id = format!("oracle_baseline_{}", baseline_kind.as_str());
    let forecast_id = generate_forecaster_scoped_forecast_id(
        &as_of_date,
        &run.run_name,
        &forecaster_id,
        &event.event_id,
        horizon_days,
    );

    Ok(ForecastRecord {
        forecast_id,
        event_id: event.event_id.clone(),
        horizon_days,
        as_of_utc: as_of_str,
        target_date_utc: oracle_core::format_utc(target_date_utc)?,
        run_id: run.run_name.clone(),
        manifest_id: manifest_id.to_string(),
        forecaster_id,
        forecaster_version: BASE_FORECASTER_VERSION.to_string(),
        distribution_type: event.event_type,
        probabilities,
        abstain: false,
        abstain_reason: None,
        seed: None,
        n_sims: None,
        artifact_hashes: BTreeMap::new(),
        ensemble_inputs: None,
        baseline_metadata: Some(baseline_metadata),
        derivation_note: None,
    })
}

/// Which naive baseline a forecast record was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineKind {
    /// Dirichlet/Laplace-smoothed empirical frequency.
    Climatology,
    /// Stickiness-decayed blend of the last known outcome and climatology.
    Persistence,
}

impl BaselineKind {
    /// The forecaster-id suffix for this baseline kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Climatology => "climatology",
            Self::Persistence => "persistence",
        }
    }
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Config-format version stamped on every baseline forecast's
/// `baseline_metadata`, since [`BaselineConfig`] itself carries no version
/// field.
const BASELINE_CONFIG_VERSION: &str = "1.0";

/// Options controlling one [`generate_forecasts`] pass.
#[derive(Debug, Clone, Default)]
pub struct GenerateForecastsOptions {
    /// Explicit run directory name to forecast from; when `None`, the
    /// latest valid-and-reliable run is selected automatically.
    pub run_dir: Option<String>,
    /// Overrides every forecastable event's configured `horizons_days` with
    /// a single horizon.
    pub horizon_override: Option<u32>,
    /// When `true`, compute and return forecasts without appending them to
    /// the ledger.
    pub dry_run: bool,
}

/// The result of one [`generate_forecasts`] pass.
#[derive(Debug, Clone, Default)]
pub struct GeneratedForecasts {
    /// Forecast records generated (and, unless dry-run, appended).
    pub records: Vec<ForecastRecord>,
    /// One human-readable entry per (event, horizon) whose assembled
    /// distribution failed validation and was skipped rather than
    /// aborting the whole pass.
    pub warnings: Vec<String>,
}

/// Generates and (unless `options.dry_run`) appends one [`ForecastRecord`]
/// per forecastable event and horizon.
///
/// `simulation_output` and `simulation_derived` events are derived from the
/// selected run's compiled intelligence; `baseline_persistence` and
/// `baseline_climatology` events are derived instead from `baseline_config`
/// and the ledger's own resolution/correction history, via `oracle-baseline`.
/// A distribution that fails validation is recorded in the returned
/// [`GeneratedForecasts::warnings`] and skipped, rather than aborting the
/// whole pass.
///
/// # Errors
///
/// Returns [`ForecastError`] if no valid run can be selected, the compiled
/// intelligence document cannot be read, the baseline history index cannot
/// be built, or a ledger read/append fails.
pub fn generate_forecasts(
    catalog: &EventCatalog,
    runs_dir: &Path,
    ledger: &Ledger,
    as_of_utc: time::OffsetDateTime,
    baseline_config: &BaselineConfig,
    options: &GenerateForecastsOptions,
) -> Result<GeneratedForecasts, ForecastError> {
    let run = select_run(runs_dir, options.run_dir.as_deref())?;
    let manifest_path = runs_dir.join(&run.run_name).join("run_manifest.json");
    let manifest_id = oracle_ledger::compute_manifest_id(&manifest_path)?;

    let compiled_path = runs_dir.join(&run.run_name).join("compiled_intel.json");
    let compiled_intel = load_compiled_intel(&compiled_path)?;

    let resolutions = ledger.get_resolutions()?;
    let corrections = ledger.get_corrections()?;
    let history = oracle_baseline::build_history_index(&resolutions, &corrections, baseline_config, as_of_utc)?;

    let mut generated = GeneratedForecasts::default();
    for event in oracle_catalog::get_forecastable_events(catalog) {
        let horizons: Vec<u32> =
            options.horizon_override.map_or_else(|| event.horizons_days.clone(), |h| vec![h]);

        for horizon_days in horizons {
            let target_date_utc = as_of_utc + time::Duration::days(i64::from(horizon_days));

            let record = match &event.forecast_source {
                ForecastSource::BaselinePersistence | ForecastSource::BaselineClimatology => {
                    generate_baseline_sourced_record(
                        event,
                        horizon_days,
                        as_of_utc,
                        target_date_utc,
                        &run,
                        &manifest_id,
                        baseline_config,
                        &history,
                    )
                }
                ForecastSource::DiagnosticOnly
                | ForecastSource::SimulationOutput { .. }
                | ForecastSource::SimulationDerived { .. } => {
                    let derived = derive_probability_from_simulation(event, &compiled_intel, horizon_days);
                    let probabilities = binary_distribution(derived.p_yes);
                    validate_distribution(&event.event_id, &probabilities, &event.allowed_outcomes).and_then(
                        |()| {
                            generate_forecast_record(
                                event,
                                horizon_days,
                                as_of_utc,
                                target_date_utc,
                                &run,
                                &manifest_id,
                                probabilities,
                                &derived,
                            )
                        },
                    )
                }
            };

            match record {
                Ok(record) => {
                    if !options.dry_run {
                        ledger.append_forecast(&record)?;
                    }
                    generated.records.push(record);
                }
                Err(ForecastError::InvalidDistribution { event_id, reason }) => {
                    generated.warnings.push(format!(
                        "skipped {event_id} @ {horizon_days}d: {reason}"
                    ));
                }
                Err(other) => return Err(other),
            }
        }
    }

    Ok(generated)
}

/// Derives and assembles a [`ForecastRecord`] for a `baseline_persistence`
/// or `baseline_climatology` event, via `oracle-baseline`'s history index.
#[allow(clippy::too_many_arguments, reason = "mirrors generate_baseline_forecast_record's call shape")]
fn generate_baseline_sourced_record(
    event: &EventDef,
    horizon_days: u32,
    as_of_utc: time::OffsetDateTime,
    target_date_utc: time::OffsetDateTime,
    run: &RunInfo,
    manifest_id: &str,
    baseline_config: &BaselineConfig,
    history: &HistoryIndex,
) -> Result<ForecastRecord, ForecastError> {
    let event_config = oracle_baseline::get_event_config(baseline_config, &event.event_id);
    let group = history.get(&event.event_id, horizon_days);

    let kind = match &event.forecast_source {
        ForecastSource::BaselinePersistence => BaselineKind::Persistence,
        _ => BaselineKind::Climatology,
    };
    let distribution = match kind {
        BaselineKind::Persistence => {
            oracle_baseline::compute_persistence_distribution(group, &event.allowed_outcomes, &event_config)
        }
        BaselineKind::Climatology => {
            oracle_baseline::compute_climatology_distribution(group, &event.allowed_outcomes, &event_config)
        }
    };
    validate_distribution(&event.event_id, &distribution, &event.allowed_outcomes)?;

    let metadata = build_baseline_metadata(group, &event_config);
    generate_baseline_forecast_record(
        event,
        horizon_days,
        as_of_utc,
        target_date_utc,
        run,
        manifest_id,
        kind,
        distribution,
        metadata,
    )
}

/// Builds the provenance block stamped on every baseline forecast, from the
/// history group (if any) it was computed over.
fn build_baseline_metadata(
    group: Option<&HistoryGroup>,
    event_config: &oracle_baseline::BaselineEventConfig,
) -> BaselineMetadata {
    let history_n = group.map_or(0, |g| g.history_n);
    let fallback = if history_n < event_config.min_history_n { "uniform" } else { "none" };

    BaselineMetadata {
        baseline_history_n: history_n,
        baseline_fallback: fallback.to_string(),
        baseline_last_verified_at: group.and_then(|g| g.last_verified_at.clone()),
        baseline_staleness_days: group.and_then(|g| g.staleness_days),
        baseline_config_version: BASELINE_CONFIG_VERSION.to_string(),
        baseline_excluded_counts_by_reason: group
            .map(|g| g.excluded_counts_by_reason.clone())
            .unwrap_or_default(),
        baseline_resolution_modes: event_config.resolution_modes.clone(),
    }
}

/// Resolves the run to forecast from: the explicit override if given,
/// otherwise the latest valid-and-reliable run.
fn select_run(runs_dir: &Path, run_dir: Option<&str>) -> Result<RunInfo, ForecastError> {
    match run_dir {
        Some(name) => Ok(oracle_runs::get_run_info(runs_dir, name, oracle_runs::RunMode::Observe)),
        None => Ok(oracle_runs::find_latest_valid_run(runs_dir, oracle_runs::RunMode::Observe)?),
    }
}

/// Reads and parses a run's `compiled_intel.json`.
fn load_compiled_intel(path: &Path) -> Result<Value, ForecastError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ForecastError::CompiledIntel { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| ForecastError::CompiledIntelParse { path: path.display().to_string(), source })
}

// ============================================================================
// SECTION: Helper Path for the Reference Run Manifest Directory
// ============================================================================

/// The path to a run directory's `run_manifest.json` file, exposed for
/// callers that need to recompute a `manifest_id` outside of
/// [`generate_forecasts`] (e.g. the resolver).
#[must_use]
pub fn run_manifest_path(runs_dir: &Path, run_name: &str) -> PathBuf {
    runs_dir.join(run_name).join("run_manifest.json")
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
    fn hazard_rate_clamps_at_bounds() {
        assert_eq!(hazard_rate_conversion(0.0, 7), 0.0);
        assert_eq!(hazard_rate_conversion(1.0, 7), 1.0);
    }

    #[test]
    fn hazard_rate_reduces_probability_for_shorter_horizon() {
        let p90 = 0.5;
        let p7 = hazard_rate_conversion(p90, 7);
        assert!(p7 < p90);
        assert!(p7 > 0.0);
    }

    #[test]
    fn extract_nested_value_traverses_dotted_path() {
        let doc = serde_json::json!({"a": {"b": {"c": 42}}});
        let value = extract_nested_value(&doc, "a.b.c").unwrap();
        assert_eq!(value.as_i64(), Some(42));
    }

    #[test]
    fn extract_nested_value_missing_segment_is_none() {
        let doc = serde_json::json!({"a": {"b": 1}});
        assert!(extract_nested_value(&doc, "a.b.c").is_none());
    }

    #[test]
    fn validate_distribution_rejects_bad_sum() {
        let mut dist = BTreeMap::new();
        dist.insert("YES".to_string(), 0.6);
        dist.insert("NO".to_string(), 0.6);
        let err = validate_distribution(
            "evt",
            &dist,
            &["YES".to_string(), "NO".to_string()],
        );
        assert!(err.is_err());
    }

    #[test]
    fn validate_distribution_accepts_valid_binary() {
        let dist = binary_distribution(0.3);
        assert!(validate_distribution("evt", &dist, &["YES".to_string(), "NO".to_string()]).is_ok());
    }

    #[test]
    fn derivation_expression_numeric_threshold() {
        let compiled = serde_json::json!({"alert_level": 4});
        let p = evaluate_derivation_expression(
            "if alert_level >= 3 then P(YES)=0.8 else P(YES)=0.2",
            &compiled,
        );
        assert_eq!(p, Some(0.8));
    }

    #[test]
    fn derivation_expression_falls_back_on_missing_field() {
        let compiled = serde_json::json!({});
        let p = evaluate_derivation_expression(
            "if alert_level >= 3 then P(YES)=0.8 else P(YES)=0.2",
            &compiled,
        );
        assert!(p.is_none());
    }

    #[test]
    fn derivation_expression_string_equality() {
        let compiled = serde_json::json!({"regime": "crisis"});
        let p = evaluate_derivation_expression(
            "if regime == crisis then P(YES)=0.9 else P(YES)=0.1",
            &compiled,
        );
        assert_eq!(p, Some(0.9));
    }

    #[test]
    fn generate_forecast_id_has_expected_shape() {
        let id = generate_forecast_id("20260415", "RUN_20260415", "evt_a", 7);
        assert_eq!(id, "fcst_20260415_RUN_20260415_evt_a_7d");
    }
}
