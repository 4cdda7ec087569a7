// crates/oracle-core/src/domain.rs
// ============================================================================
// Module: Oracle Domain Vocabulary
// Description: Shared enums used across catalog, ledger, and scoring crates.
// Purpose: Give every crate in the workspace one definition of event types,
//          resolution modes, and the `UNKNOWN` outcome sentinel.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These types carry no behavior; they exist so `oracle-catalog`,
//! `oracle-ledger`, `oracle-resolver`, and `oracle-scorer` agree on the same
//! wire representation without depending on each other.

use serde::Deserialize;
use serde::Serialize;

/// The distinguished outcome value meaning "could not be determined".
pub const UNKNOWN_OUTCOME: &str = "UNKNOWN";

/// Catalog event type, determining the shape of `allowed_outcomes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Two-outcome event (`YES`/`NO`, with implicit `UNKNOWN`).
    Binary,
    /// Multi-outcome event over an enumerated label set.
    Categorical,
    /// Multi-outcome event over a numeric domain partitioned into bins.
    BinnedContinuous,
    /// Tracked for internal diagnostics only; never forecasted live.
    DiagnosticOnly,
}

/// The upstream data source a forecast's probability is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSourceType {
    /// Diagnostic-only event; never produces a live forecast.
    DiagnosticOnly,
    /// Read directly from a simulation run's compiled output.
    SimulationOutput,
    /// Derived via a conditional expression over simulation fields.
    SimulationDerived,
    /// Stickiness-decayed persistence of the last known outcome.
    BaselinePersistence,
    /// Dirichlet/Laplace-smoothed empirical frequency.
    BaselineClimatology,
}

/// How a resolution's outcome was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Automatically resolved from compiled intelligence.
    ExternalAuto,
    /// Manually adjudicated by an analyst.
    ExternalManual,
    /// Inferred from unstructured claims data as a fallback.
    ClaimsInferred,
}

impl ResolutionMode {
    /// The default mode assumed for resolution records predating explicit
    /// mode tagging, preserved for backward compatibility.
    #[must_use]
    pub const fn default_for_untagged_record() -> Self {
        Self::ExternalAuto
    }
}

/// Staleness decay shape used by the persistence baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessDecay {
    /// Stickiness decays linearly to zero at `max_staleness_days`.
    Linear,
    /// Stickiness decays exponentially with a half-life of
    /// `max_staleness_days / 2`.
    Exponential,
}

impl Default for StalenessDecay {
    fn default() -> Self {
        Self::Linear
    }
}
