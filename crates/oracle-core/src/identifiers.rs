// crates/oracle-core/src/identifiers.rs
// ============================================================================
// Module: Oracle Identifiers
// Description: Canonical opaque identifiers for catalog events, ledger records, and runs.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every identifier in the Oracle ledger is an opaque wrapper around a
//! `String`. None of them are normalized or validated at construction time;
//! callers that need format checking (e.g. `forecast_id` shape) do so at the
//! point of generation, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Macro
// ============================================================================

macro_rules! opaque_string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner `String`.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

opaque_string_id!(EventId, "Catalog event identifier.");
opaque_string_id!(RunId, "Upstream simulation run identifier (e.g. `RUN_20260415`).");
opaque_string_id!(ForecastId, "Content-addressed forecast record identifier.");
opaque_string_id!(ResolutionId, "Content-addressed resolution record identifier.");
opaque_string_id!(CorrectionId, "Correction record identifier.");
opaque_string_id!(EnsembleId, "Ensemble definition identifier (`oracle_ensemble_*`).");
opaque_string_id!(ForecasterId, "Forecaster identifier (`oracle_v1`, `oracle_baseline_*`, or an ensemble id).");
opaque_string_id!(BinId, "Bin identifier within a `BinSpec`.");

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
    fn round_trips_through_display_and_as_str() {
        let id = EventId::new("evt_cpi_surprise");
        assert_eq!(id.as_str(), "evt_cpi_surprise");
        assert_eq!(id.to_string(), "evt_cpi_surprise");
    }

    #[test]
    fn serializes_as_transparent_string() {
        let id = ForecastId::from("fcst_2026-04-15_RUN_20260415_evt_x_7d");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"fcst_2026-04-15_RUN_20260415_evt_x_7d\"");
    }
}
