// crates/oracle-scorer/src/error.rs
// ============================================================================
// Module: Scorer Errors
// Description: The single error type every scoring operation can fail with.
// Purpose: Let a missing-data condition surface as a typed error rather than
//          a silently wrong number, while keeping the error set small enough
//          that `compute_scores` can skip one metric without aborting the
//          whole pass.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, thiserror
// ============================================================================

/// Errors raised computing a score, a baseline, or a calibration table.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    /// A forecast's `probabilities` map was missing an entry for one of the
    /// event's catalog-declared outcomes.
    #[error("forecast {forecast_id} is missing a probability for outcome {outcome}")]
    MissingOutcomeProbability {
        /// The forecast record missing the entry.
        forecast_id: String,
        /// The catalog outcome it should have carried a probability for.
        outcome: String,
    },
    /// An `*_utc` timestamp on a ledger record could not be parsed.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
    /// Building a history index over past resolutions failed.
    #[error("baseline error: {0}")]
    Baseline(#[from] oracle_baseline::BaselineError),
    /// A ledger read failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
    /// The requested event id is not present in the catalog.
    #[error("catalog error: {0}")]
    Catalog(#[from] oracle_catalog::CatalogError),
}
