// crates/oracle-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: The single error type every subcommand handler can fail with.
// Purpose: Compose each component crate's typed error as one variant rather
//          than flattening them into untyped strings, so `main` still prints
//          a message backed by a real `source` chain.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, oracle-ensemble,
//               oracle-evidence, oracle-forecast, oracle-ledger,
//               oracle-reporter, oracle-resolver, oracle-runs, oracle-scorer,
//               serde_json, thiserror
// ============================================================================

/// Errors a subcommand handler can return, composed from every component
/// crate's own error type rather than flattened into a single string.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read or written directly by the CLI (e.g. an
    /// explicit `--output` path).
    #[error("io error on {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A value failed to serialize to JSON.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The catalog could not be loaded or a lookup against it failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] oracle_catalog::CatalogError),
    /// A ledger read or append failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
    /// Forecast generation failed.
    #[error("forecast error: {0}")]
    Forecast(#[from] oracle_forecast::ForecastError),
    /// The baseline engine failed to build a history index or load its
    /// config.
    #[error("baseline error: {0}")]
    Baseline(#[from] oracle_baseline::BaselineError),
    /// Ensemble combination failed.
    #[error("ensemble error: {0}")]
    Ensemble(#[from] oracle_ensemble::EnsembleError),
    /// Resolution failed.
    #[error("resolution error: {0}")]
    Resolution(#[from] oracle_resolver::ResolutionError),
    /// Run selection failed.
    #[error("run selection failed: {0}")]
    RunSelection(#[from] oracle_runs::RunSelectorError),
    /// Evidence read/write failed.
    #[error("evidence error: {0}")]
    Evidence(#[from] oracle_evidence::EvidenceError),
    /// Scoring failed.
    #[error("scorer error: {0}")]
    Scorer(#[from] oracle_scorer::ScorerError),
    /// Report rendering or writing failed.
    #[error("reporter error: {0}")]
    Reporter(#[from] oracle_reporter::ReporterError),
    /// A timestamp failed to parse or format.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
    /// An argument combination clap cannot express was invalid at runtime.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Result alias for every subcommand handler.
pub type CliResult<T> = Result<T, CliError>;
