// crates/oracle-reporter/src/error.rs
// ============================================================================
// Module: Reporter Errors
// Description: The single error type every report-writing operation can
//              fail with.
// Purpose: Let a failed write or a bad timestamp surface as a typed error
//          rather than a silently truncated report.
// Dependencies: oracle-core, serde_json, thiserror
// ============================================================================

/// Errors raised formatting or writing a scorecard or status report.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// A report file could not be written.
    #[error("reporter io error on {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A scorecard failed to serialize to JSON.
    #[error("failed to serialize scorecard: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A timestamp could not be formatted.
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
    /// A ledger read failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] oracle_ledger::LedgerError),
}
