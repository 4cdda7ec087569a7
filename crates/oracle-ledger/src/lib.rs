// crates/oracle-ledger/src/lib.rs
// ============================================================================
// Crate: oracle-ledger
// Description: Append-only JSONL forecast ledger with record types shared
//              across the forecasting, resolution, and scoring pipeline.
// Purpose: Durable storage for every forecast, resolution, and correction
//          ever logged, with advisory locking so concurrent writers never
//          interleave partial lines.
// Dependencies: oracle-core, fs2, serde, serde_json, thiserror, time
// ============================================================================

//! Append-only ledger storage for forecasts, resolutions, and corrections.
//!
//! Records are never rewritten in place. A correction is a new append that
//! references the resolution it supersedes by id; callers that need the
//! "current" outcome for a resolution should fold corrections in via
//! [`apply_corrections`] or [`Ledger::get_resolutions_with_corrections`].

mod ledger;
mod records;

pub use ledger::apply_corrections;
pub use ledger::compute_manifest_id;
pub use ledger::get_pending_manual_adjudication;
pub use ledger::AdjudicationStatus;
pub use ledger::Ledger;
pub use ledger::LedgerError;
pub use ledger::PendingAdjudication;
pub use ledger::DEFAULT_LEDGER_DIR;
pub use records::BaselineMetadata;
pub use records::CorrectionRecord;
pub use records::EnsembleInputs;
pub use records::ForecastRecord;
pub use records::LedgerRecord;
pub use records::ResolutionRecord;
