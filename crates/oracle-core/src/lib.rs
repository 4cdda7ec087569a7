// crates/oracle-core/src/lib.rs
// ============================================================================
// Module: Oracle Core
// Description: Shared identifiers, timestamps, canonical hashing, and domain
//              vocabulary used across every Oracle forecasting crate.
// Purpose: Give catalog, ledger, baseline, forecast, resolver, and scorer
//          crates one definition of the primitives they all depend on.
// Dependencies: serde, serde_jcs, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! `oracle-core` has no forecasting logic of its own. It is the seam every
//! other crate in this workspace depends on for identifiers, canonical
//! hashing, and timestamp handling, so that a `forecast_id` computed in
//! `oracle-forecast` and a `forecast_id` read back in `oracle-scorer` are
//! guaranteed to be the same type.

pub mod domain;
pub mod hashing;
pub mod identifiers;
pub mod time;

pub use domain::EventType;
pub use domain::ForecastSourceType;
pub use domain::ResolutionMode;
pub use domain::StalenessDecay;
pub use domain::UNKNOWN_OUTCOME;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_bytes;
pub use hashing::hash_bytes_prefixed;
pub use hashing::hash_canonical_json;
pub use identifiers::BinId;
pub use identifiers::CorrectionId;
pub use identifiers::EnsembleId;
pub use identifiers::EventId;
pub use identifiers::ForecastId;
pub use identifiers::ForecasterId;
pub use identifiers::ResolutionId;
pub use identifiers::RunId;
pub use time::TimestampParseError;
pub use time::format_compact_date;
pub use time::format_utc;
pub use time::is_lookahead;
pub use time::parse_utc;
