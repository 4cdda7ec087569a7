// crates/oracle-reporter/src/json.rs
// ============================================================================
// Module: Scorecard JSON
// Description: Wraps a computed scorecard in its versioned JSON envelope.
// Purpose: Give every consumer of a scorecard a stable top-level shape
//          (`scorecard_version`, `generated_at_utc`, `scores`, `metadata`)
//          independent of however many fields `Scorecard` itself grows.
// Dependencies: oracle-core, oracle-scorer, serde, serde_json
// ============================================================================

use oracle_scorer::Scorecard;
use serde::Serialize;
use serde_json::Value;

use crate::error::ReporterError;

/// Stable version tag for the JSON scorecard envelope.
pub const SCORECARD_VERSION: &str = "1.0";

/// The filters a scorecard was computed under, echoed back in its
/// `metadata` block so a reader can tell a filtered scorecard from a full
/// one without re-deriving it from the surrounding command line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScorecardMetadata {
    /// `event_id` filter applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id_filter: Option<String>,
    /// `horizon_days` filter applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon_filter: Option<u32>,
    /// Resolution modes the primary accuracy figures were filtered to.
    pub mode_filter: Vec<String>,
}

/// The versioned JSON envelope every scorecard is reported in.
#[derive(Debug, Clone, Serialize)]
struct ScorecardEnvelope<'a> {
    /// [`SCORECARD_VERSION`].
    scorecard_version: &'static str,
    /// RFC 3339 timestamp the scorecard was generated at.
    generated_at_utc: String,
    /// The scorecard itself.
    scores: &'a Scorecard,
    /// Filters and other non-score context.
    metadata: &'a ScorecardMetadata,
}

/// Serializes `scorecard` into its versioned JSON envelope, as a
/// pretty-printed string.
///
/// # Errors
///
/// Returns [`ReporterError::Timestamp`] if `generated_at_utc` fails to
/// format, or [`ReporterError::Serialize`] if the envelope fails to
/// serialize.
pub fn generate_scorecard_json(
    scorecard: &Scorecard,
    metadata: &ScorecardMetadata,
    generated_at_utc: time::OffsetDateTime,
) -> Result<String, ReporterError> {
    let envelope = ScorecardEnvelope {
        scorecard_version: SCORECARD_VERSION,
        generated_at_utc: oracle_core::format_utc(generated_at_utc)?,
        scores: scorecard,
        metadata,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Serializes `scorecard` into the same envelope as [`generate_scorecard_json`]
/// but as a parsed [`serde_json::Value`], for callers that want to inspect
/// or further transform the document rather than write it as text.
///
/// # Errors
///
/// See [`generate_scorecard_json`].
pub fn scorecard_json_value(
    scorecard: &Scorecard,
    metadata: &ScorecardMetadata,
    generated_at_utc: time::OffsetDateTime,
) -> Result<Value, ReporterError> {
    let text = generate_scorecard_json(scorecard, metadata, generated_at_utc)?;
    Ok(serde_json::from_str(&text)?)
}
