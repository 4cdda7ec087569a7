// crates/oracle-core/src/time.rs
// ============================================================================
// Module: Oracle Time Model
// Description: RFC 3339 timestamp parsing/formatting shared across ledger records.
// Purpose: Give every `*_utc` field a single, deterministic parse/format path.
// Dependencies: time
// ============================================================================

//! ## Overview
//! All `*_utc` fields in catalog, ledger, and evidence records are RFC 3339
//! strings. This module is the single place that turns them into
//! `time::OffsetDateTime` and back, so that lookahead comparisons
//! (`resolved_at_utc <= as_of_utc`) are never done on raw strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error returned when a timestamp string cannot be parsed as RFC 3339.
#[derive(Debug, thiserror::Error)]
#[error("invalid RFC 3339 timestamp: {raw}")]
pub struct TimestampParseError {
    /// The original, unparsable string.
    pub raw: String,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an RFC 3339 timestamp string into an [`OffsetDateTime`].
///
/// Accepts both `Z` and explicit offset suffixes, matching the original
/// system's `datetime.fromisoformat(s.replace('Z', '+00:00'))` behavior.
///
/// # Errors
///
/// Returns [`TimestampParseError`] if `raw` is not a valid RFC 3339 string.
pub fn parse_utc(raw: &str) -> Result<OffsetDateTime, TimestampParseError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| TimestampParseError {
        raw: raw.to_string(),
    })
}

/// Formats an [`OffsetDateTime`] as an RFC 3339 string with a `Z` suffix for
/// UTC, matching `datetime.isoformat()` output from the original system.
///
/// # Errors
///
/// Returns [`TimestampParseError`] if formatting fails (practically
/// unreachable for valid `OffsetDateTime` values, but kept fallible to avoid
/// `unwrap` at call sites).
pub fn format_utc(value: OffsetDateTime) -> Result<String, TimestampParseError> {
    value.format(&Rfc3339).map_err(|_| TimestampParseError {
        raw: format!("{value:?}"),
    })
}

/// Formats an [`OffsetDateTime`]'s calendar date as compact `YYYYMMDD`, the
/// date form every deterministic forecast/resolution id embeds. Unlike the
/// full RFC 3339 string, this never contains characters (`:`, `T`, `Z`) that
/// are unsafe in a filename.
#[must_use]
pub fn format_compact_date(value: OffsetDateTime) -> String {
    format!("{:04}{:02}{:02}", value.year(), u8::from(value.month()), value.day())
}

/// Returns `true` if `resolved_at` is strictly after `as_of`, i.e. whether
/// including it in a history computation at `as_of` would violate the
/// no-lookahead invariant.
#[must_use]
pub fn is_lookahead(resolved_at: OffsetDateTime, as_of: OffsetDateTime) -> bool {
    resolved_at > as_of
}

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
    fn parses_zulu_suffix() {
        let parsed = parse_utc("2026-04-15T12:00:00Z").unwrap();
        assert_eq!(parsed.year(), 2026);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc("not-a-date").is_err());
    }

    #[test]
    fn compact_date_strips_separators() {
        let parsed = parse_utc("2026-04-22T00:00:00Z").unwrap();
        assert_eq!(format_compact_date(parsed), "20260422");
    }

    #[test]
    fn lookahead_detects_future_resolution() {
        let as_of = parse_utc("2026-04-15T00:00:00Z").unwrap();
        let future = parse_utc("2026-04-16T00:00:00Z").unwrap();
        let past = parse_utc("2026-04-14T00:00:00Z").unwrap();
        assert!(is_lookahead(future, as_of));
        assert!(!is_lookahead(past, as_of));
        assert!(!is_lookahead(as_of, as_of));
    }
}
