// crates/oracle-ledger/src/ledger.rs
// ============================================================================
// Module: Ledger
// Description: Append-only JSONL storage for forecasts, resolutions, and
//              corrections, with advisory exclusive locking per write.
// Purpose: Give every forecasting pass a durable, concurrency-safe record
//          of what was predicted and what actually happened.
// Dependencies: oracle-core, fs2, serde_json
// ============================================================================

//! ## Overview
//! Three files, one record type each: `forecasts.jsonl`, `resolutions.jsonl`,
//! `corrections.jsonl`. Records are appended, never rewritten in place; a
//! correction is itself a new line, linked back to the `resolution_id` it
//! supersedes. Concurrent writers serialize on an advisory exclusive lock
//! held only for the duration of a single append; reads never lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use fs2::FileExt;
use serde_json::Value;

use crate::records::CorrectionRecord;
use crate::records::ForecastRecord;
use crate::records::ResolutionRecord;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised reading or writing the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger file could not be opened or written.
    #[error("ledger io error on {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A record failed to serialize to canonical JSON.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A single JSONL line could not be parsed.
    #[error("malformed record at {path} line {line_no}: {source}")]
    MalformedRecord {
        /// Path of the ledger file the bad line was read from.
        path: String,
        /// 1-based line number of the offending record.
        line_no: usize,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// SECTION: Ledger Handle
// ============================================================================

/// Default directory, relative to a working root, holding the three ledger
/// files.
pub const DEFAULT_LEDGER_DIR: &str = "forecasting/ledger";

/// A handle onto the three ledger files under one directory.
#[derive(Debug, Clone)]
pub struct Ledger {
    dir: PathBuf,
}

impl Ledger {
    /// Opens a ledger rooted at `dir`. Does not create the directory; the
    /// first append creates it and any missing parents.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path to the forecasts JSONL file.
    #[must_use]
    pub fn forecasts_path(&self) -> PathBuf {
        self.dir.join("forecasts.jsonl")
    }

    /// Path to the resolutions JSONL file.
    #[must_use]
    pub fn resolutions_path(&self) -> PathBuf {
        self.dir.join("resolutions.jsonl")
    }

    /// Path to the corrections JSONL file.
    #[must_use]
    pub fn corrections_path(&self) -> PathBuf {
        self.dir.join("corrections.jsonl")
    }

    /// Appends a forecast record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be opened/locked/written,
    /// or the record cannot be serialized.
    pub fn append_forecast(&self, record: &ForecastRecord) -> Result<(), LedgerError> {
        append_line(&self.forecasts_path(), record)
    }

    /// Appends a resolution record.
    ///
    /// # Errors
    ///
    /// See [`Ledger::append_forecast`].
    pub fn append_resolution(&self, record: &ResolutionRecord) -> Result<(), LedgerError> {
        append_line(&self.resolutions_path(), record)
    }

    /// Appends a correction record.
    ///
    /// # Errors
    ///
    /// See [`Ledger::append_forecast`].
    pub fn append_correction(&self, record: &CorrectionRecord) -> Result<(), LedgerError> {
        append_line(&self.corrections_path(), record)
    }

    /// Reads and parses every forecast record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MalformedRecord`] for the first line that
    /// fails to parse as a [`ForecastRecord`].
    pub fn get_forecasts(&self) -> Result<Vec<ForecastRecord>, LedgerError> {
        read_records(&self.forecasts_path())
    }

    /// Reads and parses every resolution record.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_resolutions(&self) -> Result<Vec<ResolutionRecord>, LedgerError> {
        read_records(&self.resolutions_path())
    }

    /// Reads and parses every correction record.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_corrections(&self) -> Result<Vec<CorrectionRecord>, LedgerError> {
        read_records(&self.corrections_path())
    }

    /// Returns forecasts, optionally filtered by `event_id` and/or `run_id`.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_forecasts_filtered(
        &self,
        event_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<Vec<ForecastRecord>, LedgerError> {
        Ok(self
            .get_forecasts()?
            .into_iter()
            .filter(|f| event_id.is_none_or(|e| f.event_id == e))
            .filter(|f| run_id.is_none_or(|r| f.run_id == r))
            .collect())
    }

    /// Returns resolutions, optionally filtered by `event_id` and/or
    /// `forecast_id`.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_resolutions_filtered(
        &self,
        event_id: Option<&str>,
        forecast_id: Option<&str>,
    ) -> Result<Vec<ResolutionRecord>, LedgerError> {
        Ok(self
            .get_resolutions()?
            .into_iter()
            .filter(|r| event_id.is_none_or(|e| r.event_id == e))
            .filter(|r| forecast_id.is_none_or(|f| r.forecast_id == f))
            .collect())
    }

    /// Looks up a single forecast record by id.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_forecast_by_id(
        &self,
        forecast_id: &str,
    ) -> Result<Option<ForecastRecord>, LedgerError> {
        Ok(self.get_forecasts()?.into_iter().find(|f| f.forecast_id == forecast_id))
    }

    /// Looks up the resolution, if any, for a given `forecast_id`.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_resolution_by_forecast_id(
        &self,
        forecast_id: &str,
    ) -> Result<Option<ResolutionRecord>, LedgerError> {
        Ok(self.get_resolutions()?.into_iter().find(|r| r.forecast_id == forecast_id))
    }

    /// Returns forecasts whose `forecast_id` has no matching resolution.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_pending_forecasts(&self) -> Result<Vec<ForecastRecord>, LedgerError> {
        let forecasts = self.get_forecasts()?;
        let resolutions = self.get_resolutions()?;
        Ok(forecasts
            .into_iter()
            .filter(|f| !resolutions.iter().any(|r| r.forecast_id == f.forecast_id))
            .collect())
    }

    /// Applies corrections to a set of resolutions, returning each
    /// resolution with its `resolved_outcome` replaced by the latest
    /// correction (by `corrected_at_utc`) that targets it, if any.
    ///
    /// # Errors
    ///
    /// See [`Ledger::get_forecasts`].
    pub fn get_resolutions_with_corrections(&self) -> Result<Vec<ResolutionRecord>, LedgerError> {
        let resolutions = self.get_resolutions()?;
        let corrections = self.get_corrections()?;
        Ok(apply_corrections(resolutions, &corrections))
    }
}

/// Applies the latest correction (by `corrected_at_utc`, ties broken by
/// document order) per `resolution_id` onto a set of resolutions. The
/// original resolution record is never mutated in place in the ledger; this
/// produces an in-memory view with corrections folded in.
#[must_use]
pub fn apply_corrections(
    resolutions: Vec<ResolutionRecord>,
    corrections: &[CorrectionRecord],
) -> Vec<ResolutionRecord> {
    let mut latest: std::collections::HashMap<&str, &CorrectionRecord> =
        std::collections::HashMap::new();
    for correction in corrections {
        match latest.get(correction.resolution_id.as_str()) {
            Some(existing) if existing.corrected_at_utc >= correction.corrected_at_utc => {}
            _ => {
                latest.insert(correction.resolution_id.as_str(), correction);
            }
        }
    }

    resolutions
        .into_iter()
        .map(|mut r| {
            if let Some(correction) = latest.get(r.resolution_id.as_str()) {
                r.resolved_outcome = correction.corrected_outcome.clone();
            }
            r
        })
        .collect()
}

// ============================================================================
// SECTION: Manual Adjudication Queue
// ============================================================================

/// Urgency classification for an item awaiting manual resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjudicationStatus {
    /// Past its due date.
    Overdue,
    /// Due within 2 days.
    DueSoon,
    /// Not yet due.
    Pending,
}

impl AdjudicationStatus {
    /// The original system's stable string tag for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueSoon => "due_soon",
            Self::Pending => "pending",
        }
    }
}

/// One forecast awaiting manual adjudication, with computed due-date
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct PendingAdjudication {
    /// The forecast awaiting a manually-adjudicated resolution.
    pub forecast: ForecastRecord,
    /// `target_date_utc + grace_days`, as an RFC 3339 string.
    pub due_date_utc: String,
    /// Whole days overdue as of `now`; negative means not yet due.
    pub days_overdue: i64,
    /// Computed urgency bucket.
    pub status: AdjudicationStatus,
}

/// Filters `pending` to events requiring manual resolution whose
/// `target_date_utc` has already passed, and computes their adjudication
/// status relative to `now`, sorted most-overdue-first.
///
/// `requires_manual` should return `true` for event ids flagged
/// `requires_manual_resolution` in the catalog.
///
/// # Errors
///
/// Returns [`oracle_core::TimestampParseError`] if any `target_date_utc`
/// fails to parse.
pub fn get_pending_manual_adjudication(
    pending: &[ForecastRecord],
    requires_manual: impl Fn(&str) -> bool,
    grace_days: i64,
    now: time::OffsetDateTime,
) -> Result<Vec<PendingAdjudication>, oracle_core::TimestampParseError> {
    let mut out = Vec::new();
    for forecast in pending {
        if !requires_manual(&forecast.event_id) {
            continue;
        }
        let target = oracle_core::parse_utc(&forecast.target_date_utc)?;
        if target > now {
            continue;
        }
        let due = target + time::Duration::days(grace_days);
        let due_date_utc = oracle_core::format_utc(due)?;
        let days_overdue = (now - due).whole_days();
        let status = if days_overdue > 0 {
            AdjudicationStatus::Overdue
        } else if days_overdue >= -2 {
            AdjudicationStatus::DueSoon
        } else {
            AdjudicationStatus::Pending
        };
        out.push(PendingAdjudication {
            forecast: forecast.clone(),
            due_date_utc,
            days_overdue,
            status,
        });
    }
    out.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    Ok(out)
}

// ============================================================================
// SECTION: Manifest Hashing
// ============================================================================

/// Computes a `sha256:<hex>` identifier over a manifest file's raw bytes.
/// The manifest is treated as an opaque blob, not canonicalized JSON.
///
/// # Errors
///
/// Returns [`LedgerError::Io`] if the file cannot be read.
pub fn compute_manifest_id(path: &Path) -> Result<String, LedgerError> {
    let bytes = std::fs::read(path).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(oracle_core::hash_bytes_prefixed(&bytes))
}

// ============================================================================
// SECTION: Low-level Append/Read
// ============================================================================

/// Appends one canonical-JSON-sorted-keys line to `path`, under an advisory
/// exclusive lock held only for this single write.
fn append_line<T: serde::Serialize>(path: &Path, record: &T) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(|source| {
        LedgerError::Io { path: path.display().to_string(), source }
    })?;

    file.lock_exclusive().map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let result = (|| -> Result<(), LedgerError> {
        let value: Value = serde_json::to_value(record)?;
        let line = serde_json::to_string(&sort_value(&value))?;
        file.write_all(line.as_bytes()).map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        file.write_all(b"\n").map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        file.flush().map_err(|source| LedgerError::Io { path: path.display().to_string(), source })?;
        file.sync_all().map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    })();

    FileExt::unlock(&file).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;

    result
}

/// Recursively sorts a JSON value's object keys so every appended line is
/// canonically ordered, matching the on-disk contract in `SPEC_FULL.md`.
fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Reads and parses every line of `path` as `T`. Returns an empty vec,
/// rather than an error, if `path` does not exist yet.
fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).map_err(|source| LedgerError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LedgerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(&line).map_err(|source| {
            LedgerError::MalformedRecord {
                path: path.display().to_string(),
                line_no: idx + 1,
                source,
            }
        })?;
        out.push(record);
    }
    Ok(out)
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
    use std::collections::BTreeMap;

    use super::*;

    fn sample_forecast(event_id: &str, run_id: &str) -> ForecastRecord {
        let mut probabilities = BTreeMap::new();
        probabilities.insert("YES".to_string(), 0.6);
        probabilities.insert("NO".to_string(), 0.4);
        ForecastRecord {
            forecast_id: format!("fcst_{event_id}_{run_id}"),
            event_id: event_id.to_string(),
            horizon_days: 7,
            as_of_utc: "2026-04-15T00:00:00Z".to_string(),
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            run_id: run_id.to_string(),
            manifest_id: "sha256:abc".to_string(),
            forecaster_id: "oracle_v1".to_string(),
            forecaster_version: "1.0".to_string(),
            distribution_type: oracle_core::EventType::Binary,
            probabilities,
            abstain: false,
            abstain_reason: None,
            seed: None,
            n_sims: None,
            artifact_hashes: BTreeMap::new(),
            ensemble_inputs: None,
            baseline_metadata: None,
            derivation_note: None,
        }
    }

    fn sample_resolution(forecast_id: &str, event_id: &str) -> ResolutionRecord {
        ResolutionRecord {
            resolution_id: format!("res_{event_id}"),
            forecast_id: forecast_id.to_string(),
            event_id: event_id.to_string(),
            horizon_days: 7,
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            resolved_outcome: "YES".to_string(),
            resolved_value: None,
            resolved_at_utc: "2026-04-22T00:00:00Z".to_string(),
            resolution_mode: oracle_core::ResolutionMode::ExternalAuto,
            reason_code: None,
            unknown_reason: None,
            run_id: Some("RUN_20260422".to_string()),
            resolution_manifest_id: None,
            rule_applied: None,
            evidence_refs: Vec::new(),
            evidence_hashes: Vec::new(),
            resolved_by: "oracle_resolver_v2".to_string(),
        }
    }

    #[test]
    fn append_and_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        let forecast = sample_forecast("evt_a", "RUN_1");
        ledger.append_forecast(&forecast).unwrap();
        let forecasts = ledger.get_forecasts().unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0], forecast);
    }

    #[test]
    fn pending_forecasts_excludes_resolved() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        let fa = sample_forecast("evt_a", "RUN_1");
        let fb = sample_forecast("evt_b", "RUN_1");
        ledger.append_forecast(&fa).unwrap();
        ledger.append_forecast(&fb).unwrap();
        ledger.append_resolution(&sample_resolution(&fa.forecast_id, "evt_a")).unwrap();

        let pending = ledger.get_pending_forecasts().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_id, "evt_b");
    }

    #[test]
    fn missing_ledger_files_read_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        assert!(ledger.get_forecasts().unwrap().is_empty());
        assert!(ledger.get_resolutions().unwrap().is_empty());
    }

    #[test]
    fn malformed_line_is_reported_with_line_number() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("forecasts.jsonl");
        std::fs::write(&path, "{\"not\":\"a forecast\"}\n").unwrap();
        let ledger = Ledger::new(tmp.path());
        let err = ledger.get_forecasts().unwrap_err();
        match err {
            LedgerError::MalformedRecord { line_no, .. } => assert_eq!(line_no, 1),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn manifest_id_is_stable_sha256_prefixed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run_manifest.json");
        std::fs::write(&path, b"{\"run_id\":\"RUN_1\"}").unwrap();
        let id = compute_manifest_id(&path).unwrap();
        assert!(id.starts_with("sha256:"));
        let id_again = compute_manifest_id(&path).unwrap();
        assert_eq!(id, id_again);
    }

    #[test]
    fn manual_adjudication_status_buckets() {
        let forecast = sample_forecast("evt_manual", "RUN_1");
        let now = oracle_core::parse_utc("2026-04-25T00:00:00Z").unwrap();
        let queue =
            get_pending_manual_adjudication(&[forecast], |_| true, 2, now).unwrap();
        assert_eq!(queue.len(), 1);
        // target 2026-04-22 + 2 grace days = due 2026-04-24, now is 2026-04-25 -> overdue
        assert_eq!(queue[0].status, AdjudicationStatus::Overdue);
    }

    #[test]
    fn future_target_date_excluded_from_manual_queue() {
        let forecast = sample_forecast("evt_manual", "RUN_1");
        let now = oracle_core::parse_utc("2026-04-10T00:00:00Z").unwrap();
        let queue = get_pending_manual_adjudication(&[forecast], |_| true, 2, now).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn latest_correction_by_timestamp_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        let forecast = sample_forecast("evt_a", "RUN_1");
        let resolution = sample_resolution(&forecast.forecast_id, "evt_a");
        ledger.append_resolution(&resolution).unwrap();
        ledger
            .append_correction(&CorrectionRecord {
                correction_id: "corr_1".to_string(),
                resolution_id: resolution.resolution_id.clone(),
                corrected_outcome: "NO".to_string(),
                corrected_at_utc: "2026-04-23T00:00:00Z".to_string(),
                reason: None,
            })
            .unwrap();
        ledger
            .append_correction(&CorrectionRecord {
                correction_id: "corr_2".to_string(),
                resolution_id: resolution.resolution_id.clone(),
                corrected_outcome: "YES".to_string(),
                corrected_at_utc: "2026-04-24T00:00:00Z".to_string(),
                reason: None,
            })
            .unwrap();

        let corrected = ledger.get_resolutions_with_corrections().unwrap();
        assert_eq!(corrected[0].resolved_outcome, "YES");
    }

    #[test]
    fn filtered_queries_narrow_by_event_and_run() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path());
        ledger.append_forecast(&sample_forecast("evt_a", "RUN_1")).unwrap();
        ledger.append_forecast(&sample_forecast("evt_b", "RUN_2")).unwrap();

        let only_a = ledger.get_forecasts_filtered(Some("evt_a"), None).unwrap();
        assert_eq!(only_a.len(), 1);
        let only_run2 = ledger.get_forecasts_filtered(None, Some("RUN_2")).unwrap();
        assert_eq!(only_run2.len(), 1);
        assert_eq!(only_run2[0].event_id, "evt_b");
    }
}
