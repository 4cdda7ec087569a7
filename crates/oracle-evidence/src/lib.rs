// crates/oracle-evidence/src/lib.rs
// ============================================================================
// Module: Oracle Evidence
// Description: Immutable, content-hashed per-resolution evidence snapshots.
// Purpose: Give every `external_auto` resolution a reproducible, atomically
//          written record of exactly what data justified its outcome.
// Dependencies: oracle-core, serde, serde_json, time
// ============================================================================

//! ## Overview
//! A resolution's evidence snapshot is a small canonical JSON document
//! written once, named `<resolution_id>.json`, and never edited afterward.
//! Writing is atomic (temp file + rename) and the reported hash covers the
//! exact bytes on disk, so [`verify_evidence_hash`] can always rehash and
//! compare without ambiguity about formatting.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Default directory, relative to a working root, holding evidence snapshots.
pub const DEFAULT_EVIDENCE_DIR: &str = "forecasting/evidence";

/// Errors raised writing, reading, or verifying an evidence snapshot.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    /// The evidence file or its temp sibling could not be read or written.
    #[error("evidence io error on {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot payload failed to serialize to JSON.
    #[error("failed to serialize evidence snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The evidence snapshot file does not exist.
    #[error("no evidence snapshot found for resolution_id {0}")]
    NotFound(String),
    /// The `snapshot_utc` timestamp could not be formatted.
    #[error("failed to format snapshot timestamp: {0}")]
    Timestamp(#[from] oracle_core::TimestampParseError),
}

/// A single resolution's immutable evidence snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    /// The resolution this snapshot justifies.
    pub resolution_id: String,
    /// The run the resolving data was read from.
    pub run_id: String,
    /// The data-cutoff timestamp of the resolving run, if declared.
    #[serde(default)]
    pub data_cutoff_utc: Option<String>,
    /// The dotted path (or `compiled_fields` key) the value was read from.
    pub path_used: String,
    /// The raw extracted value, as JSON (number, string, bool, or null).
    pub extracted_value: Value,
    /// A human-readable description of the rule applied to `extracted_value`.
    pub rule_applied: String,
    /// RFC 3339 timestamp the snapshot was written at, stamped by
    /// [`write_snapshot`] rather than supplied by the caller.
    pub snapshot_utc: String,
}

/// Ensures the evidence directory exists, creating it (and parents) if not.
///
/// # Errors
///
/// Returns [`EvidenceError::Io`] if the directory cannot be created.
pub fn ensure_evidence_dir(dir: &Path) -> Result<(), EvidenceError> {
    fs::create_dir_all(dir).map_err(|source| EvidenceError::Io {
        path: dir.display().to_string(),
        source,
    })
}

/// The on-disk path an evidence snapshot for `resolution_id` would live at.
#[must_use]
pub fn snapshot_path(dir: &Path, resolution_id: &str) -> PathBuf {
    dir.join(format!("{resolution_id}.json"))
}

/// Writes an evidence snapshot, stamping `snapshot_utc` to `now`, and
/// returns its on-disk path and `sha256:<hex>` content hash.
///
/// Serialization uses sorted keys (via `serde_json::Value`'s `BTreeMap`
/// backing) and 2-space indentation so the hash is reproducible across
/// runs. The write is atomic: content is written to a `.tmp` sibling first,
/// then renamed into place; the temp file is removed on any failure.
///
/// # Errors
///
/// Returns [`EvidenceError::Io`] if the directory cannot be prepared or the
/// file cannot be written/renamed, or [`EvidenceError::Serialize`] if the
/// snapshot fails to serialize.
pub fn write_snapshot(
    dir: &Path,
    resolution_id: &str,
    mut snapshot: EvidenceSnapshot,
    now: time::OffsetDateTime,
) -> Result<(PathBuf, String), EvidenceError> {
    ensure_evidence_dir(dir)?;
    snapshot.snapshot_utc = oracle_core::format_utc(now)?;

    let canonical: Value = serde_json::to_value(&snapshot)?;
    let bytes = serde_json::to_vec_pretty(&sort_value(&canonical))?;
    let hash = oracle_core::hash_bytes_prefixed(&bytes);

    let final_path = snapshot_path(dir, resolution_id);
    let tmp_path = dir.join(format!("{resolution_id}.json.tmp"));

    let write_result = fs::write(&tmp_path, &bytes).map_err(|source| EvidenceError::Io {
        path: tmp_path.display().to_string(),
        source,
    });
    if let Err(err) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Err(source) = fs::rename(&tmp_path, &final_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(EvidenceError::Io { path: final_path.display().to_string(), source });
    }

    Ok((final_path, hash))
}

/// Reads a previously written evidence snapshot back from disk.
///
/// # Errors
///
/// Returns [`EvidenceError::NotFound`] if no snapshot exists for
/// `resolution_id`, or [`EvidenceError::Serialize`] if the file on disk is
/// not valid JSON (corruption is never silently tolerated).
pub fn read_evidence_snapshot(
    dir: &Path,
    resolution_id: &str,
) -> Result<EvidenceSnapshot, EvidenceError> {
    let path = snapshot_path(dir, resolution_id);
    if !path.exists() {
        return Err(EvidenceError::NotFound(resolution_id.to_string()));
    }
    let bytes = fs::read(&path)
        .map_err(|source| EvidenceError::Io { path: path.display().to_string(), source })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Rehashes the on-disk evidence file for `resolution_id` and compares it to
/// `expected_hash` (a `sha256:<hex>` string).
///
/// Returns `Ok(false)` (not an error) when the file exists but the hash
/// differs, since a hash mismatch is a data-integrity finding, not an I/O
/// failure.
///
/// # Errors
///
/// Returns [`EvidenceError::NotFound`] if no snapshot file exists for
/// `resolution_id`.
pub fn verify_evidence_hash(
    dir: &Path,
    resolution_id: &str,
    expected_hash: &str,
) -> Result<bool, EvidenceError> {
    let path = snapshot_path(dir, resolution_id);
    if !path.exists() {
        return Err(EvidenceError::NotFound(resolution_id.to_string()));
    }
    let bytes = fs::read(&path)
        .map_err(|source| EvidenceError::Io { path: path.display().to_string(), source })?;
    Ok(oracle_core::hash_bytes_prefixed(&bytes) == expected_hash)
}

/// Lists the resolution-id stems of every evidence snapshot file present in
/// `dir`, sorted ascending. Returns an empty list if `dir` does not exist.
///
/// # Errors
///
/// Returns [`EvidenceError::Io`] if `dir` exists but cannot be read.
pub fn list_evidence_files(dir: &Path) -> Result<Vec<String>, EvidenceError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for entry in
        fs::read_dir(dir).map_err(|source| EvidenceError::Io { path: dir.display().to_string(), source })?
    {
        let entry = entry.map_err(|source| EvidenceError::Io { path: dir.display().to_string(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            ids.push(stem.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

/// Recursively sorts a JSON value's object keys, so repeated serialization
/// of logically-equal documents produces byte-identical output.
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

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    fn sample(resolution_id: &str) -> EvidenceSnapshot {
        EvidenceSnapshot {
            resolution_id: resolution_id.to_string(),
            run_id: "RUN_20260415".to_string(),
            data_cutoff_utc: Some("2026-04-15T00:00:00Z".to_string()),
            path_used: "compiled_fields.current_state.rial_usd_rate.market".to_string(),
            extracted_value: serde_json::json!(1_250_000),
            rule_applied: "threshold_gte:1200000".to_string(),
            snapshot_utc: String::new(),
        }
    }

    #[test]
    fn write_then_verify_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let now = oracle_core::parse_utc("2026-04-22T00:00:00Z").unwrap();
        let (path, hash) = write_snapshot(tmp.path(), "res_1", sample("res_1"), now).unwrap();
        assert!(path.exists());
        assert!(hash.starts_with("sha256:"));
        assert!(verify_evidence_hash(tmp.path(), "res_1", &hash).unwrap());
    }

    #[test]
    fn verify_detects_tamper() {
        let tmp = tempfile::tempdir().unwrap();
        let now = oracle_core::parse_utc("2026-04-22T00:00:00Z").unwrap();
        let (path, hash) = write_snapshot(tmp.path(), "res_1", sample("res_1"), now).unwrap();
        fs::write(&path, b"{}").unwrap();
        assert!(!verify_evidence_hash(tmp.path(), "res_1", &hash).unwrap());
    }

    #[test]
    fn read_missing_snapshot_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_evidence_snapshot(tmp.path(), "res_missing").unwrap_err();
        assert!(matches!(err, EvidenceError::NotFound(_)));
    }

    #[test]
    fn list_evidence_files_sorted_stems() {
        let tmp = tempfile::tempdir().unwrap();
        let now = oracle_core::parse_utc("2026-04-22T00:00:00Z").unwrap();
        write_snapshot(tmp.path(), "res_b", sample("res_b"), now).unwrap();
        write_snapshot(tmp.path(), "res_a", sample("res_a"), now).unwrap();
        let ids = list_evidence_files(tmp.path()).unwrap();
        assert_eq!(ids, vec!["res_a".to_string(), "res_b".to_string()]);
    }

    #[test]
    fn empty_directory_lists_no_files() {
        let tmp = tempfile::tempdir().unwrap();
        let missing_dir = tmp.path().join("does_not_exist");
        assert!(list_evidence_files(&missing_dir).unwrap().is_empty());
    }
}
