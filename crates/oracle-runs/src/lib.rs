// crates/oracle-runs/src/lib.rs
// ============================================================================
// Module: Oracle Run Selector
// Description: Discover, filter, and order upstream simulation run folders.
// Purpose: Let the forecast generator and resolver find the right input run
//          without ever constructing a path by hand.
// Dependencies: oracle-core, serde, serde_json, time
// ============================================================================

//! ## Overview
//! A run folder's name encodes its date (`RUN_YYYYMMDD[_...]`), so a plain
//! descending lexicographic sort over folder names is also a descending
//! chronological sort. This module never writes to a run directory; it only
//! reads `run_manifest.json` and checks for the presence of sibling
//! artifact files.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Folder name reserved for process-level metadata, never a real run.
pub const RESERVED_META_DIR: &str = "_meta";
/// Prefix marking a run folder as test fixture data, excluded by default.
pub const TEST_RUN_PREFIX: &str = "TEST_";

/// Which artifact set a run must satisfy to be considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Read-only inspection of real-world state; the only mode this
    /// subsystem's forecaster and resolver actually exercise.
    Observe,
    /// Full Monte Carlo simulation artifact set, exercised by the upstream
    /// pipeline this subsystem never drives directly but must still be able
    /// to validate runs for.
    Simulate,
}

impl RunMode {
    /// The artifact filenames a run directory must contain to be valid for
    /// this mode.
    #[must_use]
    pub const fn required_artifacts(self) -> &'static [&'static str] {
        match self {
            Self::Observe => &["run_manifest.json", "compiled_intel.json", "coverage_report.json"],
            Self::Simulate => &[
                "run_manifest.json",
                "compiled_intel.json",
                "coverage_report.json",
                "priors_resolved.json",
                "simulation_results.json",
            ],
        }
    }
}

/// Fields of `run_manifest.json` this crate reads.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RunManifest {
    /// Run identifier, normally matching the folder name.
    #[serde(default)]
    pub run_id: Option<String>,
    /// The data cutoff timestamp, RFC 3339.
    #[serde(default)]
    pub data_cutoff_utc: Option<String>,
    /// Random seed used for the upstream simulation, if any.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Whether this run's outputs are reliable enough to forecast or
    /// resolve from. Absent is treated as `true`.
    #[serde(default)]
    pub run_reliable: Option<bool>,
    /// Free-text reason when `run_reliable` is `false`.
    #[serde(default)]
    pub unreliable_reason: Option<String>,
    /// Content hashes of this run's artifact files, keyed by filename.
    #[serde(default)]
    pub hashes: std::collections::BTreeMap<String, String>,
}

/// Errors raised discovering or inspecting run directories.
#[derive(Debug, thiserror::Error)]
pub enum RunSelectorError {
    /// The runs root directory could not be listed.
    #[error("failed to list runs directory {path}: {source}")]
    Io {
        /// Path the failing operation targeted.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// No run in the directory satisfied the validity and reliability
    /// requirements.
    #[error("no valid and reliable run found under {0}")]
    NoValidRun(String),
}

/// One run directory's reliability verdict.
#[derive(Debug, Clone)]
pub struct Reliability {
    /// `true` unless the manifest explicitly says otherwise.
    pub reliable: bool,
    /// The manifest's stated reason, if unreliable or unreadable.
    pub reason: Option<String>,
}

/// Lists run folder names under `runs_dir`, excluding [`RESERVED_META_DIR`]
/// and (unless `include_test_runs`) anything prefixed [`TEST_RUN_PREFIX`],
/// sorted descending (newest first, since names encode date).
///
/// # Errors
///
/// Returns [`RunSelectorError::Io`] if `runs_dir` cannot be read.
pub fn list_runs_sorted(
    runs_dir: &Path,
    include_test_runs: bool,
) -> Result<Vec<String>, RunSelectorError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(runs_dir)
        .map_err(|source| RunSelectorError::Io { path: runs_dir.display().to_string(), source })?
    {
        let entry = entry
            .map_err(|source| RunSelectorError::Io { path: runs_dir.display().to_string(), source })?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name == RESERVED_META_DIR {
            continue;
        }
        if !include_test_runs && name.starts_with(TEST_RUN_PREFIX) {
            continue;
        }
        names.push(name);
    }
    names.sort_by(|a, b| b.cmp(a));
    Ok(names)
}

/// Returns `true` iff every artifact `mode` requires is present under
/// `runs_dir/run_name`.
#[must_use]
pub fn check_artifacts_exist(runs_dir: &Path, run_name: &str, mode: RunMode) -> bool {
    let run_dir = runs_dir.join(run_name);
    mode.required_artifacts().iter().all(|artifact| run_dir.join(artifact).is_file())
}

/// Loads a run's manifest, if present. Returns `Ok(None)` (not an error) if
/// `run_manifest.json` does not exist, matching the original system's
/// "absent manifest means reliable" default.
///
/// # Errors
///
/// Returns [`RunSelectorError::Io`] if the manifest exists but cannot be
/// read or parsed.
pub fn load_run_manifest(
    runs_dir: &Path,
    run_name: &str,
) -> Result<Option<RunManifest>, RunSelectorError> {
    let manifest_path = runs_dir.join(run_name).join("run_manifest.json");
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&manifest_path)
        .map_err(|source| RunSelectorError::Io { path: manifest_path.display().to_string(), source })?;
    let manifest: RunManifest = serde_json::from_str(&raw).unwrap_or_default();
    Ok(Some(manifest))
}

/// Reads a run's declared reliability, defaulting to reliable when the
/// manifest is absent or fails to parse.
#[must_use]
pub fn get_run_reliability(runs_dir: &Path, run_name: &str) -> Reliability {
    match load_run_manifest(runs_dir, run_name) {
        Ok(Some(manifest)) => Reliability {
            reliable: manifest.run_reliable.unwrap_or(true),
            reason: manifest.unreliable_reason,
        },
        Ok(None) => Reliability { reliable: true, reason: None },
        Err(err) => Reliability { reliable: false, reason: Some(err.to_string()) },
    }
}

/// Returns `true` iff `run_name` has every required artifact for
/// [`RunMode::Observe`].
#[must_use]
pub fn is_run_valid_for_observe(runs_dir: &Path, run_name: &str) -> bool {
    check_artifacts_exist(runs_dir, run_name, RunMode::Observe)
}

/// Full resolved state of a single run directory.
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// The run's folder name.
    pub run_name: String,
    /// Absolute path to the run directory.
    pub path: PathBuf,
    /// Whether the mode-specific artifact set is fully present.
    pub valid: bool,
    /// Reliability, read from the manifest.
    pub reliability: Reliability,
    /// The run's manifest, if present.
    pub manifest: Option<RunManifest>,
}

/// Builds a [`RunInfo`] for one run directory, for a given [`RunMode`].
#[must_use]
pub fn get_run_info(runs_dir: &Path, run_name: &str, mode: RunMode) -> RunInfo {
    RunInfo {
        run_name: run_name.to_string(),
        path: runs_dir.join(run_name),
        valid: check_artifacts_exist(runs_dir, run_name, mode),
        reliability: get_run_reliability(runs_dir, run_name),
        manifest: load_run_manifest(runs_dir, run_name).ok().flatten(),
    }
}

/// Finds the newest run (by descending folder-name sort) that is both
/// structurally valid for `mode` and reliable. An explicit `run_dir`
/// override, when `Some`, is validated and returned directly instead of
/// searching.
///
/// # Errors
///
/// Returns [`RunSelectorError::NoValidRun`] if no run satisfies both
/// checks, or [`RunSelectorError::Io`] if `runs_dir` cannot be listed.
pub fn find_latest_valid_run(runs_dir: &Path, mode: RunMode) -> Result<RunInfo, RunSelectorError> {
    for name in list_runs_sorted(runs_dir, false)? {
        let info = get_run_info(runs_dir, &name, mode);
        if info.valid && info.reliability.reliable {
            return Ok(info);
        }
    }
    Err(RunSelectorError::NoValidRun(runs_dir.display().to_string()))
}

/// Finds the earliest valid-and-reliable run (ascending date order) whose
/// `data_cutoff_utc` falls within `[target_date_utc, target_date_utc +
/// max_lag_days]`, used by the resolver to pick the evidence run for a
/// forecast whose target date has passed.
///
/// # Errors
///
/// Returns [`RunSelectorError::NoValidRun`] if no such run exists yet (the
/// caller should retry later), or [`RunSelectorError::Io`] if `runs_dir`
/// cannot be listed.
pub fn find_resolution_run(
    runs_dir: &Path,
    mode: RunMode,
    target_date_utc: time::OffsetDateTime,
    max_lag_days: i64,
) -> Result<RunInfo, RunSelectorError> {
    let window_end = target_date_utc + time::Duration::days(max_lag_days);
    let mut names = list_runs_sorted(runs_dir, false)?;
    names.reverse();
    for name in names {
        let info = get_run_info(runs_dir, &name, mode);
        if !info.valid || !info.reliability.reliable {
            continue;
        }
        let Some(manifest) = &info.manifest else { continue };
        let Some(cutoff_raw) = &manifest.data_cutoff_utc else { continue };
        let Ok(cutoff) = oracle_core::parse_utc(cutoff_raw) else { continue };
        if cutoff >= target_date_utc && cutoff <= window_end {
            return Ok(info);
        }
    }
    Err(RunSelectorError::NoValidRun(runs_dir.display().to_string()))
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

    fn write_run(
        runs_dir: &Path,
        name: &str,
        data_cutoff_utc: &str,
        reliable: Option<bool>,
        full_artifacts: bool,
    ) {
        let dir = runs_dir.join(name);
        fs::create_dir_all(&dir).unwrap();
        let manifest = serde_json::json!({
            "run_id": name,
            "data_cutoff_utc": data_cutoff_utc,
            "run_reliable": reliable,
        });
        fs::write(dir.join("run_manifest.json"), manifest.to_string()).unwrap();
        fs::write(dir.join("compiled_intel.json"), "{}").unwrap();
        fs::write(dir.join("coverage_report.json"), "{}").unwrap();
        if full_artifacts {
            fs::write(dir.join("priors_resolved.json"), "{}").unwrap();
            fs::write(dir.join("simulation_results.json"), "{}").unwrap();
        }
    }

    #[test]
    fn list_runs_sorted_excludes_meta_and_test() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), "RUN_20260410", "2026-04-10T00:00:00Z", None, false);
        write_run(tmp.path(), "RUN_20260415", "2026-04-15T00:00:00Z", None, false);
        fs::create_dir_all(tmp.path().join("_meta")).unwrap();
        fs::create_dir_all(tmp.path().join("TEST_RUN_X")).unwrap();

        let names = list_runs_sorted(tmp.path(), false).unwrap();
        assert_eq!(names, vec!["RUN_20260415".to_string(), "RUN_20260410".to_string()]);
    }

    #[test]
    fn unreliable_run_is_excluded_from_latest() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), "RUN_20260410", "2026-04-10T00:00:00Z", None, false);
        write_run(tmp.path(), "RUN_20260415", "2026-04-15T00:00:00Z", Some(false), false);

        let info = find_latest_valid_run(tmp.path(), RunMode::Observe).unwrap();
        assert_eq!(info.run_name, "RUN_20260410");
    }

    #[test]
    fn missing_manifest_defaults_reliable() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("RUN_20260410");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("compiled_intel.json"), "{}").unwrap();
        fs::write(dir.join("coverage_report.json"), "{}").unwrap();

        let reliability = get_run_reliability(tmp.path(), "RUN_20260410");
        assert!(reliability.reliable);
    }

    #[test]
    fn simulate_mode_requires_more_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), "RUN_20260410", "2026-04-10T00:00:00Z", None, false);
        assert!(is_run_valid_for_observe(tmp.path(), "RUN_20260410"));
        assert!(!check_artifacts_exist(tmp.path(), "RUN_20260410", RunMode::Simulate));
    }

    #[test]
    fn find_resolution_run_picks_earliest_in_lag_window() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), "RUN_20260420", "2026-04-20T00:00:00Z", None, false);
        write_run(tmp.path(), "RUN_20260425", "2026-04-25T00:00:00Z", None, false);
        write_run(tmp.path(), "RUN_20260430", "2026-04-30T00:00:00Z", None, false);

        let target = oracle_core::parse_utc("2026-04-22T00:00:00Z").unwrap();
        let info = find_resolution_run(tmp.path(), RunMode::Observe, target, 14).unwrap();
        assert_eq!(info.run_name, "RUN_20260425");
    }

    #[test]
    fn find_resolution_run_errors_when_none_in_window() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), "RUN_20260401", "2026-04-01T00:00:00Z", None, false);

        let target = oracle_core::parse_utc("2026-04-22T00:00:00Z").unwrap();
        let result = find_resolution_run(tmp.path(), RunMode::Observe, target, 14);
        assert!(matches!(result, Err(RunSelectorError::NoValidRun(_))));
    }
}
