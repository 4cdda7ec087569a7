// crates/oracle-reporter/src/report.rs
// ============================================================================
// Module: Report Writing
// Description: Writes a computed scorecard to disk in one or both of its
//              serialized forms.
// Purpose: Keep the on-disk layout (`scorecard.json`/`scorecard.md` under a
//          reports directory) in one place, independent of how the
//          scorecard was computed or formatted.
// Dependencies: oracle-core, oracle-scorer, std::fs
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use oracle_scorer::Scorecard;

use crate::error::ReporterError;
use crate::json::ScorecardMetadata;
use crate::json::generate_scorecard_json;
use crate::markdown::generate_scorecard_md;

/// Default directory, relative to a working root, reports are written
/// under.
pub const DEFAULT_REPORTS_DIR: &str = "forecasting/reports";

/// Which serialized form(s) of a scorecard [`generate_report`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `scorecard.json` only.
    Json,
    /// `scorecard.md` only.
    Md,
    /// Both `scorecard.json` and `scorecard.md`.
    Both,
}

/// The paths written by one [`generate_report`] call.
#[derive(Debug, Clone, Default)]
pub struct WrittenReport {
    /// Path to the written JSON scorecard, if `format` included it.
    pub json_path: Option<PathBuf>,
    /// Path to the written Markdown scorecard, if `format` included it.
    pub md_path: Option<PathBuf>,
}

/// Writes `scorecard` under `reports_dir` in the form(s) `format` names,
/// creating the directory if it does not already exist.
///
/// # Errors
///
/// Returns [`ReporterError::Io`] if the directory or a report file cannot
/// be written, or a serialization/timestamp error from the underlying
/// format call.
pub fn generate_report(
    scorecard: &Scorecard,
    metadata: &ScorecardMetadata,
    generated_at_utc: time::OffsetDateTime,
    reports_dir: &Path,
    format: OutputFormat,
) -> Result<WrittenReport, ReporterError> {
    fs::create_dir_all(reports_dir)
        .map_err(|source| ReporterError::Io { path: reports_dir.display().to_string(), source })?;

    let mut written = WrittenReport::default();

    if matches!(format, OutputFormat::Json | OutputFormat::Both) {
        let path = reports_dir.join("scorecard.json");
        let body = generate_scorecard_json(scorecard, metadata, generated_at_utc)?;
        fs::write(&path, body)
            .map_err(|source| ReporterError::Io { path: path.display().to_string(), source })?;
        written.json_path = Some(path);
    }

    if matches!(format, OutputFormat::Md | OutputFormat::Both) {
        let path = reports_dir.join("scorecard.md");
        let body = generate_scorecard_md(scorecard, metadata, generated_at_utc)?;
        fs::write(&path, body)
            .map_err(|source| ReporterError::Io { path: path.display().to_string(), source })?;
        written.md_path = Some(path);
    }

    Ok(written)
}
