// crates/oracle-scorer/src/lib.rs
// ============================================================================
// Crate: oracle-scorer
// Description: Accuracy, penalty, calibration, and baseline-skill scoring
//              over the forecast ledger.
// Purpose: Turn a catalog, a ledger snapshot, and a baseline config into one
//          scorecard: counts, coverage, primary accuracy, effective/penalty
//          scoring, per-forecaster/per-type/per-event breakdowns, and the
//          climatology/persistence comparison each event is measured
//          against.
// Dependencies: oracle-baseline, oracle-catalog, oracle-core, oracle-ledger,
//               serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Scoring never recomputes smoothing math itself: every baseline figure
//! here is read through [`oracle_baseline::build_history_index`] and its two
//! view functions, [`oracle_baseline::compute_climatology_distribution`] and
//! [`oracle_baseline::compute_persistence_distribution`]. Binary events are
//! scored as the `outcomes = ["YES", "NO"]` case of multinomial scoring, so
//! [`binary`] is a thin, binary-shaped wrapper over [`multinomial`] and
//! [`baseline_walk`] rather than a parallel implementation.
//!
//! [`aggregate::compute_scores`] is the crate's single entry point: it joins
//! forecasts to resolutions (correction-applied), classifies coverage,
//! scores the primary forecaster, and assembles the per-forecaster,
//! per-type, and per-event breakdowns a scorecard reports.

pub mod aggregate;
pub mod baseline_walk;
pub mod binary;
pub mod calibration;
pub mod error;
pub mod multinomial;

pub use aggregate::AccuracyMetrics;
pub use aggregate::BaselineSummary;
pub use aggregate::CoverageMetrics;
pub use aggregate::EventScores;
pub use aggregate::HorizonScores;
pub use aggregate::ModeFilterKind;
pub use aggregate::PenaltyMetrics;
pub use aggregate::ScoreCounts;
pub use aggregate::Scorecard;
pub use aggregate::compute_coverage_metrics;
pub use aggregate::compute_event_scores;
pub use aggregate::compute_scores;
pub use aggregate::compute_scores_by_forecaster;
pub use aggregate::compute_scores_for_mode;
pub use aggregate::group_by_forecaster;
pub use calibration::Calibration;
pub use calibration::CalibrationBin;
pub use calibration::compute_calibration;
pub use error::ScorerError;
