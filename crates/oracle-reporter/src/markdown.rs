// crates/oracle-reporter/src/markdown.rs
// ============================================================================
// Module: Scorecard Markdown
// Description: Renders a computed scorecard as a human-readable Markdown
//              report.
// Purpose: Give a reviewer a skimmable summary of the same figures the JSON
//          scorecard carries, without asking them to parse JSON by eye.
// Dependencies: oracle-core, oracle-scorer
// ============================================================================

use oracle_scorer::AccuracyMetrics;
use oracle_scorer::Calibration;
use oracle_scorer::CoverageMetrics;
use oracle_scorer::Scorecard;

use crate::error::ReporterError;
use crate::json::ScorecardMetadata;

/// Renders an optional figure as `"n/a"` when absent, else 4 decimal places.
fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

/// Renders a fraction as a percentage with 1 decimal place.
fn fmt_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Renders the four-way coverage breakdown as a Markdown table.
#[must_use]
pub fn format_coverage_table(coverage: &CoverageMetrics) -> String {
    let total =
        coverage.resolved_known + coverage.resolved_unknown + coverage.abstained + coverage.unresolved;
    let mut out = String::new();
    out.push_str("| Category | Count |\n");
    out.push_str("|---|---|\n");
    out.push_str(&format!("| Resolved (known) | {} |\n", coverage.resolved_known));
    out.push_str(&format!("| Resolved (UNKNOWN) | {} |\n", coverage.resolved_unknown));
    out.push_str(&format!("| Abstained | {} |\n", coverage.abstained));
    out.push_str(&format!("| Unresolved | {} |\n", coverage.unresolved));
    out.push_str(&format!("| **Total** | **{total}** |\n"));
    out.push_str(&format!("\nCoverage rate: **{}**\n", fmt_pct(coverage.coverage_rate)));
    out
}

/// Renders the three resolution-mode accuracy slices as a Markdown table.
#[must_use]
pub fn format_mode_scores_table(
    core: &AccuracyMetrics,
    claims_inferred: &AccuracyMetrics,
    combined: &AccuracyMetrics,
) -> String {
    let mut out = String::new();
    out.push_str("| Mode | Brier | Log Score | N |\n");
    out.push_str("|---|---|---|---|\n");
    out.push_str(&format!(
        "| Core (external_auto + external_manual) | {} | {} | {} |\n",
        fmt_opt(core.brier),
        fmt_opt(core.log_score),
        core.n
    ));
    out.push_str(&format!(
        "| Claims inferred | {} | {} | {} |\n",
        fmt_opt(claims_inferred.brier),
        fmt_opt(claims_inferred.log_score),
        claims_inferred.n
    ));
    out.push_str(&format!(
        "| Combined (every mode) | {} | {} | {} |\n",
        fmt_opt(combined.brier),
        fmt_opt(combined.log_score),
        combined.n
    ));
    out
}

/// Renders a calibration table's bins as Markdown.
#[must_use]
pub fn format_calibration_table(calibration: &Calibration) -> String {
    let mut out = String::new();
    out.push_str("| Bin | Count | Mean Forecast | Observed Frequency |\n");
    out.push_str("|---|---|---|---|\n");
    for bin in &calibration.bins {
        let closing = if (bin.upper - 1.0).abs() < f64::EPSILON { ']' } else { ')' };
        out.push_str(&format!(
            "| [{:.1}, {:.1}{closing} | {} | {:.4} | {:.4} |\n",
            bin.lower, bin.upper, bin.count, bin.mean_forecast, bin.observed_frequency,
        ));
    }
    out.push_str(&format!("\nCalibration error (count-weighted mean gap): **{:.4}**\n", calibration.calibration_error));
    out
}

/// Fixed footer appended to every Markdown scorecard, explaining how to
/// read the figures above it.
const INTERPRETATION_GUIDE: &str = "\
## Interpretation Guide

- **Brier score** ranges `[0, 1]` after normalization; lower is better, `0`
  is a perfect forecast, `0.25` is what a coin flip scores against a 50/50
  outcome.
- **Log score** is the mean log-likelihood the forecaster assigned to what
  actually happened; closer to `0` is better, large negative values mean
  confident misses.
- **Skill scores** (`1 - model / baseline`) are positive when the model
  beats the named baseline, zero when it ties, negative when the baseline
  would have done better.
- **Effective Brier** folds abstentions and `UNKNOWN` resolutions back in
  as uniform predictions/targets rather than excluding them, so it never
  rewards dodging a hard call.
- **Calibration** compares, within each predicted-probability bin, the
  average forecast against how often the predicted side actually happened;
  a well-calibrated forecaster's rows track the diagonal.
";

/// Renders the full Markdown scorecard: Summary, Coverage Metrics, Filters
/// Applied (when any filter is set), Core Accuracy, Claims Inferred Scores,
/// Scores by Resolution Mode, Effective Brier, a legacy Overall Accuracy
/// Metrics section, Calibration, and the fixed Interpretation Guide footer.
///
/// # Errors
///
/// Returns [`ReporterError::Timestamp`] if `generated_at_utc` fails to
/// format.
pub fn generate_scorecard_md(
    scorecard: &Scorecard,
    metadata: &ScorecardMetadata,
    generated_at_utc: time::OffsetDateTime,
) -> Result<String, ReporterError> {
    let generated_at = oracle_core::format_utc(generated_at_utc)?;
    let mut out = String::new();

    out.push_str("# Oracle Scorecard\n\n");
    out.push_str(&format!("Generated: {generated_at}\n\n"));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- Total forecasts: {}\n", scorecard.counts.total_forecasts));
    out.push_str(&format!("- Resolved: {}\n", scorecard.counts.resolved));
    out.push_str(&format!("- Unresolved: {}\n", scorecard.counts.unresolved));
    out.push_str(&format!("- Abstained: {}\n", scorecard.counts.abstained));
    out.push_str(&format!("- Resolved UNKNOWN: {}\n\n", scorecard.counts.unknown));

    out.push_str("## Coverage Metrics\n\n");
    out.push_str(&format_coverage_table(&scorecard.coverage));
    out.push('\n');

    if metadata.event_id_filter.is_some() || metadata.horizon_filter.is_some() {
        out.push_str("## Filters Applied\n\n");
        if let Some(event_id) = &metadata.event_id_filter {
            out.push_str(&format!("- event_id: `{event_id}`\n"));
        }
        if let Some(horizon) = metadata.horizon_filter {
            out.push_str(&format!("- horizon_days: `{horizon}`\n"));
        }
        out.push('\n');
    }

    out.push_str("## Core Accuracy\n\n");
    out.push_str(&format!("- Brier: {}\n", fmt_opt(scorecard.core_scores.brier)));
    out.push_str(&format!("- Log score: {}\n", fmt_opt(scorecard.core_scores.log_score)));
    out.push_str(&format!("- N: {}\n\n", scorecard.core_scores.n));

    out.push_str("## Claims Inferred Scores\n\n");
    out.push_str(&format!("- Brier: {}\n", fmt_opt(scorecard.claims_inferred_scores.brier)));
    out.push_str(&format!("- Log score: {}\n", fmt_opt(scorecard.claims_inferred_scores.log_score)));
    out.push_str(&format!("- N: {}\n\n", scorecard.claims_inferred_scores.n));

    out.push_str("## Scores by Resolution Mode\n\n");
    out.push_str(&format_mode_scores_table(
        &scorecard.core_scores,
        &scorecard.claims_inferred_scores,
        &scorecard.combined_scores,
    ));
    out.push('\n');

    out.push_str("## Effective Brier\n\n");
    out.push_str(&format!("- Effective Brier: {}\n", fmt_opt(scorecard.penalty.effective_brier)));
    out.push_str(&format!(
        "- Unknown/abstain penalty: {}\n\n",
        fmt_opt(scorecard.penalty.unknown_abstain_penalty)
    ));

    out.push_str("## Overall Accuracy Metrics\n\n");
    out.push_str(&format!("- Brier: {}\n", fmt_opt(scorecard.accuracy.brier)));
    out.push_str(&format!("- Log score: {}\n", fmt_opt(scorecard.accuracy.log_score)));
    out.push_str(&format!("- N: {}\n\n", scorecard.accuracy.n));

    if !scorecard.baseline_fallback_warnings.is_empty() {
        out.push_str("_Baseline fallback to uniform (insufficient history) for: ");
        out.push_str(&scorecard.baseline_fallback_warnings.join(", "));
        out.push_str("._\n\n");
    }

    out.push_str("## Calibration\n\n");
    // The primary forecaster's pooled calibration table is the first
    // event's, if filtered to one; otherwise callers wanting per-event
    // detail should read the JSON scorecard's `scores_by_event`.
    if let Some(event_scores) = metadata
        .event_id_filter
        .as_deref()
        .and_then(|event_id| scorecard.scores_by_event.get(event_id))
    {
        out.push_str(&format_calibration_table(&event_scores.calibration));
    } else {
        out.push_str("_Calibration is reported per event in the JSON scorecard's `scores_by_event`; filter by `--event-id` to see a single event's table here._\n");
    }
    out.push('\n');

    out.push_str(INTERPRETATION_GUIDE);

    Ok(out)
}
