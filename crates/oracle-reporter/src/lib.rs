// crates/oracle-reporter/src/lib.rs
// ============================================================================
// Crate: oracle-reporter
// Description: Renders a computed scorecard as JSON and Markdown, writes it
//              to disk, and produces a lightweight ledger status census.
// Purpose: Keep presentation concerns (envelope shape, table formatting,
//          file layout) out of the scorer, which only computes numbers.
// Dependencies: oracle-catalog, oracle-core, oracle-ledger, oracle-scorer,
//               serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`json::generate_scorecard_json`] and [`markdown::generate_scorecard_md`]
//! both take the same [`oracle_scorer::Scorecard`] and
//! [`json::ScorecardMetadata`] pair and never recompute a figure the scorer
//! already produced. [`report::generate_report`] is the orchestration point
//! that writes one or both forms under a reports directory.
//! [`status::generate_status_report`] is a separate, cheaper census that
//! does not require a baseline config or a scoring pass at all.

pub mod error;
pub mod json;
pub mod markdown;
pub mod report;
pub mod status;

pub use error::ReporterError;
pub use json::ScorecardMetadata;
pub use json::generate_scorecard_json;
pub use json::scorecard_json_value;
pub use markdown::format_calibration_table;
pub use markdown::format_coverage_table;
pub use markdown::format_mode_scores_table;
pub use markdown::generate_scorecard_md;
pub use report::DEFAULT_REPORTS_DIR;
pub use report::OutputFormat;
pub use report::WrittenReport;
pub use report::generate_report;
pub use status::EventStatusCounts;
pub use status::StatusReport;
pub use status::generate_status_report;

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use std::collections::BTreeMap;

    use oracle_catalog::EventCatalog;
    use oracle_catalog::EventDef;
    use oracle_catalog::ForecastSource;
    use oracle_catalog::ResolutionSource;
    use oracle_ledger::ForecastRecord;
    use oracle_ledger::Ledger;
    use oracle_ledger::ResolutionRecord;
    use oracle_scorer::Scorecard;

    use super::*;

    fn event(event_id: &str) -> EventDef {
        EventDef {
            event_id: event_id.to_string(),
            title: "Test Event".to_string(),
            event_type: oracle_core::EventType::Binary,
            allowed_outcomes: vec!["YES".to_string(), "NO".to_string()],
            min_catalog_version: None,
            forecast_source: ForecastSource::SimulationOutput { field_path: "p".to_string() },
            resolution_source: ResolutionSource::None,
            horizons_days: vec![7],
            enabled: true,
            bin_spec: None,
            requires_manual_resolution: false,
            auto_resolve: false,
            grace_days: None,
            max_resolution_lag_days: None,
            effective_from_utc: None,
        }
    }

    fn forecast(forecast_id: &str, event_id: &str) -> ForecastRecord {
        let mut probabilities = BTreeMap::new();
        probabilities.insert("YES".to_string(), 0.6);
        probabilities.insert("NO".to_string(), 0.4);
        ForecastRecord {
            forecast_id: forecast_id.to_string(),
            event_id: event_id.to_string(),
            horizon_days: 7,
            as_of_utc: "2026-04-15T00:00:00Z".to_string(),
            target_date_utc: "2026-04-22T00:00:00Z".to_string(),
            run_id: "RUN_1".to_string(),
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

    fn resolution(forecast_id: &str, event_id: &str) -> ResolutionRecord {
        ResolutionRecord {
            resolution_id: format!("res_{forecast_id}"),
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
            run_id: Some("RUN_1".to_string()),
            resolution_manifest_id: None,
            rule_applied: None,
            evidence_refs: Vec::new(),
            evidence_hashes: Vec::new(),
            resolved_by: "oracle_resolver_v2".to_string(),
        }
    }

    #[test]
    fn scorecard_json_round_trips_through_serde() {
        let catalog = EventCatalog { catalog_version: "1.0.0".to_string(), events: vec![event("evt_a")] };
        let forecasts = vec![forecast("fcst_1", "evt_a")];
        let resolutions = vec![resolution("fcst_1", "evt_a")];
        let baseline_config = oracle_baseline::BaselineConfig::default();
        let as_of = oracle_core::parse_utc("2026-04-23T00:00:00Z").unwrap();
        let scorecard = oracle_scorer::compute_scores(
            &catalog,
            &forecasts,
            &resolutions,
            &[],
            &baseline_config,
            &[oracle_core::ResolutionMode::ExternalAuto, oracle_core::ResolutionMode::ExternalManual],
            None,
            None,
            as_of,
        )
        .unwrap();

        let metadata = ScorecardMetadata::default();
        let text = generate_scorecard_json(&scorecard, &metadata, as_of).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["scorecard_version"], "1.0");
        assert_eq!(value["scores"]["counts"]["total_forecasts"], 1);
    }

    #[test]
    fn scorecard_md_contains_expected_sections() {
        let scorecard = Scorecard::default();
        let metadata = ScorecardMetadata { event_id_filter: Some("evt_a".to_string()), ..Default::default() };
        let as_of = oracle_core::parse_utc("2026-04-23T00:00:00Z").unwrap();
        let md = generate_scorecard_md(&scorecard, &metadata, as_of).unwrap();
        assert!(md.contains("## Summary"));
        assert!(md.contains("## Coverage Metrics"));
        assert!(md.contains("## Filters Applied"));
        assert!(md.contains("## Scores by Resolution Mode"));
        assert!(md.contains("## Interpretation Guide"));
    }

    #[test]
    fn generate_report_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let scorecard = Scorecard::default();
        let metadata = ScorecardMetadata::default();
        let as_of = oracle_core::parse_utc("2026-04-23T00:00:00Z").unwrap();
        let written =
            generate_report(&scorecard, &metadata, as_of, dir.path(), OutputFormat::Both).unwrap();
        assert!(written.json_path.as_ref().unwrap().exists());
        assert!(written.md_path.as_ref().unwrap().exists());
    }

    #[test]
    fn status_report_counts_every_catalog_event() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("ledger"));
        ledger.append_forecast(&forecast("fcst_1", "evt_a")).unwrap();
        ledger.append_forecast(&forecast("fcst_2", "evt_a")).unwrap();
        ledger.append_resolution(&resolution("fcst_1", "evt_a")).unwrap();

        let catalog = EventCatalog {
            catalog_version: "1.0.0".to_string(),
            events: vec![event("evt_a"), event("evt_b")],
        };
        let status = generate_status_report(&catalog, &ledger).unwrap();
        assert_eq!(status.total_forecasts, 2);
        assert_eq!(status.total_resolved, 1);
        assert_eq!(status.total_pending, 1);
        assert_eq!(status.by_event["evt_a"].total, 2);
        assert_eq!(status.by_event["evt_b"].total, 0);
    }
}
