// crates/oracle-catalog/src/lib.rs
// ============================================================================
// Module: Oracle Catalog
// Description: Static event catalog loading, validation, and query helpers,
//              plus the bin-specification module for binned_continuous events.
// Purpose: The single authoritative source of "what events exist and how
//          they resolve" for every other crate in the workspace.
// Dependencies: oracle-core, serde, serde_json, thiserror
// ============================================================================

pub mod bins;
pub mod catalog;

pub use bins::BinDef;
pub use bins::BinMapError;
pub use bins::BinSpec;
pub use bins::bins_have_gaps;
pub use bins::bins_have_overlap;
pub use bins::get_bin_by_id;
pub use bins::get_bin_ids;
pub use bins::validate_bin_spec;
pub use bins::value_to_bin;
pub use catalog::CatalogError;
pub use catalog::EventCatalog;
pub use catalog::EventDef;
pub use catalog::ForecastSource;
pub use catalog::ResolutionFallback;
pub use catalog::ResolutionRule;
pub use catalog::ResolutionSource;
pub use catalog::get_diagnostic_events;
pub use catalog::get_event;
pub use catalog::get_forecastable_events;
pub use catalog::list_events;
pub use catalog::load_catalog;
pub use catalog::load_catalog_raw;
pub use catalog::to_event_id;
pub use catalog::validate_catalog;
pub use catalog::validate_event_bins;
