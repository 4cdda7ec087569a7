// crates/oracle-cli/src/commands/validate.rs
// ============================================================================
// Module: `validate` Command
// Description: Validates the event catalog and prints a summary.
// Purpose: Let an operator check a catalog edit before it is used to
//          generate or score anything.
// Dependencies: oracle-catalog
// ============================================================================

use crate::cli::Cli;
use crate::error::CliError;
use crate::error::CliResult;
use crate::io::print_line;

/// Runs the `validate` subcommand: validates the catalog and prints a
/// forecastable/diagnostic event-count summary; in verbose mode, lists every
/// event with its source type.
///
/// # Errors
///
/// Returns [`CliError`] if the catalog cannot be read or fails validation.
pub fn run(cli: &Cli) -> CliResult<()> {
    let raw = oracle_catalog::load_catalog_raw(&cli.catalog)?;
    let catalog: oracle_catalog::EventCatalog = serde_json::from_value(raw).map_err(CliError::Serialize)?;

    let errors = oracle_catalog::validate_catalog(&catalog);
    if !errors.is_empty() {
        return Err(CliError::Catalog(oracle_catalog::CatalogError::Invalid(errors)));
    }

    let forecastable = oracle_catalog::get_forecastable_events(&catalog);
    let diagnostic = oracle_catalog::get_diagnostic_events(&catalog);

    print_line(&format!(
        "validate: catalog_version {} ok, {} event(s) ({} forecastable, {} diagnostic)",
        catalog.catalog_version,
        catalog.events.len(),
        forecastable.len(),
        diagnostic.len()
    ))?;

    if cli.verbose {
        for event in oracle_catalog::list_events(&catalog) {
            print_line(&format!(
                "  {} [{}] source={}",
                event.event_id,
                if event.enabled { "enabled" } else { "disabled" },
                forecast_source_tag(&event.forecast_source)
            ))?;
        }
    }

    Ok(())
}

/// A short, stable tag for a forecast source, for the verbose event list.
fn forecast_source_tag(source: &oracle_catalog::ForecastSource) -> &'static str {
    match source {
        oracle_catalog::ForecastSource::DiagnosticOnly => "diagnostic_only",
        oracle_catalog::ForecastSource::SimulationOutput { .. } => "simulation_output",
        oracle_catalog::ForecastSource::SimulationDerived { .. } => "simulation_derived",
        oracle_catalog::ForecastSource::BaselinePersistence => "baseline_persistence",
        oracle_catalog::ForecastSource::BaselineClimatology => "baseline_climatology",
    }
}
