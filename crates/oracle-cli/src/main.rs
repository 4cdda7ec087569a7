// crates/oracle-cli/src/main.rs
// ============================================================================
// Crate: oracle-cli
// Description: Command dispatcher for the forecasting/resolution/scoring
//              subsystem.
// Purpose: One binary wrapping `log`, `resolve`, `score`, `report`,
//          `status`, `validate`, and `queue` over a shared catalog, ledger,
//          and run tree.
// Dependencies: clap, oracle-baseline, oracle-catalog, oracle-core,
//               oracle-ensemble, oracle-evidence, oracle-forecast,
//               oracle-ledger, oracle-reporter, oracle-resolver,
//               oracle-runs, oracle-scorer, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Every subcommand is synchronous: the subsystem performs no network I/O
//! and spawns no threads of its own, so `main` is a plain function rather
//! than an async runtime entry point. Each handler returns a typed
//! [`error::CliError`]; `main` maps a failure to a printed message and a
//! non-zero [`ExitCode`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod error;
mod io;

use cli::Cli;
use cli::Commands;
use error::CliResult;
use io::emit_error;
use io::print_line;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point, returning an exit code rather than panicking on
/// failure.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches to the selected subcommand.
fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Log(args) => commands::log::run(&cli, args),
        Commands::Resolve(args) => commands::resolve::run(&cli, args),
        Commands::Score(args) => commands::score::run(&cli, args),
        Commands::Report(args) => commands::report::run(&cli, args),
        Commands::Status => commands::status::run(&cli),
        Commands::Validate => commands::validate::run(&cli),
        Commands::Queue => commands::queue::run(&cli),
    }
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
    use clap::CommandFactory;

    use super::cli::Cli;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn print_line_writes_without_panicking() {
        super::print_line("test output").unwrap();
    }
}
