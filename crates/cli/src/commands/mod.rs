//! CLI commands

pub mod clean;
pub mod completion;
pub mod generate;
pub mod generate_from_spec;

use crate::error::CliError;

/// Print a failed command's error and return its exit code
pub(crate) fn report_failure(headline: &str, error: &CliError) -> i32 {
    eprintln!("✗ {headline}");
    eprintln!("  Error: {error}");
    if let CliError::Config(_) = error {
        eprintln!("  Run 'specsync --help' for usage.");
    }
    error.exit_code()
}
