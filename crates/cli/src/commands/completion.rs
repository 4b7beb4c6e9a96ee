//! Shell completion command implementation

use super::report_failure;
use crate::error::{CliError, CliResult};
use crate::get_cli_command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

pub struct Options {
    pub shell: String,
}

/// Print the completion script for a shell
pub fn run(options: &Options) -> i32 {
    match run_inner(options, &mut io::stdout()) {
        Ok(()) => 0,
        Err(e) => report_failure("Completion generation failed", &e),
    }
}

fn parse_shell(name: &str) -> CliResult<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "" => Err(CliError::Config(
            "Shell name is required. Supported shells: bash, zsh, fish".to_string(),
        )),
        _ => Err(CliError::Config(format!(
            "Unsupported shell: {name}. Supported shells: bash, zsh, fish"
        ))),
    }
}

fn run_inner(options: &Options, out: &mut dyn Write) -> CliResult<()> {
    let shell = parse_shell(&options.shell)?;
    let mut cmd = get_cli_command();
    generate(shell, &mut cmd, "specsync", out);
    Ok(())
}
