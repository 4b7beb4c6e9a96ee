//! specsync CLI
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.

mod commands;
mod config;
mod error;
mod generator;
mod ops;
mod process;
#[cfg(test)]
mod test_helpers;
mod workspace;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use commands::{clean, completion, generate, generate_from_spec};
use config::Mode;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// specsync - Generate API clients from spec repositories
#[derive(Parser)]
#[command(name = "specsync")]
#[command(about = "specsync - Generate API clients from spec repositories", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the config file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a client into a local folder
    Folder {
        /// Spec repository name (e.g. widget-api)
        spec_repo: String,
        /// Output directory (defaults to <outputRoot>/<spec-repo>-client)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Workspace directory (defaults to a run-scoped directory under workspaceRoot)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Generate a client and push it to a branch of the client repository
    Repo {
        /// Spec repository name (e.g. widget-api)
        spec_repo: String,
        /// Workspace directory (defaults to a run-scoped directory under workspaceRoot)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Generate a client and publish it as a nuget package
    Nuget {
        /// Spec repository name (e.g. widget-api)
        spec_repo: String,
        /// Nuget API key
        api_key: String,
        /// Workspace directory (defaults to a run-scoped directory under workspaceRoot)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Run the code generator against an already collated spec file
    GenerateFromSpec {
        /// Path to the collated spec file
        spec_path: PathBuf,
        /// Output directory
        output_dir: PathBuf,
        /// Package name (e.g. WidgetApiClient)
        package_name: String,
    },
    /// Remove the workspace directory
    Clean {
        /// Workspace directory (defaults to workspaceRoot)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        shell: String,
    },
}

/// Command structure used for completion generation
pub(crate) fn get_cli_command() -> clap::Command {
    Cli::command()
}

fn init_logging(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            // -v: stage transitions
            1 => "warn,specsync=info".to_string(),
            // -vv: every external command
            2 => "info,specsync=debug".to_string(),
            _ => "debug,specsync=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config;
    let exit_code = match cli.command {
        Commands::Folder {
            spec_repo,
            output,
            workspace,
        } => {
            let opts = generate::Options {
                mode: Mode::Folder,
                spec_repo,
                credential: None,
                output,
                workspace,
                config_path,
            };
            generate::run(&opts)
        }
        Commands::Repo {
            spec_repo,
            workspace,
        } => {
            let opts = generate::Options {
                mode: Mode::Repo,
                spec_repo,
                credential: None,
                output: None,
                workspace,
                config_path,
            };
            generate::run(&opts)
        }
        Commands::Nuget {
            spec_repo,
            api_key,
            workspace,
        } => {
            let opts = generate::Options {
                mode: Mode::Nuget,
                spec_repo,
                credential: Some(api_key),
                output: None,
                workspace,
                config_path,
            };
            generate::run(&opts)
        }
        Commands::GenerateFromSpec {
            spec_path,
            output_dir,
            package_name,
        } => {
            let opts = generate_from_spec::Options {
                spec_path,
                output_dir,
                package_name,
                config_path,
            };
            generate_from_spec::run(&opts)
        }
        Commands::Clean { workspace } => {
            let opts = clean::Options {
                workspace,
                config_path,
            };
            clean::run(&opts)
        }
        Commands::Completion { shell } => {
            let opts = completion::Options { shell };
            completion::run(&opts)
        }
    };

    std::process::exit(exit_code);
}
