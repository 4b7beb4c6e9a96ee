//! Generate command implementation (`folder`, `repo` and `nuget` modes)

use super::report_failure;
use crate::config::{read_config, Mode, PipelineConfig, RunArgs};
use crate::error::CliResult;
use crate::ops::pipeline::{PipelineOrchestrator, RunReport};
use crate::process::{CommandRunner, SystemRunner};
use std::path::PathBuf;

pub struct Options {
    pub mode: Mode,
    pub spec_repo: String,
    pub credential: Option<String>,
    pub output: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub config_path: PathBuf,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options, &SystemRunner) {
        Ok(report) => {
            println!(
                "✓ Generated {} {} from {}@{} ({})",
                report.package_name, report.version, options.spec_repo, report.commit_id, report.delivery
            );
            println!("  Output: {}", report.output_dir.display());
            if let Some(ref teardown) = report.teardown_error {
                eprintln!("  Warning: workspace was not fully removed: {teardown}");
            }
            0
        }
        Err(e) => report_failure(&format!("Client generation failed ({} mode)", options.mode), &e),
    }
}

fn run_inner(options: &Options, runner: &dyn CommandRunner) -> CliResult<RunReport> {
    let settings = read_config(&options.config_path)?;
    let config = PipelineConfig::from_args(
        RunArgs {
            mode: options.mode,
            spec_repo: options.spec_repo.clone(),
            credential: options.credential.clone(),
            output: options.output.clone(),
            workspace: options.workspace.clone(),
        },
        settings,
    )?;

    PipelineOrchestrator::new(&config, runner).run()
}
