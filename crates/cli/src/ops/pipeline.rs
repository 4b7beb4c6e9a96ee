//! Pipeline orchestration
//!
//! Runs the stages of one client generation in order:
//!
//! 1. validate the run configuration
//! 2. create the workspace
//! 3. bootstrap the code generator (when configured)
//! 4. acquire the spec repository
//! 5. collate the spec
//! 6. resolve the version
//! 7. prepare the client repository (repo mode)
//! 8. generate the client
//! 9. publish
//! 10. tear the workspace down
//!
//! The first failing stage aborts the run. Registered compensations are then
//! unwound and the workspace is kept or destroyed per configuration.

use super::acquire::acquire_spec;
use super::collate::collate_spec;
use super::compensation::CompensationStack;
use super::publish::{Delivery, OutputPublisher};
use super::version::resolve_version_file;
use crate::config::{Mode, PipelineConfig};
use crate::error::CliResult;
use crate::generator::templates::{TemplateRenderer, ViewModel};
use crate::generator::ClientGenerator;
use crate::process::CommandRunner;
use crate::workspace;
use specsync_core::{CommitId, SpecFormat};
use std::path::PathBuf;
use tracing::{info, warn};

/// The collated spec of a run with its resolved metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArtifact {
    pub path: PathBuf,
    pub format: SpecFormat,
    pub version: String,
    pub commit: CommitId,
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub package_name: String,
    pub version: String,
    /// Short commit id of the spec repository
    pub commit_id: String,
    pub output_dir: PathBuf,
    pub delivery: Delivery,
    /// Set when the workspace could not be removed after delivery
    pub teardown_error: Option<String>,
}

pub struct PipelineOrchestrator<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(config: &'a PipelineConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Run every stage and report the delivery.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Compensations have already been run by
    /// the time it is returned.
    pub fn run(&self) -> CliResult<RunReport> {
        let config = self.config;
        config.validate()?;
        let renderer = TemplateRenderer::new(config.settings.templates_dir.as_deref())?;

        let root = config.workspace.root();
        info!(mode = %config.mode, spec_repo = %config.spec_repo, workspace = %root.display(), "starting run");
        workspace::ensure(root)?;

        let mut compensations = CompensationStack::new();
        match self.execute(&renderer, &mut compensations) {
            Ok(mut report) => {
                if let Err(e) = workspace::destroy(root) {
                    warn!(error = %e, "failed to remove workspace after delivery");
                    report.teardown_error = Some(e.to_string());
                }
                info!(package = %report.package_name, delivery = %report.delivery, "run complete");
                Ok(report)
            }
            Err(error) => {
                warn!(stage = ?error.stage(), error = %error, "run aborted");
                if !compensations.is_empty() {
                    info!(count = compensations.len(), "unwinding compensations");
                }
                let incomplete = compensations.unwind(self.runner);
                if !incomplete.is_empty() {
                    warn!(compensations = ?incomplete, "some compensations did not complete");
                }

                if config.settings.keep_workspace_on_failure {
                    warn!(workspace = %root.display(), "workspace kept for diagnostics");
                } else if let Err(e) = workspace::destroy(root) {
                    warn!(error = %e, "failed to remove workspace after abort");
                }
                Err(error)
            }
        }
    }

    fn execute(
        &self,
        renderer: &TemplateRenderer,
        compensations: &mut CompensationStack,
    ) -> CliResult<RunReport> {
        let config = self.config;
        let settings = &config.settings;
        let workspace = &config.workspace;

        let generator = ClientGenerator::new(self.runner, renderer, settings);
        generator.ensure_tool()?;

        info!(stage = "acquire", "acquiring spec repository");
        let acquired = acquire_spec(self.runner, config, workspace)?;

        info!(stage = "collate", "collating spec");
        let collated = collate_spec(self.runner, config, workspace, &acquired.repo_dir)?;

        info!(stage = "version", "resolving version");
        let version = resolve_version_file(&collated)?;
        let artifact = SpecArtifact {
            path: collated.path,
            format: collated.format,
            version,
            commit: acquired.commit,
        };
        info!(format = %artifact.format, version = %artifact.version, commit = %artifact.commit, "spec artifact ready");

        let publisher = OutputPublisher::new(self.runner, renderer, config);
        let client_repo = match config.mode {
            Mode::Repo => {
                info!(stage = "publish", "preparing client repository");
                let repo = publisher.prepare_client_repo(&artifact.commit, compensations)?;
                info!(
                    branch = %repo.branch,
                    created = repo.created,
                    previous = %repo.previous_branch,
                    "client repository ready"
                );
                Some(repo)
            }
            Mode::Folder | Mode::Nuget => None,
        };

        let view = ViewModel {
            package_name: config.package_name.clone(),
            nuget_package_name: config.client_id.clone(),
            spec_repo: config.spec_repo.clone(),
            version: Some(artifact.version.clone()),
            commit_id: Some(artifact.commit.short().to_string()),
        };

        info!(stage = "generate", "generating client");
        let generated = generator.generate(&artifact.path, &config.output_dir, &view)?;

        info!(stage = "publish", mode = %config.mode, "delivering client");
        let delivery = publisher.publish(&generated, &view, client_repo.as_ref())?;

        Ok(RunReport {
            package_name: generated.package_name,
            version: artifact.version,
            commit_id: artifact.commit.short().to_string(),
            output_dir: generated.output_dir,
            delivery,
            teardown_error: None,
        })
    }
}
