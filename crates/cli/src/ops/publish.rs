//! Delivery of generated output per mode
//!
//! - `folder`: nothing beyond generation
//! - `repo`: the client repository is fetched and a commit branch is forked
//!   from the remote default branch before generation; afterwards CI and manifest files are stamped and the
//!   branch is committed and pushed
//! - `nuget`: the manifest is stamped, the project is packed and the package
//!   uploaded

use super::acquire::Git;
use super::compensation::{Compensation, CompensationStack};
use crate::config::{Mode, PipelineConfig};
use crate::error::{CliError, CliResult, Stage};
use crate::generator::templates::{TemplateKind, TemplateRenderer, ViewModel};
use crate::generator::{ci_config_path, manifest_path, project_path, GenerationResult};
use crate::process::{run_checked, CommandRunner, CommandSpec};
use crate::workspace;
use specsync_core::{branch_name, CommitId};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Base of every new commit branch
const REMOTE_DEFAULT: &str = "origin/HEAD";

/// Terminal outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Folder,
    Pushed { branch: String },
    /// Repo mode with nothing to commit
    Unchanged { branch: String },
    Published { package: String, version: String },
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Folder => write!(f, "written to folder"),
            Delivery::Pushed { branch } => write!(f, "pushed branch {branch}"),
            Delivery::Unchanged { branch } => write!(f, "no changes on branch {branch}"),
            Delivery::Published { package, version } => {
                write!(f, "published {package} {version}")
            }
        }
    }
}

/// A client repository checked out on the run's branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRepo {
    pub dir: PathBuf,
    pub branch: String,
    /// Branch checked out before this run, or its sha when HEAD was detached
    pub previous_branch: String,
    /// Whether the branch was created by this run
    pub created: bool,
}

pub struct OutputPublisher<'a> {
    runner: &'a dyn CommandRunner,
    renderer: &'a TemplateRenderer,
    config: &'a PipelineConfig,
}

impl<'a> OutputPublisher<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        renderer: &'a TemplateRenderer,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            runner,
            renderer,
            config,
        }
    }

    fn git(&self, stage: Stage) -> Git<'a> {
        let config: &'a PipelineConfig = self.config;
        let settings = &config.settings;
        Git::new(self.runner, &settings.tools.git, stage, settings.command_timeout())
    }

    /// Fetch the client repository and switch to the branch of `commit`.
    ///
    /// A missing branch is forked from the remote default branch, never from
    /// whatever branch an earlier run left checked out. A newly created branch
    /// registers a compensation restoring the previous
    /// branch, discarding the working tree and deleting the branch.
    pub fn prepare_client_repo(
        &self,
        commit: &CommitId,
        compensations: &mut CompensationStack,
    ) -> CliResult<ClientRepo> {
        let git = self.git(Stage::Publish);
        let dir = self.config.output_dir.clone();
        let settings = &self.config.settings;

        git.fetch_or_clone(&settings.remote_url(&self.config.client_id), &dir)?;

        let previous_branch = git.current_ref(&dir)?;
        let branch = branch_name(commit);
        let reference = format!("refs/heads/{branch}");
        let exists = git.succeeds(&dir, ["rev-parse", "--verify", "--quiet", reference.as_str()])?;

        if exists {
            info!(branch = %branch, "switching to existing branch");
            git.run(&dir, ["checkout", branch.as_str()])?;
        } else {
            info!(branch = %branch, base = REMOTE_DEFAULT, "creating branch");
            git.run(&dir, ["checkout", "-b", branch.as_str(), REMOTE_DEFAULT])?;

            let undo = self.git(Stage::Compensate);
            compensations.push(Compensation::new(
                format!("remove branch {branch} from {}", dir.display()),
                vec![
                    undo.in_dir(&dir, ["checkout", "-f", previous_branch.as_str()]),
                    undo.in_dir(&dir, ["clean", "-fd"]),
                    undo.in_dir(&dir, ["branch", "-D", branch.as_str()]),
                ],
            ));
        }

        Ok(ClientRepo {
            dir,
            branch,
            previous_branch,
            created: !exists,
        })
    }

    /// Deliver the generated output of the configured mode.
    ///
    /// `client_repo` is required in repo mode.
    pub fn publish(
        &self,
        generated: &GenerationResult,
        view: &ViewModel,
        client_repo: Option<&ClientRepo>,
    ) -> CliResult<Delivery> {
        match self.config.mode {
            Mode::Folder => Ok(Delivery::Folder),
            Mode::Repo => {
                let repo = client_repo.ok_or_else(|| {
                    CliError::Message("Client repository was not prepared".to_string())
                })?;
                self.push_repo(generated, view, repo)
            }
            Mode::Nuget => self.push_package(generated, view),
        }
    }

    fn push_repo(
        &self,
        generated: &GenerationResult,
        view: &ViewModel,
        repo: &ClientRepo,
    ) -> CliResult<Delivery> {
        let output_dir = &generated.output_dir;
        self.renderer
            .render_to_file(TemplateKind::CiConfig, view, &ci_config_path(output_dir))?;
        self.renderer.render_to_file(
            TemplateKind::PackageManifest,
            view,
            &manifest_path(output_dir, &generated.package_name),
        )?;

        let git = self.git(Stage::Publish);
        git.run(&repo.dir, ["add", "-A"])?;

        let status = git.run(&repo.dir, ["status", "--porcelain"])?;
        if status.trim().is_empty() {
            info!(branch = %repo.branch, "generated client is unchanged, nothing to push");
            return Ok(Delivery::Unchanged {
                branch: repo.branch.clone(),
            });
        }

        let message = commit_message(&self.config.spec_repo, view.commit_id.as_deref());
        git.run(&repo.dir, ["commit", "-m", message.as_str()])?;
        info!(branch = %repo.branch, "pushing branch");
        git.run(&repo.dir, ["push", "-u", "origin", repo.branch.as_str()])?;

        Ok(Delivery::Pushed {
            branch: repo.branch.clone(),
        })
    }

    fn push_package(&self, generated: &GenerationResult, view: &ViewModel) -> CliResult<Delivery> {
        let credential = self.config.credential.as_ref().ok_or_else(|| {
            CliError::Config("nuget mode requires a publish credential (API key)".to_string())
        })?;
        let version = view
            .version
            .as_deref()
            .ok_or_else(|| CliError::Message("Package version was not resolved".to_string()))?;

        let output_dir = &generated.output_dir;
        let package_name = generated.package_name.as_str();
        self.renderer.render_to_file(
            TemplateKind::PackageManifest,
            view,
            &manifest_path(output_dir, package_name),
        )?;

        let settings = &self.config.settings;
        let packages_dir = self.config.workspace.packages_dir();
        workspace::ensure(&packages_dir)?;

        info!(package = %view.nuget_package_name, version = version, "packing nuget package");
        let pack = CommandSpec::new(Stage::Publish, settings.tools.nuget.as_str())
            .arg("pack")
            .path_arg(&project_path(output_dir, package_name))
            .args(["-Build", "-Properties", "Configuration=Release", "-Version", version])
            .arg("-OutputDirectory")
            .path_arg(&packages_dir)
            .timeout(settings.codegen_timeout());
        run_checked(self.runner, &pack)?;

        let package = packages_dir.join(format!("{}.{version}.nupkg", view.nuget_package_name));
        info!(package = %package.display(), source = %settings.nuget_source, "pushing nuget package");
        let push = CommandSpec::new(Stage::Publish, settings.tools.nuget.as_str())
            .arg("push")
            .path_arg(&package)
            .arg("-ApiKey")
            .secret_arg(credential.expose())
            .args(["-Source", settings.nuget_source.as_str(), "-NonInteractive"])
            .timeout(settings.command_timeout());
        run_checked(self.runner, &push)?;

        Ok(Delivery::Published {
            package: view.nuget_package_name.clone(),
            version: version.to_string(),
        })
    }
}

fn commit_message(spec_repo: &str, commit_id: Option<&str>) -> String {
    match commit_id {
        Some(commit) => format!("Auto-generated client from {spec_repo} commit {commit}"),
        None => format!("Auto-generated client from {spec_repo}"),
    }
}
