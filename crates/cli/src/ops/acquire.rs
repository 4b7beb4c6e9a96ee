//! Spec acquisition: a local working copy of the spec repository

use crate::config::PipelineConfig;
use crate::error::{CliError, CliResult, Stage};
use crate::process::{run_checked, CommandRunner, CommandSpec};
use crate::workspace::{self, Workspace};
use specsync_core::CommitId;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// A checked-out spec repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredSpec {
    pub repo_dir: PathBuf,
    pub commit: CommitId,
}

/// Git operations shared by spec acquisition and client repository publishing
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a str,
    stage: Stage,
    timeout: Duration,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &'a str, stage: Stage, timeout: Duration) -> Self {
        Self {
            runner,
            program,
            stage,
            timeout,
        }
    }

    /// `git -C <dir> <args...>`
    pub fn in_dir<I, S>(&self, dir: &Path, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.stage, self.program)
            .arg("-C")
            .path_arg(dir)
            .args(args)
            .timeout(self.timeout)
    }

    pub fn run<I, S>(&self, dir: &Path, args: I) -> CliResult<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output = run_checked(self.runner, &self.in_dir(dir, args))?;
        Ok(output.stdout)
    }

    /// Run a query whose nonzero exit means "no"
    pub fn succeeds<I, S>(&self, dir: &Path, args: I) -> CliResult<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.runner.run(&self.in_dir(dir, args))?.success)
    }

    /// Clone `url` into `dir` when there is no working copy yet, pull otherwise
    pub fn sync(&self, url: &str, dir: &Path) -> CliResult<()> {
        if dir.join(".git").exists() {
            info!(dir = %dir.display(), "pulling latest revision");
            self.run(dir, ["pull", "--ff-only"])?;
        } else {
            self.clone_into(url, dir)?;
        }
        Ok(())
    }

    /// Clone `url` into `dir` when there is no working copy yet, otherwise
    /// fetch and refresh `origin/HEAD`. The checked-out branch is left alone.
    pub fn fetch_or_clone(&self, url: &str, dir: &Path) -> CliResult<()> {
        if dir.join(".git").exists() {
            info!(dir = %dir.display(), "fetching remote");
            self.run(dir, ["fetch", "origin", "--prune"])?;
            self.run(dir, ["remote", "set-head", "origin", "--auto"])?;
            Ok(())
        } else {
            self.clone_into(url, dir)
        }
    }

    fn clone_into(&self, url: &str, dir: &Path) -> CliResult<()> {
        if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            workspace::ensure(parent)?;
        }
        info!(url = %url, dir = %dir.display(), "cloning repository");
        let clone = CommandSpec::new(self.stage, self.program)
            .args(["clone", url])
            .path_arg(dir)
            .timeout(self.timeout);
        run_checked(self.runner, &clone)?;
        Ok(())
    }

    /// Branch checked out in `dir`, or the commit sha when HEAD is detached
    pub fn current_ref(&self, dir: &Path) -> CliResult<String> {
        let branch = self.run(dir, ["rev-parse", "--abbrev-ref", "HEAD"])?;
        let branch = branch.trim();
        if branch != "HEAD" {
            return Ok(branch.to_string());
        }
        Ok(self.head(dir)?.full().to_string())
    }

    /// Commit id of HEAD
    pub fn head(&self, dir: &Path) -> CliResult<CommitId> {
        let stdout = self.run(dir, ["rev-parse", "HEAD"])?;
        CommitId::parse(&stdout).ok_or_else(|| {
            CliError::Message(format!(
                "Could not resolve HEAD of {}: unexpected output '{}'",
                dir.display(),
                stdout.trim()
            ))
        })
    }
}

/// Clone or update the spec repository inside the workspace and resolve HEAD.
pub fn acquire_spec(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    workspace: &Workspace,
) -> CliResult<AcquiredSpec> {
    let settings = &config.settings;
    let git = Git::new(runner, &settings.tools.git, Stage::Acquire, settings.command_timeout());
    let repo_dir = workspace.repo_dir(&config.spec_repo);

    git.sync(&settings.remote_url(&config.spec_repo), &repo_dir)?;
    let commit = git.head(&repo_dir)?;
    info!(repo = %config.spec_repo, commit = %commit, "spec repository ready");

    Ok(AcquiredSpec { repo_dir, commit })
}
