//! Spec collation: install referenced sub-specs, then flatten the
//! repository's multi-file spec into one document inside the workspace

use crate::config::PipelineConfig;
use crate::error::{CliError, CliResult, Stage};
use crate::process::{run_checked, CommandRunner, CommandSpec};
use crate::workspace::{self, Workspace};
use regex::Regex;
use serde_json::Value;
use specsync_core::SpecFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory of the spec file inside a spec repository
const SPEC_DIR: &str = "api";
const MANIFEST_FILE: &str = "package.json";

/// The normalized spec document of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatedSpec {
    pub path: PathBuf,
    pub format: SpecFormat,
}

/// A sub-spec package referenced by the spec repository's manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDependency {
    pub name: String,
    pub version: String,
}

impl SpecDependency {
    /// `name@version` as understood by npm
    pub fn install_target(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Extract `<scope>/*-spec` entries from a package.json `dependencies` map.
///
/// # Errors
///
/// Returns an error if the manifest is not valid JSON.
pub fn spec_dependencies(manifest: &str, scope: &str) -> CliResult<Vec<SpecDependency>> {
    let manifest: Value = serde_json::from_str(manifest)
        .map_err(|e| CliError::Message(format!("Failed to parse {MANIFEST_FILE}: {e}")))?;

    let pattern = Regex::new(&format!("^{}/.+-spec$", regex::escape(scope)))
        .map_err(|e| CliError::Config(format!("Invalid spec scope '{scope}': {e}")))?;

    let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    Ok(dependencies
        .iter()
        .filter(|(name, _)| pattern.is_match(name))
        .map(|(name, version)| SpecDependency {
            name: name.clone(),
            version: version
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| version.to_string()),
        })
        .collect())
}

/// Find `api/<name>.json`, falling back to `api/<name>.yaml`.
///
/// # Errors
///
/// Returns `CliError::Config` when neither exists.
pub fn locate_spec(repo_dir: &Path, name: &str) -> CliResult<(PathBuf, SpecFormat)> {
    let spec_dir = repo_dir.join(SPEC_DIR);
    SpecFormat::PREFERENCE
        .iter()
        .map(|format| (spec_dir.join(format!("{name}.{}", format.extension())), *format))
        .find(|(path, _)| path.is_file())
        .ok_or_else(|| {
            CliError::Config(format!(
                "No spec file found: expected {0}/{name}.json or {0}/{name}.yaml",
                spec_dir.display()
            ))
        })
}

/// Install sub-spec dependencies declared in the repository manifest.
pub fn install_spec_dependencies(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    repo_dir: &Path,
) -> CliResult<Vec<SpecDependency>> {
    let manifest_path = repo_dir.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        debug!(path = %manifest_path.display(), "no manifest, skipping sub-spec install");
        return Ok(Vec::new());
    }

    let manifest = fs::read_to_string(&manifest_path)?;
    let settings = &config.settings;
    let dependencies = spec_dependencies(&manifest, &settings.spec_scope)?;

    for dependency in &dependencies {
        info!(package = %dependency.install_target(), "installing sub-spec");
        let install = CommandSpec::new(Stage::Collate, settings.tools.npm.as_str())
            .args(["install", dependency.install_target().as_str()])
            .current_dir(repo_dir)
            .timeout(settings.command_timeout());
        run_checked(runner, &install)?;
    }

    Ok(dependencies)
}

/// Resolve dependencies, locate the spec and flatten it into
/// `<workspace>/swagger/<name>.<ext>`.
pub fn collate_spec(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    workspace: &Workspace,
    repo_dir: &Path,
) -> CliResult<CollatedSpec> {
    install_spec_dependencies(runner, config, repo_dir)?;

    let (source, format) = locate_spec(repo_dir, &config.spec_repo)?;
    info!(source = %source.display(), format = %format, "collating spec");

    let settings = &config.settings;
    let collate = CommandSpec::new(Stage::Collate, settings.tools.collate.as_str())
        .path_arg(&source)
        .timeout(settings.command_timeout());
    let output = run_checked(runner, &collate)?;

    if output.stdout.trim().is_empty() {
        return Err(CliError::ExternalTool {
            stage: Stage::Collate,
            program: collate.program,
            status: "exit code 0".to_string(),
            stderr: "produced an empty document".to_string(),
        });
    }

    workspace::ensure(&workspace.swagger_dir())?;
    let path = workspace.swagger_file(&config.spec_repo, format);
    fs::write(&path, output.stdout)?;

    Ok(CollatedSpec { path, format })
}
