//! Run configuration
//!
//! `ConfigFile` is the optional `.specsync/config.yaml`; `PipelineConfig` is
//! built once per run from it plus the command line and handed to every
//! stage.

use crate::error::{CliError, CliResult};
use crate::workspace::Workspace;
use serde::Deserialize;
use specsync_core::{to_package_name, SuffixPolicy};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = ".specsync/config.yaml";

/// Settings for the external code generator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodegenConfig {
    pub program: String,
    pub args: Vec<String>,
    pub language: String,
    pub template_dir: PathBuf,
    /// When set and missing on disk, the generator is bootstrapped first
    pub artifact: Option<PathBuf>,
    pub source_repo: Option<String>,
    pub checkout_dir: Option<PathBuf>,
    /// Build commands run inside `checkout_dir`, each `[program, args...]`
    pub build: Vec<Vec<String>>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-jar".to_string(),
                "../swagger-codegen/modules/swagger-codegen-cli/target/swagger-codegen-cli.jar"
                    .to_string(),
            ],
            language: "csharp".to_string(),
            template_dir: PathBuf::from("./templates"),
            artifact: None,
            source_repo: None,
            checkout_dir: None,
            build: Vec::new(),
        }
    }
}

/// Program names of the external tools
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub git: String,
    pub npm: String,
    pub collate: String,
    pub nuget: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            npm: "npm".to_string(),
            collate: "swagger-pack".to_string(),
            nuget: "nuget".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutConfig {
    pub command_secs: u64,
    pub codegen_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_secs: 600,
            codegen_secs: 1800,
        }
    }
}

/// Full config file structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    /// Dependency scope whose `*-spec` packages are installed before collation
    pub spec_scope: String,
    pub git_remote: String,
    pub output_root: PathBuf,
    pub workspace_root: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub keep_workspace_on_failure: bool,
    pub api_suffix: String,
    pub client_suffix: String,
    pub nuget_source: String,
    pub codegen: CodegenConfig,
    pub tools: ToolsConfig,
    pub timeouts: TimeoutConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            spec_scope: "@gasbuddy".to_string(),
            git_remote: "git@github.com:gasbuddy".to_string(),
            output_root: PathBuf::from(".."),
            workspace_root: PathBuf::from("temp"),
            templates_dir: None,
            keep_workspace_on_failure: true,
            api_suffix: "-api".to_string(),
            client_suffix: "-client".to_string(),
            nuget_source: "https://api.nuget.org/v3/index.json".to_string(),
            codegen: CodegenConfig::default(),
            tools: ToolsConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Remote URL of a repository named `name`
    pub fn remote_url(&self, name: &str) -> String {
        format!("{}/{name}.git", self.git_remote.trim_end_matches('/'))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.command_secs)
    }

    pub fn codegen_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.codegen_secs)
    }
}

/// Read the config file; a missing file yields the defaults.
///
/// # Errors
///
/// Returns `CliError::Config` if the file can't be read or parsed.
pub fn read_config(config_path: &Path) -> CliResult<ConfigFile> {
    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        CliError::Config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&content).map_err(|e| {
        CliError::Config(format!(
            "Failed to parse config file {}: {e}",
            config_path.display()
        ))
    })
}

/// Delivery mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Folder,
    Repo,
    Nuget,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Folder => "folder",
            Mode::Repo => "repo",
            Mode::Nuget => "nuget",
        }
    }

    /// How the client identifier is derived from the spec repository name
    pub fn suffix_policy(self, settings: &ConfigFile) -> SuffixPolicy {
        match self {
            Mode::Folder | Mode::Nuget => SuffixPolicy::Append(settings.client_suffix.clone()),
            Mode::Repo => SuffixPolicy::Replace {
                from: settings.api_suffix.clone(),
                to: settings.client_suffix.clone(),
            },
        }
    }

    pub fn requires_credential(self) -> bool {
        matches!(self, Mode::Nuget)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publish credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Command-line inputs of a pipeline run
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub mode: Mode,
    pub spec_repo: String,
    pub credential: Option<String>,
    pub output: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
}

/// Immutable configuration of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub spec_repo: String,
    /// Hyphenated name of the client repository / output folder
    pub client_id: String,
    pub package_name: String,
    pub output_dir: PathBuf,
    pub credential: Option<Credential>,
    pub workspace: Workspace,
    pub settings: ConfigFile,
}

impl PipelineConfig {
    /// Build and validate the configuration of a run.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if any field required by the mode is
    /// missing or invalid. Nothing is touched on disk.
    pub fn from_args(args: RunArgs, settings: ConfigFile) -> CliResult<Self> {
        let spec_repo = args.spec_repo.trim().to_string();
        validate_identifier("spec repository", &spec_repo)?;

        let client_id = args.mode.suffix_policy(&settings).apply(&spec_repo);
        let package_name = to_package_name(&client_id);

        let output_dir = match (args.mode, args.output) {
            (Mode::Folder, Some(output)) => output,
            (_, Some(_)) => {
                return Err(CliError::Config(format!(
                    "--output is only supported in folder mode, not {} mode",
                    args.mode
                )))
            }
            (_, None) => settings.output_root.join(&client_id),
        };

        let workspace = match args.workspace {
            Some(root) => Workspace::new(root),
            None => Workspace::run_scoped(&settings.workspace_root),
        };

        let config = Self {
            mode: args.mode,
            spec_repo,
            client_id,
            package_name,
            output_dir,
            credential: args.credential.map(Credential::new),
            workspace,
            settings,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every mode-dependent requirement.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` describing the first problem found.
    pub fn validate(&self) -> CliResult<()> {
        validate_identifier("spec repository", &self.spec_repo)?;
        validate_identifier("client repository", &self.client_id)?;

        if self.package_name.is_empty() {
            return Err(CliError::Config("Package name is empty".to_string()));
        }

        if self.mode.requires_credential() {
            let present = self
                .credential
                .as_ref()
                .is_some_and(|c| !c.expose().trim().is_empty());
            if !present {
                return Err(CliError::Config(format!(
                    "{} mode requires a publish credential (API key)",
                    self.mode
                )));
            }
        }

        let settings = &self.settings;
        if settings.timeouts.command_secs == 0 || settings.timeouts.codegen_secs == 0 {
            return Err(CliError::Config(
                "Timeouts must be greater than zero seconds".to_string(),
            ));
        }
        if settings.codegen.program.trim().is_empty() {
            return Err(CliError::Config(
                "codegen.program must not be empty".to_string(),
            ));
        }
        if self.mode == Mode::Repo && settings.git_remote.trim().is_empty() {
            return Err(CliError::Config(
                "gitRemote must be set to push to a client repository".to_string(),
            ));
        }
        if let Some(command) = settings.codegen.build.iter().find(|c| c.is_empty()) {
            return Err(CliError::Config(format!(
                "codegen.build contains an empty command: {command:?}"
            )));
        }

        self.validate_workspace_placement()
    }

    /// The workspace is deleted after every successful run, so it must not
    /// contain the delivered output or the directory the tool runs from.
    fn validate_workspace_placement(&self) -> CliResult<()> {
        let cwd = std::env::current_dir().map_err(|e| {
            CliError::Config(format!("Cannot resolve the current directory: {e}"))
        })?;
        let root = absolute(self.workspace.root(), &cwd);

        let protected = [
            ("output directory", absolute(&self.output_dir, &cwd)),
            ("outputRoot", absolute(&self.settings.output_root, &cwd)),
            ("current directory", cwd.clone()),
        ];
        for (what, path) in protected {
            if path.starts_with(&root) {
                return Err(CliError::Config(format!(
                    "Workspace {} must not contain the {what} {}",
                    self.workspace.root().display(),
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// `path` made absolute against `cwd` with `.` and `..` resolved lexically
fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Identifiers become path segments and command arguments: keep them plain.
pub(crate) fn validate_identifier(what: &str, value: &str) -> CliResult<()> {
    if value.is_empty() {
        return Err(CliError::Config(format!("{what} name is required")));
    }
    if value.starts_with('-') || value.starts_with('.') {
        return Err(CliError::Config(format!(
            "{what} name '{value}' must not start with '-' or '.'"
        )));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(CliError::Config(format!(
            "{what} name '{value}' contains invalid character '{bad}'"
        )));
    }
    Ok(())
}
