//! Client code generation
//!
//! Source emission is delegated to an external code generator. This module
//! builds its invocation, treats its exit status as authoritative, and then
//! stamps the auxiliary files keyed by the package name.

pub mod templates;

use crate::config::{CodegenConfig, ConfigFile};
use crate::error::{CliError, CliResult, Stage};
use crate::process::{run_checked, CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use std::time::Duration;
use templates::{TemplateKind, TemplateRenderer, ViewModel};
use tracing::info;

/// Output of a successful generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub output_dir: PathBuf,
    pub package_name: String,
}

/// `<out>/src/<Package>.Test/app.config`
pub fn test_config_path(output_dir: &Path, package_name: &str) -> PathBuf {
    output_dir
        .join("src")
        .join(format!("{package_name}.Test"))
        .join("app.config")
}

/// `<out>/src/<Package>/<Package>.nuspec`
pub fn manifest_path(output_dir: &Path, package_name: &str) -> PathBuf {
    output_dir
        .join("src")
        .join(package_name)
        .join(format!("{package_name}.nuspec"))
}

/// `<out>/src/<Package>/<Package>.csproj`, as laid out by the generator
pub fn project_path(output_dir: &Path, package_name: &str) -> PathBuf {
    output_dir
        .join("src")
        .join(package_name)
        .join(format!("{package_name}.csproj"))
}

/// `<out>/appveyor.yml`
pub fn ci_config_path(output_dir: &Path) -> PathBuf {
    output_dir.join("appveyor.yml")
}

pub struct ClientGenerator<'a> {
    runner: &'a dyn CommandRunner,
    renderer: &'a TemplateRenderer,
    codegen: &'a CodegenConfig,
    git: &'a str,
    command_timeout: Duration,
    codegen_timeout: Duration,
}

impl<'a> ClientGenerator<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        renderer: &'a TemplateRenderer,
        settings: &'a ConfigFile,
    ) -> Self {
        Self {
            runner,
            renderer,
            codegen: &settings.codegen,
            git: &settings.tools.git,
            command_timeout: settings.command_timeout(),
            codegen_timeout: settings.codegen_timeout(),
        }
    }

    /// Make sure the generator artifact exists, cloning and building it if needed.
    ///
    /// Does nothing unless `codegen.artifact` is configured.
    pub fn ensure_tool(&self) -> CliResult<()> {
        let Some(ref artifact) = self.codegen.artifact else {
            return Ok(());
        };
        if artifact.exists() {
            return Ok(());
        }

        let checkout_dir = self.codegen.checkout_dir.as_ref().ok_or_else(|| {
            CliError::Config(format!(
                "Code generator {} is missing and codegen.checkoutDir is not set",
                artifact.display()
            ))
        })?;

        if !checkout_dir.exists() {
            let source = self.codegen.source_repo.as_ref().ok_or_else(|| {
                CliError::Config(format!(
                    "Code generator {} is missing and codegen.sourceRepo is not set",
                    artifact.display()
                ))
            })?;
            info!(source = %source, "cloning code generator");
            let clone = CommandSpec::new(Stage::Bootstrap, self.git)
                .args(["clone", source.as_str()])
                .path_arg(checkout_dir)
                .timeout(self.command_timeout);
            run_checked(self.runner, &clone)?;
        }

        info!(dir = %checkout_dir.display(), "building code generator");
        for step in &self.codegen.build {
            let Some((program, args)) = step.split_first() else {
                continue;
            };
            let build = CommandSpec::new(Stage::Bootstrap, program.as_str())
                .args(args.iter().cloned())
                .current_dir(checkout_dir)
                .timeout(self.codegen_timeout);
            run_checked(self.runner, &build)?;
        }

        if !artifact.exists() {
            return Err(CliError::Message(format!(
                "Code generator build finished but {} was not produced",
                artifact.display()
            )));
        }
        Ok(())
    }

    /// The generator invocation for one spec
    pub fn command(&self, spec_path: &Path, output_dir: &Path, package_name: &str) -> CommandSpec {
        CommandSpec::new(Stage::Generate, self.codegen.program.as_str())
            .args(self.codegen.args.iter().cloned())
            .args(["generate", "-i"])
            .path_arg(spec_path)
            .args(["-l", self.codegen.language.as_str(), "-o"])
            .path_arg(output_dir)
            .arg("--additional-properties")
            .arg(format!("packageName={package_name}"))
            .arg("-t")
            .path_arg(&self.codegen.template_dir)
            .timeout(self.codegen_timeout)
    }

    /// Run the generator and stamp the test project configuration.
    ///
    /// # Errors
    ///
    /// A nonzero generator exit, a timeout, or a failed template write.
    /// Nothing is stamped when the generator fails.
    pub fn generate(
        &self,
        spec_path: &Path,
        output_dir: &Path,
        view: &ViewModel,
    ) -> CliResult<GenerationResult> {
        let package_name = view.package_name.as_str();
        info!(package = package_name, output = %output_dir.display(), "generating client");

        run_checked(self.runner, &self.command(spec_path, output_dir, package_name))?;

        self.renderer.render_to_file(
            TemplateKind::TestConfig,
            view,
            &test_config_path(output_dir, package_name),
        )?;

        Ok(GenerationResult {
            output_dir: output_dir.to_path_buf(),
            package_name: package_name.to_string(),
        })
    }
}
