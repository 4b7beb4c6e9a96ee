//! Generate-from-spec command implementation
//!
//! Runs only the code generator against an already collated spec file and
//! stamps the test project configuration. No repository or package
//! interaction.

use super::report_failure;
use crate::config::{read_config, validate_identifier};
use crate::error::{CliError, CliResult};
use crate::generator::templates::{TemplateRenderer, ViewModel};
use crate::generator::{ClientGenerator, GenerationResult};
use crate::process::{CommandRunner, SystemRunner};
use std::path::{Path, PathBuf};

pub struct Options {
    pub spec_path: PathBuf,
    pub output_dir: PathBuf,
    pub package_name: String,
    pub config_path: PathBuf,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options, &SystemRunner) {
        Ok(result) => {
            println!(
                "✓ Generated {} into {}",
                result.package_name,
                result.output_dir.display()
            );
            0
        }
        Err(e) => report_failure("Client generation failed", &e),
    }
}

fn run_inner(options: &Options, runner: &dyn CommandRunner) -> CliResult<GenerationResult> {
    let settings = read_config(&options.config_path)?;
    validate_identifier("package", &options.package_name)?;
    if !options.spec_path.is_file() {
        return Err(CliError::Config(format!(
            "Spec file not found: {}",
            options.spec_path.display()
        )));
    }

    let renderer = TemplateRenderer::new(settings.templates_dir.as_deref())?;
    let generator = ClientGenerator::new(runner, &renderer, &settings);
    generator.ensure_tool()?;

    let view = ViewModel {
        package_name: options.package_name.clone(),
        nuget_package_name: options.package_name.clone(),
        spec_repo: spec_name(&options.spec_path),
        ..ViewModel::default()
    };
    generator.generate(&options.spec_path, &options.output_dir, &view)
}

fn spec_name(spec_path: &Path) -> String {
    spec_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
