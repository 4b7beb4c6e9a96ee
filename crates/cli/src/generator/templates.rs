//! Template rendering for the small artifacts stamped into generated output
//!
//! Default templates are embedded in the binary. A `templatesDir` override
//! directory may replace any of them by file name.

use crate::error::{CliError, CliResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

/// The artifacts the pipeline knows how to stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Test project configuration (`app.config`)
    TestConfig,
    /// Package manifest (`.nuspec`)
    PackageManifest,
    /// CI configuration (`appveyor.yml`)
    CiConfig,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::TestConfig,
        TemplateKind::PackageManifest,
        TemplateKind::CiConfig,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::TestConfig => "app.config.tera",
            TemplateKind::PackageManifest => "package.nuspec.tera",
            TemplateKind::CiConfig => "appveyor.yml.tera",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            TemplateKind::TestConfig => include_str!("templates/app.config.tera"),
            TemplateKind::PackageManifest => include_str!("templates/package.nuspec.tera"),
            TemplateKind::CiConfig => include_str!("templates/appveyor.yml.tera"),
        }
    }
}

/// Values available to every template
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewModel {
    pub package_name: String,
    pub nuget_package_name: String,
    pub spec_repo: String,
    pub version: Option<String>,
    pub commit_id: Option<String>,
}

pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load the embedded templates, replacing any found in `override_dir`.
    pub fn new(override_dir: Option<&Path>) -> CliResult<Self> {
        let mut tera = Tera::default();
        // Output is XML/YAML consumed by tools, not HTML
        tera.autoescape_on(vec![]);

        for kind in TemplateKind::ALL {
            let overridden = override_dir
                .map(|dir| dir.join(kind.file_name()))
                .filter(|path| path.is_file());

            let source = match overridden {
                Some(path) => {
                    debug!(template = kind.file_name(), path = %path.display(), "using template override");
                    fs::read_to_string(&path).map_err(|e| {
                        CliError::Template(format!(
                            "Failed to read template {}: {e}",
                            path.display()
                        ))
                    })?
                }
                None => kind.embedded().to_string(),
            };

            tera.add_raw_template(kind.file_name(), &source)
                .map_err(|e| {
                    CliError::Template(format!(
                        "Failed to load template {}: {e}",
                        kind.file_name()
                    ))
                })?;
        }

        Ok(Self { tera })
    }

    pub fn render(&self, kind: TemplateKind, view: &ViewModel) -> CliResult<String> {
        let context = Context::from_serialize(view).map_err(|e| {
            CliError::Template(format!("Failed to build template context: {e}"))
        })?;
        self.tera
            .render(kind.file_name(), &context)
            .map_err(|e| {
                CliError::Template(format!("Failed to render {}: {e}", kind.file_name()))
            })
    }

    /// Render `kind` and overwrite `target`, creating parent directories.
    pub fn render_to_file(
        &self,
        kind: TemplateKind,
        view: &ViewModel,
        target: &Path,
    ) -> CliResult<()> {
        let content = self.render(kind, view)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, content).map_err(|e| {
            CliError::Template(format!("Failed to write {}: {e}", target.display()))
        })?;
        debug!(template = kind.file_name(), target = %target.display(), "stamped template");
        Ok(())
    }
}
