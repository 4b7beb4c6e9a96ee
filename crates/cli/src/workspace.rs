//! Scratch workspace management
//!
//! All intermediate artifacts of a run (cloned spec repository, collated
//! spec) live under one workspace directory:
//!
//! ```text
//! <root>/
//!   repo/<spec-repo-name>/
//!   swagger/<spec-repo-name>.<json|yaml>
//!   nupkg/<package-id>.<version>.nupkg
//! ```

use crate::error::{CliError, CliResult};
use chrono::Utc;
use specsync_core::SpecFormat;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout of one run's workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A workspace unique to this run under `base` (timestamp + pid)
    pub fn run_scoped(base: &Path) -> Self {
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        Self::new(base.join(format!("run-{stamp}-{}", std::process::id())))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    pub fn repo_dir(&self, name: &str) -> PathBuf {
        self.repos_dir().join(name)
    }

    pub fn swagger_dir(&self) -> PathBuf {
        self.root.join("swagger")
    }

    pub fn swagger_file(&self, name: &str, format: SpecFormat) -> PathBuf {
        self.swagger_dir()
            .join(format!("{name}.{}", format.extension()))
    }

    /// Where packed nuget packages are written before upload
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join("nupkg")
    }
}

/// Create `path` (and parents) if absent
pub fn ensure(path: &Path) -> CliResult<()> {
    fs::create_dir_all(path).map_err(|e| CliError::Workspace {
        path: path.display().to_string(),
        failures: vec![format!("failed to create directory: {e}")],
    })
}

/// Recursively delete `path`.
///
/// Children are removed before their parent. A missing path is a no-op.
/// Every entry that cannot be removed is recorded, the rest of the tree is
/// still attempted, and all failures are returned as one
/// `CliError::Workspace`.
pub fn destroy(path: &Path) -> CliResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(CliError::Workspace {
                path: path.display().to_string(),
                failures: vec![format!("{}: {e}", path.display())],
            })
        }
    };

    let mut failures = Vec::new();
    if metadata.is_dir() {
        remove_tree(path, &mut failures);
    } else if let Err(e) = fs::remove_file(path) {
        failures.push(format!("{}: {e}", path.display()));
    }

    if failures.is_empty() {
        debug!(path = %path.display(), "workspace removed");
        Ok(())
    } else {
        Err(CliError::Workspace {
            path: path.display().to_string(),
            failures,
        })
    }
}

fn remove_tree(dir: &Path, failures: &mut Vec<String>) {
    let before = failures.len();

    match fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        failures.push(format!("{}: {e}", dir.display()));
                        continue;
                    }
                };
                let child = entry.path();
                // file_type() does not follow symlinks, so a link to a directory is unlinked
                match entry.file_type() {
                    Ok(file_type) if file_type.is_dir() => remove_tree(&child, failures),
                    Ok(_) => {
                        if let Err(e) = fs::remove_file(&child) {
                            failures.push(format!("{}: {e}", child.display()));
                        }
                    }
                    Err(e) => failures.push(format!("{}: {e}", child.display())),
                }
            }
        }
        Err(e) => {
            failures.push(format!("{}: {e}", dir.display()));
            return;
        }
    }

    // A directory with surviving children cannot be removed
    if failures.len() == before {
        if let Err(e) = fs::remove_dir(dir) {
            failures.push(format!("{}: {e}", dir.display()));
        }
    }
}
