//! Clean command implementation
//!
//! Removes the workspace root, including workspaces kept after aborted runs.

use super::report_failure;
use crate::config::read_config;
use crate::error::CliResult;
use crate::workspace;
use std::path::PathBuf;

pub struct Options {
    pub workspace: Option<PathBuf>,
    pub config_path: PathBuf,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok((path, true)) => {
            println!("✓ Removed workspace {}", path.display());
            0
        }
        Ok((path, false)) => {
            println!("✓ Nothing to clean at {}", path.display());
            0
        }
        Err(e) => report_failure("Workspace cleanup failed", &e),
    }
}

/// Returns the workspace path and whether anything was removed
fn run_inner(options: &Options) -> CliResult<(PathBuf, bool)> {
    let path = match options.workspace {
        Some(ref path) => path.clone(),
        None => read_config(&options.config_path)?.workspace_root,
    };
    let existed = path.exists();
    workspace::destroy(&path)?;
    Ok((path, existed))
}
