//! Test helpers for unit tests
//!
//! This module provides shared utilities for unit tests within the CLI crate.
//! For integration tests, see `tests/integration_test_helpers.rs`.

use crate::error::CliResult;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Guard for changing the current working directory in tests.
/// Automatically restores the original directory when dropped.
pub struct DirGuard {
    original_dir: PathBuf,
}

impl DirGuard {
    /// Create a new DirGuard and change to the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created or entered.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let original_dir = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        Ok(DirGuard { original_dir })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}

type Script = Box<dyn Fn(&CommandSpec) -> CommandOutput>;

/// `CommandRunner` that records every command and answers from a script.
///
/// The script may also perform the side effects the real tool would have
/// (creating a clone directory, writing generator output, ...).
pub struct FakeRunner {
    calls: RefCell<Vec<CommandSpec>>,
    script: Script,
}

impl FakeRunner {
    pub fn new(script: impl Fn(&CommandSpec) -> CommandOutput + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// Every command succeeds with empty output
    pub fn succeeding() -> Self {
        Self::new(|_| CommandOutput::ok(""))
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Command lines in call order, for compact assertions
    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::display).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &CommandSpec) -> CliResult<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());
        Ok((self.script)(command))
    }
}
