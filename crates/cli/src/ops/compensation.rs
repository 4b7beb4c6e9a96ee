//! Compensating actions for external side effects
//!
//! A stage that changes state outside the workspace (creating a branch in a
//! client repository) registers the commands that undo it. When the run
//! aborts, registered compensations run newest first. They are best-effort:
//! a failing compensation is logged and the remaining ones still run.

use crate::process::{CommandRunner, CommandSpec};
use tracing::{info, warn};

/// Commands undoing one side effect, run in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compensation {
    pub description: String,
    pub commands: Vec<CommandSpec>,
}

impl Compensation {
    pub fn new(description: impl Into<String>, commands: Vec<CommandSpec>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }

    /// Run every command; returns `false` if any of them failed
    fn run(&self, runner: &dyn CommandRunner) -> bool {
        let mut clean = true;
        for command in &self.commands {
            match runner.run(command) {
                Ok(output) if output.success => {}
                Ok(output) => {
                    clean = false;
                    warn!(
                        compensation = %self.description,
                        command = %command.display(),
                        code = ?output.code,
                        stderr = %output.stderr.trim(),
                        "compensating command failed"
                    );
                }
                Err(e) => {
                    clean = false;
                    warn!(
                        compensation = %self.description,
                        command = %command.display(),
                        error = %e,
                        "compensating command could not run"
                    );
                }
            }
        }
        clean
    }
}

#[derive(Debug, Default)]
pub struct CompensationStack {
    entries: Vec<Compensation>,
}

impl CompensationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, compensation: Compensation) {
        info!(compensation = %compensation.description, "registered compensation");
        self.entries.push(compensation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run all compensations in LIFO order and empty the stack.
    ///
    /// Returns the descriptions of compensations that did not complete cleanly.
    pub fn unwind(&mut self, runner: &dyn CommandRunner) -> Vec<String> {
        let mut incomplete = Vec::new();
        while let Some(compensation) = self.entries.pop() {
            info!(compensation = %compensation.description, "running compensation");
            if !compensation.run(runner) {
                incomplete.push(compensation.description);
            }
        }
        incomplete
    }
}
