//! CLI error types

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error or external command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Workspace,
    Bootstrap,
    Acquire,
    Collate,
    Version,
    Generate,
    Publish,
    Compensate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Workspace => "workspace",
            Stage::Bootstrap => "bootstrap",
            Stage::Acquire => "acquire",
            Stage::Collate => "collate",
            Stage::Version => "version",
            Stage::Generate => "generate",
            Stage::Publish => "publish",
            Stage::Compensate => "compensate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{stage} stage failed: {program} exited with {status}: {stderr}")]
    ExternalTool {
        stage: Stage,
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{stage} stage failed: {program} timed out after {secs}s")]
    Timeout {
        stage: Stage,
        program: String,
        secs: u64,
    },

    #[error("{stage} stage failed: could not start {program}: {source}")]
    Spawn {
        stage: Stage,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Spec error: {0}")]
    Spec(#[from] specsync_core::CoreError),

    #[error("Workspace error at {path}: {}", .failures.join("; "))]
    Workspace { path: String, failures: Vec<String> },

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl CliError {
    /// Stage that produced the error, when it is known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CliError::Config(_) => Some(Stage::Config),
            CliError::ExternalTool { stage, .. }
            | CliError::Timeout { stage, .. }
            | CliError::Spawn { stage, .. } => Some(*stage),
            CliError::Spec(_) => Some(Stage::Version),
            CliError::Workspace { .. } => Some(Stage::Workspace),
            _ => None,
        }
    }

    /// Process exit code: usage/configuration problems exit 2, everything else 1
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
