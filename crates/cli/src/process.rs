//! Typed external command execution
//!
//! Every external tool (git, npm, the collation tool, the code generator,
//! nuget) is described by a [`CommandSpec`] and executed through a
//! [`CommandRunner`]. No shell is involved: arguments are passed to the
//! program verbatim.

use crate::error::{CliError, CliResult, Stage};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const REDACTED: &str = "***";

/// Program, arguments, working directory and timeout of one external call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub stage: Stage,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
    secret_args: Vec<usize>,
}

impl CommandSpec {
    pub fn new(stage: Stage, program: impl Into<String>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Add an argument that must never show up in logs or errors
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line with secret arguments redacted
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for (index, arg) in self.args.iter().enumerate() {
            line.push(' ');
            if self.secret_args.contains(&index) {
                line.push_str(REDACTED);
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_status(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }
    }

    fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "no exit code (terminated by signal)".to_string(),
        }
    }
}

#[cfg(test)]
impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes external commands
pub trait CommandRunner {
    /// Run a command to completion.
    ///
    /// A nonzero exit is reported through `CommandOutput::success`; only
    /// spawn failures and timeouts are errors here.
    fn run(&self, command: &CommandSpec) -> CliResult<CommandOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> CliResult<CommandOutput> {
        debug!(stage = %command.stage, command = %command.display(), "running external command");

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref cwd) = command.cwd {
            process.current_dir(cwd);
        }

        let mut child = process.spawn().map_err(|source| CliError::Spawn {
            stage: command.stage,
            program: command.program.clone(),
            source,
        })?;

        // Both pipes are drained concurrently with the wait
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(command.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CliError::Timeout {
                    stage: command.stage,
                    program: command.program.clone(),
                    secs: command.timeout.as_secs(),
                });
            }
        };

        let stdout = stdout.map(join_drain).unwrap_or_default();
        let stderr = stderr.map(join_drain).unwrap_or_default();
        let output = CommandOutput::from_status(status, stdout, stderr);
        debug!(stage = %command.stage, program = %command.program, code = ?output.code, "external command finished");
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = reader.read_to_end(&mut buffer);
        buffer
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

/// Run a command and turn a nonzero exit into `CliError::ExternalTool`
pub fn run_checked(runner: &dyn CommandRunner, command: &CommandSpec) -> CliResult<CommandOutput> {
    let output = runner.run(command)?;
    if !output.success {
        let stderr = output.stderr.trim();
        return Err(CliError::ExternalTool {
            stage: command.stage,
            program: command.program.clone(),
            status: output.status_text(),
            stderr: if stderr.is_empty() {
                output.stdout.trim().to_string()
            } else {
                stderr.to_string()
            },
        });
    }
    Ok(output)
}
