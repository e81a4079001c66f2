
use itertools::Itertools;
use log::{debug, error};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("failed to launch {program}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error
    },
    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String
    },
}

/// A fully specified child process call
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ToolInvocation {
    /// Program name or path
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, inherited if None
    pub cwd: Option<PathBuf>
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            cwd: None
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        let value = path.to_string_lossy().into_owned();
        self.arg(value)
    }

    pub fn current_dir(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }

    /// The value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args.iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(|s| s.as_str())
    }

    /// Human readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .join(" ")
    }
}

/// Captured result of a finished child process
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ToolOutput {
    /// Exit code; None if the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String
}

impl ToolOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new()
        }
    }

    /// Failed output with the given code and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into()
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Converts a non-zero exit into an error, logging stderr either way
    /// # Arguments
    /// * `program` - label used in logs and the error
    pub fn into_checked(self, program: &str) -> Result<Self, ToolError> {
        if self.success() {
            if !self.stderr.trim().is_empty() {
                debug!("{program} stderr: {}", self.stderr.trim());
            }
            Ok(self)
        } else {
            let status = match self.status {
                Some(code) => format!("exit code {code}"),
                None => "a signal".to_string()
            };
            error!("{program} failed with {status}");
            if !self.stdout.trim().is_empty() {
                error!("{program} stdout: {}", self.stdout.trim());
            }
            if !self.stderr.trim().is_empty() {
                error!("{program} stderr: {}", self.stderr.trim());
            }
            Err(ToolError::NonZeroExit {
                program: program.to_string(),
                status,
                stderr: self.stderr.trim().to_string()
            })
        }
    }
}

/// The seam between pipeline logic and child processes.
/// Implementations block until the process exits; there is no timeout.
pub trait ToolRunner {
    /// Runs the invocation to completion and captures its output.
    /// A non-zero exit is NOT an error at this level.
    /// # Errors
    /// * if the program cannot be launched
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;

    /// Runs the invocation and turns a non-zero exit into an error
    fn run_checked(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.run(invocation)?.into_checked(&invocation.program)
    }
}

/// Runs real processes via `std::process::Command`
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        debug!("Running: {}", invocation.command_line());
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = invocation.cwd.as_deref() {
            command.current_dir(cwd);
        }

        let output = command.output()
            .map_err(|source| ToolError::Launch {
                program: invocation.program.clone(),
                source
            })?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned()
        })
    }
}

/// Checks that a program can be launched and returns the first line of its version output
/// # Arguments
/// * `runner` - the runner to use
/// * `program` - the program to probe, called with `--version`
pub fn probe_tool(runner: &dyn ToolRunner, program: &str) -> Result<String, ToolError> {
    let output = runner.run_checked(&ToolInvocation::new(program).arg("--version"))?;
    let first_line = output.stdout.lines()
        .chain(output.stderr.lines())
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(first_line)
}
