//! Subprocess execution.
//!
//! Probes talk to system utilities (`pmset`, `pgrep`, `fdesetup`, ...) through
//! the [`CommandRunner`] trait so tests can script their output. Execution
//! never fails: a program that cannot be spawned produces a failed
//! [`CommandResult`], which probes read as "inactive".

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or never spawned).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Result for a program that could not be started at all.
    pub fn not_spawned(message: String) -> Self {
        Self::failure(None, String::new(), message, Duration::ZERO)
    }

    /// Whether stdout or stderr contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

/// Runs external programs on behalf of probes.
pub trait CommandRunner {
    /// Run `program` with `args`, capturing stdout and stderr.
    fn run(&self, program: &str, args: &[&str]) -> CommandResult;

    /// Whether an executable exists at `path`.
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// Runs programs on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandResult {
        execute(program, args)
    }
}

/// Execute a program directly (no shell), capturing its output.
pub fn execute(program: &str, args: &[&str]) -> CommandResult {
    let start = Instant::now();

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("Could not run {}: {}", program, e);
            return CommandResult::not_spawned(e.to_string());
        }
    };

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    tracing::debug!(
        "{} {:?} exited with {:?} in {:?}",
        program,
        args,
        output.status.code(),
        duration
    );

    if output.status.success() {
        CommandResult::success(stdout, stderr, duration)
    } else {
        CommandResult::failure(output.status.code(), stdout, stderr, duration)
    }
}
