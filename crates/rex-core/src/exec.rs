//! Blocking command execution with typed failure classification.
//!
//! Spawns a command, waits for completion while buffering both output
//! streams fully into memory, and converts an unacceptable exit status
//! into [`ExecError::ExitStatus`] carrying the command, exit code, and
//! both captured streams, so failures stay debuggable after the fact.
//!
//! A single attempt only: no retry and no timeout here. Wrapping a call
//! in [`crate::retry`] is the caller's composition choice.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Command to execute: either a shell line (run through `sh -c`) or an
/// argument vector spawned directly, without shell interpretation.
#[derive(Debug, Clone)]
pub enum CommandLine {
    Shell(String),
    Args(Vec<String>),
}

impl CommandLine {
    pub fn shell(line: impl Into<String>) -> Self {
        CommandLine::Shell(line.into())
    }

    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::Args(args.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Shell(line) => f.write_str(line),
            CommandLine::Args(args) => f.write_str(&args.join(" ")),
        }
    }
}

/// Pass-through execution options.
///
/// The proxy is injected into the child environment per call; process
/// globals are never mutated, so concurrent executions with different
/// proxies cannot observe each other.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Working directory for the child. Inherited when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment entries set on the child.
    pub env: HashMap<String, String>,
    /// HTTP proxy exported as `http_proxy`/`https_proxy` to the child.
    pub http_proxy: Option<String>,
    /// Exit codes treated as success.
    pub ok_codes: Vec<i32>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: HashMap::new(),
            http_proxy: None,
            ok_codes: vec![0],
        }
    }
}

/// Captured result of one completed command. Immutable after capture.
#[derive(Debug, Clone)]
pub struct Output {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub code: i32,
}

impl Output {
    /// Captured stdout, lossily decoded as UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr, lossily decoded as UTF-8.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Failure of a single command execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// The process ran but exited with a code outside the acceptable set.
    /// Carries both captured streams verbatim.
    #[error("`{command}` exited with code {code}")]
    ExitStatus {
        command: String,
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

/// Runs a command to completion, buffering both output streams.
///
/// Returns the captured output when the exit code is in
/// `opts.ok_codes`; otherwise fails with [`ExecError::ExitStatus`]. A
/// child killed by a signal reports exit code `-1`.
pub fn run_command(cmd: &CommandLine, opts: &ExecOptions) -> Result<Output, ExecError> {
    tracing::debug!(command = %cmd, "running command");

    let mut child = match cmd {
        CommandLine::Shell(line) => {
            let mut c = Command::new("sh");
            c.arg("-c").arg(line);
            c
        }
        CommandLine::Args(args) => {
            let (program, rest) = args.split_first().ok_or_else(|| ExecError::Spawn {
                command: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"),
            })?;
            let mut c = Command::new(program);
            c.args(rest);
            c
        }
    };

    if let Some(dir) = &opts.cwd {
        child.current_dir(dir);
    }
    for (key, value) in &opts.env {
        child.env(key, value);
    }
    if let Some(proxy) = &opts.http_proxy {
        child.env("http_proxy", proxy);
        child.env("https_proxy", proxy);
    }

    let out = child.output().map_err(|e| ExecError::Spawn {
        command: cmd.to_string(),
        source: e,
    })?;

    // code() is None when the child was killed by a signal.
    let code = out.status.code().unwrap_or(-1);
    tracing::debug!(
        code,
        stdout_bytes = out.stdout.len(),
        stderr_bytes = out.stderr.len(),
        "command finished"
    );

    if !opts.ok_codes.contains(&code) {
        return Err(ExecError::ExitStatus {
            command: cmd.to_string(),
            code,
            stdout: out.stdout,
            stderr: out.stderr,
        });
    }

    Ok(Output {
        stdout: out.stdout,
        stderr: out.stderr,
        code,
    })
}
