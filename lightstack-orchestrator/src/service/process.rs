//! Process runner
//!
//! Runs an external executable to completion, feeding it a stdin transcript
//! and capturing both output streams in full. A non-zero exit is a normal
//! result; only failing to start or talk to the process is an error.
//!
//! There is no timeout: a script that never exits blocks its caller forever.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// One external process invocation
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Written to the child's stdin, which is then closed
    pub stdin: String,
    pub working_dir: Option<PathBuf>,
    /// When set, the child sees exactly these variables; otherwise it
    /// inherits this process's environment
    pub env: Option<HashMap<String, String>>,
}

impl ProcessRequest {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
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

    pub fn stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stderr, or `fallback` when the script printed nothing
    pub fn error_message(&self, fallback: &str) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            fallback.to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs the process to completion
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &request.working_dir {
            command.current_dir(dir);
        }

        if let Some(env) = &request.env {
            command.env_clear().envs(env);
        }

        debug!(
            "Spawning {} {:?} (cwd: {:?})",
            request.program.display(),
            request.args,
            request.working_dir
        );

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to execute {}", request.program.display()))?;

        // stdin is fed while stdout and stderr are drained; a script that
        // prints a lot before reading would otherwise fill its pipe and stall.
        let stdin = child.stdin.take();
        let input = request.stdin.as_bytes();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A script may exit without reading its input; a broken pipe
                // there is not an error of the runner.
                if let Err(e) = stdin.write_all(input).await {
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output =
            output.with_context(|| format!("Failed to wait for {}", request.program.display()))?;
        fed.context("Failed to write process stdin")?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        debug!(
            "{} exited with code {}",
            request.program.display(),
            result.exit_code
        );

        Ok(result)
    }
}
