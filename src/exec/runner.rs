//! Child-process code execution
//!
//! Generated code runs as a freshly spawned interpreter invocation with
//! captured stdout/stderr. A child's failure is data for the recovery loop,
//! never a crash of the orchestrator; only a spawn-level host problem (the
//! interpreter itself missing) surfaces as an error.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::metrics::{CODE_EXECUTIONS, CODE_EXECUTION_DURATION};

/// Default wall-clock bound for one execution.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of one execution attempt.
///
/// Exactly one of `output`/`error` is populated, according to `success`.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub exit_code: i32,
    pub duration_ms: f64,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn succeeded(stdout: String, duration_ms: f64) -> Self {
        Self {
            success: true,
            output: Some(stdout),
            error: None,
            exit_code: 0,
            duration_ms,
            timed_out: false,
        }
    }

    pub fn failed(stderr: &str, exit_code: i32, duration_ms: f64, timed_out: bool) -> Self {
        Self {
            success: false,
            output: None,
            // The shape the repair prompt embeds.
            error: Some(format!("{}\nExit code: {}", stderr, exit_code)),
            exit_code,
            duration_ms,
            timed_out,
        }
    }
}

/// Error type for executor operations
#[derive(Debug)]
pub enum ExecutorError {
    /// The interpreter process could not be spawned at all.
    Spawn(std::io::Error),
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::Spawn(e) => write!(f, "Failed to spawn interpreter: {}", e),
        }
    }
}

impl std::error::Error for ExecutorError {}

impl From<std::io::Error> for ExecutorError {
    fn from(e: std::io::Error) -> Self {
        ExecutorError::Spawn(e)
    }
}

/// The process-execution seam consumed by the orchestrator.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutorError>;
}

/// Runs code strings through an interpreter child process.
#[derive(Debug, Clone)]
pub struct CodeRunner {
    interpreter: String,
    exec_flag: String,
    timeout: Duration,
}

impl CodeRunner {
    /// Create a runner for `python3 -c <code>` with the given timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_interpreter("python3", "-c", timeout_secs)
    }

    /// Create a runner for an arbitrary interpreter and inline-exec flag.
    pub fn with_interpreter(
        interpreter: impl Into<String>,
        exec_flag: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            exec_flag: exec_flag.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl CodeExecutor for CodeRunner {
    async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecutorError> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.exec_flag)
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child must not outlive the timeout.
            .kill_on_drop(true);

        let result = timeout(self.timeout, cmd.output()).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                CODE_EXECUTION_DURATION.observe(duration_ms / 1000.0);
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                    debug!(exit_code, duration_ms, "Execution succeeded");
                    CODE_EXECUTIONS.with_label_values(&["success"]).inc();
                    Ok(ExecutionResult::succeeded(stdout, duration_ms))
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    debug!(exit_code, duration_ms, "Execution failed");
                    CODE_EXECUTIONS.with_label_values(&["error"]).inc();
                    Ok(ExecutionResult::failed(&stderr, exit_code, duration_ms, false))
                }
            }
            Ok(Err(e)) => {
                CODE_EXECUTIONS.with_label_values(&["spawn_error"]).inc();
                Err(ExecutorError::Spawn(e))
            }
            Err(_) => {
                // Timeout elapsed; dropping the output future kills the child.
                warn!(timeout_secs = self.timeout.as_secs(), "Execution timed out");
                CODE_EXECUTIONS.with_label_values(&["timeout"]).inc();
                Ok(ExecutionResult::failed("Execution timed out", -1, duration_ms, true))
            }
        }
    }
}
