//! Agent controller - the generate → execute → diagnose → retry loop
//!
//! The controller owns the conversation history and run state for one task
//! at a time: it asks the model to decompose the task and emit code, runs
//! that code, and on failure feeds the captured error back to the model
//! until the subtask succeeds or its retry budget is gone.

use tracing::{info, info_span, warn, Instrument};

use crate::agent::report::TaskReport;
use crate::exec::{CodeExecutor, CodeRunner, ExecutorError};
use crate::groq::{ChatMessage, CompletionBackend, GroqClient, ProviderError};
use crate::metrics::{RECOVERY_ROUNDS, TASK_RUNS};
use crate::protocol::parser::{extract_code, parse_subtasks, CodeSection, SubtaskSection};
use crate::protocol::prompt;

/// Configuration for the agent controller
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Select the heavier-reasoning model variant.
    pub debug_mode: bool,
    /// Failed executions allowed per subtask before the run fails.
    pub max_attempts_per_subtask: u32,
    /// Wall-clock bound for one code execution, in seconds.
    pub execution_timeout_secs: u64,
    /// Replacement for the default workflow preamble (markers are kept).
    pub system_preamble: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            max_attempts_per_subtask: 3,
            execution_timeout_secs: crate::exec::DEFAULT_TIMEOUT_SECS,
            system_preamble: None,
        }
    }
}

/// Error type for run-aborting conditions
///
/// Recoverable conditions (nonzero exits, a missing subtask list) never
/// appear here; they are absorbed by the loop. A run that merely exhausts
/// its retry budget returns `Ok` with a Failed report.
#[derive(Debug)]
pub enum AgentError {
    /// The model call failed. Surfaced immediately, never retried.
    Provider(ProviderError),
    /// A model response carried no executable code block.
    NoCodeFound,
    /// The interpreter could not be spawned at all.
    Executor(ExecutorError),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::Provider(e) => write!(f, "Provider error: {}", e),
            AgentError::NoCodeFound => write!(f, "No code found in AI response"),
            AgentError::Executor(e) => write!(f, "Executor error: {}", e),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ProviderError> for AgentError {
    fn from(e: ProviderError) -> Self {
        AgentError::Provider(e)
    }
}

impl From<ExecutorError> for AgentError {
    fn from(e: ExecutorError) -> Self {
        AgentError::Executor(e)
    }
}

/// Agent controller orchestrating model calls and code execution.
///
/// One run is strictly sequential. Run state lives on the stack of
/// [`AgentController::run_task`], so concurrent task submissions are served
/// by independent controller instances.
pub struct AgentController<P, E> {
    provider: P,
    executor: E,
    config: AgentConfig,
}

impl AgentController<GroqClient, CodeRunner> {
    /// Build a controller with the real Groq backend and python3 runner.
    ///
    /// Fails when `GROQ_API_KEY` is absent; the credential is a startup
    /// precondition, not a runtime concern.
    pub fn from_env(config: AgentConfig) -> Result<Self, ProviderError> {
        let provider = GroqClient::from_env()?;
        let executor = CodeRunner::new(config.execution_timeout_secs);
        Ok(Self::new(provider, executor, config))
    }
}

impl<P: CompletionBackend, E: CodeExecutor> AgentController<P, E> {
    pub fn new(provider: P, executor: E, config: AgentConfig) -> Self {
        Self {
            provider,
            executor,
            config,
        }
    }

    /// Run one task to a terminal state.
    ///
    /// Returns `Ok` with a Completed report, or with a Failed report when
    /// the retry budget ran out (per-subtask records preserved in both
    /// cases). Returns `Err` when the run aborts: provider failure, a
    /// response without code, or a spawn-level executor failure.
    pub async fn run_task(&self, task: &str) -> Result<TaskReport, AgentError> {
        let mut report = TaskReport::new(task);
        let root_span = info_span!("task_run", task_id = %report.task_id, task = %task);

        async {
            info!(debug_mode = self.config.debug_mode, "Starting task run");
            println!("[AGENT] Task {}: {}", report.task_id, task);

            let mut history =
                prompt::initial_prompt(task, self.config.system_preamble.as_deref());
            let mut response = self.request(&history).await?;
            history.push(ChatMessage::assistant(&response));

            let subtasks = match parse_subtasks(&response) {
                SubtaskSection::Parsed(list) if !list.is_empty() => list,
                SubtaskSection::Parsed(_) | SubtaskSection::MissingMarker => {
                    // No decomposition available: the whole task is one
                    // implicit subtask, never an endless loop.
                    warn!("No subtask list in first response, running the task as a single subtask");
                    vec![task.to_string()]
                }
            };
            info!(count = subtasks.len(), "Task decomposed");
            report.begin_subtasks(&subtasks);

            let total = subtasks.len();
            let mut index = 0;
            let mut last_output: Option<String> = None;

            while index < total {
                report.start_subtask(index);
                println!(
                    "[AGENT] Processing subtask {}/{}: {}",
                    index + 1,
                    total,
                    subtasks[index]
                );
                let mut attempts = 0u32;

                loop {
                    let code = match extract_code(&response) {
                        CodeSection::Fenced(code) => code,
                        CodeSection::MissingFence | CodeSection::UnterminatedFence => {
                            warn!(subtask = index, "Response carried no executable code");
                            TASK_RUNS.with_label_values(&["no_code"]).inc();
                            return Err(AgentError::NoCodeFound);
                        }
                    };

                    attempts += 1;
                    report.record_attempt(index);

                    let exec_span = info_span!(
                        "code_execution",
                        subtask = index,
                        attempt = attempts,
                        code_len = code.len()
                    );
                    let result = self
                        .executor
                        .execute(&code)
                        .instrument(exec_span)
                        .await
                        .map_err(|e| {
                            TASK_RUNS.with_label_values(&["spawn_error"]).inc();
                            AgentError::Executor(e)
                        })?;

                    if result.success {
                        let stdout = result.output.clone().unwrap_or_default();
                        info!(
                            subtask = index,
                            attempts,
                            duration_ms = result.duration_ms,
                            "Subtask completed"
                        );
                        println!("[AGENT] Subtask {}/{} completed", index + 1, total);
                        if !stdout.is_empty() {
                            println!("[AGENT] Output: {}", stdout.trim_end());
                        }
                        report.complete_subtask(index, result.output);
                        last_output = Some(stdout);

                        index += 1;
                        if index < total {
                            history.push(prompt::next_subtask_prompt(
                                index,
                                total,
                                &subtasks[index],
                            ));
                            response = self.request(&history).await?;
                            history.push(ChatMessage::assistant(&response));
                        }
                        break;
                    }

                    let error_text = result.error.clone().unwrap_or_default();
                    warn!(
                        subtask = index,
                        attempts,
                        timed_out = result.timed_out,
                        "Execution failed"
                    );
                    println!(
                        "[AGENT] Error in subtask {}/{} (attempt {}):\n{}",
                        index + 1,
                        total,
                        attempts,
                        error_text
                    );
                    report.note_failure(index, error_text.clone());

                    if attempts >= self.config.max_attempts_per_subtask {
                        warn!(subtask = index, attempts, "Retry budget exhausted");
                        println!(
                            "[AGENT] Giving up on subtask {}/{} after {} attempts",
                            index + 1,
                            total,
                            attempts
                        );
                        report.fail_subtask(index);
                        TASK_RUNS.with_label_values(&["failed"]).inc();
                        return Ok(report);
                    }

                    // Recovery round-trip against the same subtask.
                    RECOVERY_ROUNDS.inc();
                    history.push(prompt::repair_prompt(&code, &error_text));
                    response = self.request(&history).await?;
                    history.push(ChatMessage::assistant(&response));
                }
            }

            report.complete(last_output);
            TASK_RUNS.with_label_values(&["completed"]).inc();
            info!("All subtasks completed");
            println!("[AGENT] All subtasks completed");
            Ok(report)
        }
        .instrument(root_span)
        .await
    }

    async fn request(&self, history: &[ChatMessage]) -> Result<String, AgentError> {
        let llm_span = info_span!("llm_call", turns = history.len());
        self.provider
            .complete(history, self.config.debug_mode)
            .instrument(llm_span)
            .await
            .map_err(|e| {
                TASK_RUNS.with_label_values(&["provider_error"]).inc();
                AgentError::Provider(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AgentConfig::default();
        assert!(!config.debug_mode);
        assert_eq!(config.max_attempts_per_subtask, 3);
        assert_eq!(config.execution_timeout_secs, 30);
        assert!(config.system_preamble.is_none());
    }

    #[test]
    fn no_code_error_keeps_the_historic_message() {
        assert_eq!(
            AgentError::NoCodeFound.to_string(),
            "No code found in AI response"
        );
    }
}
