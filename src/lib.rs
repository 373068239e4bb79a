//! Taskforge - LLM-driven task decomposition and code execution
//!
//! Takes a natural-language task, asks a Groq-hosted model to break it into
//! ordered subtasks and emit Python for each, runs that code as an isolated
//! child process, and feeds execution failures back to the model for
//! correction until the task completes or the retry budget runs out.
//!
//! # Modules
//!
//! - `agent` - the orchestration loop and run reports
//! - `groq` - Groq chat-completions client
//! - `protocol` - prompt contract and response parsing
//! - `exec` - child-process code execution
//! - `metrics` - Prometheus metrics for observability
//! - `tracing` - tracing-subscriber initialization
//!
//! # Quick Start
//!
//! ```ignore
//! use taskforge::{AgentConfig, AgentController};
//!
//! let controller = AgentController::from_env(AgentConfig::default())?;
//! let report = controller.run_task("print the number 42").await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod agent;
pub mod exec;
pub mod groq;
pub mod metrics;
pub mod protocol;
pub mod tracing;

// Re-export commonly used types at crate root for convenience
pub use agent::{
    AgentConfig, AgentController, AgentError, SubtaskRecord, SubtaskStatus, TaskReport, TaskStatus,
};
pub use exec::{CodeExecutor, CodeRunner, ExecutionResult, ExecutorError};
pub use groq::{ChatMessage, CompletionBackend, GroqClient, ProviderError};
