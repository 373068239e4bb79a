//! Agent module for LLM-driven task decomposition and code execution
//!
//! This module provides the agent loop that orchestrates:
//! - Groq chat completions (decomposition, code generation, error repair)
//! - structural parsing of the model's fixed response shape
//! - child-process execution of the generated code
//!
//! # Architecture
//!
//! ```text
//! User Task → AgentController → Groq /chat/completions
//!                  ↓
//!      parse subtask list + fenced code
//!                  ↓
//!      CodeRunner (python3 -c, timeout)
//!                  ↓
//!      exit 0 → record output, next subtask
//!      exit ≠0 → repair prompt, retry same subtask (bounded)
//!                  ↓
//!      TaskReport {task_id, status, subtasks, final_output}
//! ```

pub mod controller;
pub mod report;

pub use controller::{AgentConfig, AgentController, AgentError};
pub use report::{SubtaskRecord, SubtaskStatus, TaskReport, TaskStatus};
