//! Run reports
//!
//! `TaskReport` is the externally-facing record of one run: per-subtask
//! status recorded as it happens, so a failed run still shows which
//! subtasks completed before the failure. Serializes directly to the shape
//! a wrapping API layer would expose.

use serde::{Deserialize, Serialize};

/// Terminal and in-flight statuses of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Error,
}

/// Status of one subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Record of one subtask's progress through the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskRecord {
    pub description: String,
    pub status: SubtaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
}

/// Result of one task run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// Unique run id (UUIDv7, time-sortable).
    pub task_id: String,
    /// The original natural-language objective.
    pub task: String,
    pub status: TaskStatus,
    pub subtasks: Vec<SubtaskRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_output: Option<String>,
    /// Human-readable detail when the run aborted (`status == Error`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::now_v7().to_string(),
            task: task.into(),
            status: TaskStatus::Pending,
            subtasks: Vec::new(),
            final_output: None,
            error: None,
        }
    }

    /// Report for a run that aborted before producing any record.
    pub fn errored(task: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut report = Self::new(task);
        report.status = TaskStatus::Error;
        report.error = Some(detail.into());
        report
    }

    /// Register the decomposed subtask list and move the run in progress.
    pub fn begin_subtasks(&mut self, descriptions: &[String]) {
        self.status = TaskStatus::InProgress;
        self.subtasks = descriptions
            .iter()
            .map(|description| SubtaskRecord {
                description: description.clone(),
                status: SubtaskStatus::Pending,
                output: None,
                error: None,
                attempts: 0,
            })
            .collect();
    }

    pub fn start_subtask(&mut self, index: usize) {
        self.subtasks[index].status = SubtaskStatus::InProgress;
    }

    pub fn record_attempt(&mut self, index: usize) {
        self.subtasks[index].attempts += 1;
    }

    /// Note a failed attempt; the subtask stays in progress while the
    /// recovery loop retries it.
    pub fn note_failure(&mut self, index: usize, error: impl Into<String>) {
        self.subtasks[index].error = Some(error.into());
    }

    /// Mark a subtask done. A successful retry clears earlier error text.
    pub fn complete_subtask(&mut self, index: usize, output: Option<String>) {
        let record = &mut self.subtasks[index];
        record.status = SubtaskStatus::Completed;
        record.output = output;
        record.error = None;
    }

    /// Mark the current subtask and the whole run failed.
    pub fn fail_subtask(&mut self, index: usize) {
        self.subtasks[index].status = SubtaskStatus::Failed;
        self.status = TaskStatus::Failed;
    }

    pub fn complete(&mut self, final_output: Option<String>) {
        self.status = TaskStatus::Completed;
        self.final_output = final_output;
    }

    /// Error text of the last failing subtask, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.subtasks
            .iter()
            .rev()
            .find_map(|record| record.error.as_deref())
    }
}
