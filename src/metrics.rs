//! Prometheus metrics for observability
//!
//! Registered once in the default registry; exposition is left to whatever
//! wraps the library (scrape endpoint, push, or log dump).

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};

lazy_static! {
    /// Task runs by terminal status: completed, failed, provider_error,
    /// no_code, spawn_error.
    pub static ref TASK_RUNS: IntCounterVec = register_int_counter_vec!(
        "taskforge_task_runs_total",
        "Task runs by terminal status",
        &["status"]
    )
    .unwrap();

    /// Model call latency per model.
    pub static ref LLM_CALL_TIME: HistogramVec = register_histogram_vec!(
        "taskforge_llm_call_seconds",
        "Model call latency by model",
        &["model"]
    )
    .unwrap();

    /// Code executions by outcome: success, error, timeout, spawn_error.
    pub static ref CODE_EXECUTIONS: IntCounterVec = register_int_counter_vec!(
        "taskforge_code_executions_total",
        "Code executions by outcome",
        &["status"]
    )
    .unwrap();

    /// Wall-clock duration of code executions.
    pub static ref CODE_EXECUTION_DURATION: Histogram = register_histogram!(
        "taskforge_code_execution_seconds",
        "Code execution wall-clock duration"
    )
    .unwrap();

    /// Error-recovery round-trips sent to the model.
    pub static ref RECOVERY_ROUNDS: IntCounter = register_int_counter!(
        "taskforge_recovery_rounds_total",
        "Error-recovery round-trips sent to the model"
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_exactly_once() {
        TASK_RUNS.with_label_values(&["completed"]).inc();
        LLM_CALL_TIME.with_label_values(&["test-model"]).observe(0.1);
        CODE_EXECUTIONS.with_label_values(&["success"]).inc();
        CODE_EXECUTION_DURATION.observe(0.1);
        RECOVERY_ROUNDS.inc();

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|family| family.get_name() == "taskforge_task_runs_total"));
    }
}
