//! Sandboxed execution of generated code
//!
//! Isolation is a fresh child process per attempt, nothing stronger: the
//! code runs with the host's privileges and filesystem. The wall-clock
//! timeout with forced termination is the one hard bound.

pub mod runner;

pub use runner::{
    CodeExecutor, CodeRunner, ExecutionResult, ExecutorError, DEFAULT_TIMEOUT_SECS,
};
