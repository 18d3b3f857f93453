//! Error types.

use thiserror::Error;

/// Errors surfaced by queue submission and the synchronous bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue was shut down and has not been restarted.
    #[error("timer queue is closed")]
    Closed,
    /// The task was dropped without running, e.g. by `clear()` or by
    /// dropping the queue.
    #[error("task was dropped before it ran")]
    Abandoned,
    /// The task panicked on the consumer thread.
    #[error("task panicked during execution")]
    TaskPanicked,
}

/// Errors from loading or validating a [`QueueConfig`](crate::config::QueueConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("failed to parse queue config: {0}")]
    Parse(String),
    /// A field holds a value the queue cannot run with.
    #[error("invalid queue config: {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
