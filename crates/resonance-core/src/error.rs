//! Error types for task workflows

use resonance_kernel::{GraphBuildError, NavError};

/// Workflow error type
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Navigation, device or screen reading failure
    #[error("navigation failed: {0}")]
    Nav(#[from] NavError),

    /// Scene catalog could not be built
    #[error("scene graph invalid: {0}")]
    Graph(#[from] GraphBuildError),

    /// Price percentage could not be parsed from the screen
    #[error("unreadable price percentage: {0:?}")]
    UnreadablePrice(String),

    /// A task is already running
    #[error("a task is already running")]
    AlreadyRunning,

    /// Task parameters rejected before starting
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// The task's worker stopped without reporting
    #[error("task aborted: {0}")]
    Aborted(String),
}

impl TaskError {
    /// Check if the task ended because it was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Nav(e) if e.is_cancellation())
    }

    /// Check if restarting the task might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Nav(e) => e.is_retryable(),
            Self::UnreadablePrice(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_seen_through_nav() {
        assert!(TaskError::from(NavError::Cancelled).is_cancellation());
        assert!(!TaskError::AlreadyRunning.is_cancellation());
    }

    #[test]
    fn test_retryable() {
        assert!(TaskError::UnreadablePrice("--".into()).is_retryable());
        assert!(!TaskError::InvalidTask("slot 4".into()).is_retryable());
        assert!(!TaskError::from(NavError::NoCurrentScene).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = TaskError::UnreadablePrice("--".into());
        assert_eq!(err.to_string(), "unreadable price percentage: \"--\"");
        let err = TaskError::from(NavError::NoCurrentScene);
        assert!(err.to_string().starts_with("navigation failed: "));
    }
}
