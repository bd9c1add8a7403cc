//! Error types for minitest-runner.
//!
//! A run never fails: every problem inside a test is recorded in the report.
//! These errors only cover setting the runner up.

/// Result type alias for runner setup operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Error raised while configuring a runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Invalid configuration value or file.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
