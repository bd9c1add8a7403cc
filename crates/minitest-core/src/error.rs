//! Failure types raised by assertions.
//!
//! Every failed check produces a [`Failure`]. Its [`FailureKind`] is the
//! discriminant the runner uses to tell expected assertion failures apart
//! from unexpected errors; message text is never inspected for that.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result type alias for assertion operations.
pub type Result<T> = std::result::Result<T, Failure>;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// A check that did not hold. Expected, counted as a failure.
    Assertion,
    /// Anything else thrown while running a test. Counted as an error.
    Error,
}

impl FailureKind {
    /// Returns the label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Assertion => "Failure",
            Self::Error => "Error",
        }
    }

    /// Returns the single-character progress marker for this kind.
    #[must_use]
    pub const fn marker(&self) -> char {
        match self {
            Self::Assertion => 'F',
            Self::Error => 'E',
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies a single test method within a test case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId {
    /// Name of the test case.
    pub case: String,
    /// Name of the test method.
    pub method: String,
}

impl TestId {
    /// Creates a new test identifier.
    #[must_use]
    pub fn new(case: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.case, self.method)
    }
}

/// A classified failure.
///
/// Created at the point a check fails and propagated with `?` out of the
/// test body. The runner attaches the originating [`TestId`] when it records
/// the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    /// Assertion failure or unexpected error.
    pub kind: FailureKind,
    /// Fully rendered message.
    pub message: String,
    /// Test that produced the failure, once known.
    #[serde(default)]
    pub test: Option<TestId>,
    /// Label for the thrown value's type (errors only).
    #[serde(default)]
    pub error_type: Option<String>,
    /// Diagnostic trace (errors only).
    #[serde(default)]
    pub trace: Option<String>,
}

impl Failure {
    /// Creates an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: message.into(),
            test: None,
            error_type: None,
            trace: None,
        }
    }

    /// Creates an unexpected error.
    #[must_use]
    pub fn error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Error,
            message: message.into(),
            test: None,
            error_type: Some(error_type.into()),
            trace: None,
        }
    }

    /// Attaches a diagnostic trace.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Attributes the failure to a test.
    #[must_use]
    pub fn for_test(mut self, test: TestId) -> Self {
        self.test = Some(test);
        self
    }

    /// Returns true if this is an expected assertion failure.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self.kind, FailureKind::Assertion)
    }
}
