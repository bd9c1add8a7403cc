//! Run reports and their text rendering.

use std::fmt::Write as _;

use minitest_core::{Failure, FailureKind};
use serde::Serialize;

/// Marker written for a passing test.
pub const PASS_MARKER: char = '.';

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Number of tests executed.
    pub tests_run: u64,
    /// Assertions executed during the run.
    pub assertions_run: u64,
    /// Assertion failures, in the order they occurred.
    pub failures: Vec<Failure>,
    /// Unexpected errors, in the order they occurred.
    pub errors: Vec<Failure>,
    /// Shuffle seed, when the run used random order.
    pub seed: Option<u64>,
}

impl RunReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Records a failure under its kind.
    pub fn record(&mut self, failure: Failure) {
        match failure.kind {
            FailureKind::Assertion => self.failures.push(failure),
            FailureKind::Error => self.errors.push(failure),
        }
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    /// The one-line summary for the whole run.
    #[must_use]
    pub fn summary(&self) -> String {
        summary_line(
            self.tests_run,
            self.assertions_run,
            self.failures.len(),
            self.errors.len(),
        )
    }

    /// Serializes the report as JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn absorb(&mut self, case: CaseReport) {
        self.tests_run += case.tests_run;
        self.failures.extend(case.failures);
        self.errors.extend(case.errors);
    }
}

/// Outcome of one test case within a run.
#[derive(Debug, Clone, Default)]
pub(crate) struct CaseReport {
    pub tests_run: u64,
    pub failures: Vec<Failure>,
    pub errors: Vec<Failure>,
}

impl CaseReport {
    pub fn record(&mut self, failure: Failure) {
        match failure.kind {
            FailureKind::Assertion => self.failures.push(failure),
            FailureKind::Error => self.errors.push(failure),
        }
    }

    /// Failure and error listings, numbered failures first.
    pub fn listing(&self) -> String {
        self.failures
            .iter()
            .chain(&self.errors)
            .enumerate()
            .map(|(i, failure)| format_entry(i + 1, failure))
            .collect()
    }
}

/// `<T> tests, <A> assertions, <F> failures, <E> errors.`
#[must_use]
pub fn summary_line(tests: u64, assertions: u64, failures: usize, errors: usize) -> String {
    format!("{tests} tests, {assertions} assertions, {failures} failures, {errors} errors.")
}

/// Renders one numbered failure or error entry.
#[must_use]
pub fn format_entry(index: usize, failure: &Failure) -> String {
    let mut out = format!("  {index}) {}:\n", failure.kind.label());
    if let Some(test) = &failure.test {
        let _ = writeln!(out, "{test}:");
    }
    match failure.kind {
        FailureKind::Assertion => {
            let _ = writeln!(out, "{}", failure.message);
        }
        FailureKind::Error => {
            let error_type = failure.error_type.as_deref().unwrap_or("Error");
            let _ = writeln!(out, "{error_type}: {}", failure.message);
            for line in failure.trace.iter().flat_map(|trace| trace.lines()) {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out.push('\n');
    out
}
