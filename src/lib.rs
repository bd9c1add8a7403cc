//! minitest: a minimal unit-testing framework.
//!
//! Assertion primitives live in [`core`], the runner in [`runner`].
//!
//! # Quick Start
//!
//! ```rust
//! use minitest::prelude::*;
//!
//! let sink = MemorySink::new();
//! let mut runner = Runner::with_sink(RunnerConfig::new(), sink.clone());
//! runner.new_test_case(Case::new("QuickTest", ()).method("test_truth", |_, t| {
//!     t.assert(true, ())?;
//!     Ok(())
//! }));
//! runner.run();
//! assert!(sink.contents().contains("1 tests, 1 assertions"));
//! ```

pub use minitest_core as core;
pub use minitest_runner as runner;

/// Prelude module for common imports.
pub mod prelude {
    pub use minitest_core::{
        Assertions, Capabilities, Condition, Failure, FailureKind, Member, Message, Operator,
        Pattern, Scope, Value, ValueKind,
    };
    pub use minitest_runner::{
        Behavior, Case, MemorySink, OutputMode, OutputSink, RunReport, Runner, RunnerConfig,
        TestCase, TestOrder, TestResult,
    };
}
