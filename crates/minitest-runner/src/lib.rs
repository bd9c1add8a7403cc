// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # minitest-runner
//!
//! Test-case runner for the minitest framework.
//!
//! - [`Runner`] registers test cases and runs them, writing progress and a
//!   report to an [`OutputSink`]
//! - [`Case`] and [`Behavior`] build test cases from closures, with shared
//!   behaviors reached through delegation
//! - [`RunnerConfig`] selects test order, seed, verbosity and output
//! - [`RunReport`] is the serializable aggregate of a run
//!
//! Tests run in random order unless configured otherwise; the seed is
//! printed so an order-dependent failure can be replayed.
//!
//! ## Example
//!
//! ```rust
//! use minitest_runner::{Case, MemorySink, Runner, RunnerConfig, TestOrder};
//!
//! let sink = MemorySink::new();
//! let config = RunnerConfig::new().with_order(TestOrder::Sorted);
//! let mut runner = Runner::with_sink(config, sink.clone());
//!
//! runner.new_test_case(
//!     Case::new("ArithmeticTest", ())
//!         .method("test_addition", |_, t| {
//!             t.assert_equal(4, 2 + 2, ())?;
//!             Ok(())
//!         })
//!         .method("test_closeness", |_, t| {
//!             t.assert_in_delta(0.3, 0.1 + 0.2, 0.001, ())?;
//!             Ok(())
//!         }),
//! );
//!
//! let report = runner.run_and_report();
//! assert!(report.passed());
//! assert!(sink.contents().ends_with("2 tests, 2 assertions, 0 failures, 0 errors.\n"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod capture;
pub mod case;
pub mod config;
pub mod discovery;
pub mod error;
pub mod order;
pub mod report;
pub mod runner;
pub mod sink;

pub use case::{Behavior, Case, Method, SETUP, TEARDOWN, TestCase, TestResult};
pub use config::{OutputMode, RunnerConfig, TestOrder};
pub use discovery::{TEST_PREFIX, discover};
pub use error::{Result, RunnerError};
pub use report::{RunReport, format_entry, summary_line};
pub use runner::{RunState, Runner, SharedCase};
pub use sink::{BufferedSink, ConsoleSink, MemorySink, OutputSink, detect_sink};
