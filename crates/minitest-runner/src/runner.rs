//! The test runner.
//!
//! # Run Lifecycle
//!
//! ```text
//! Idle ──run()──► Running ──case done──► Reporting ──next case──► Running
//!   ▲                                        │
//!   └──────────────── last case ─────────────┘
//! ```
//!
//! For every registered case, in registration order, the runner discovers
//! its tests, arranges them, and runs each one as
//! `setup → body → teardown`. A failure or panic anywhere in that sequence
//! is classified, attributed to the test and recorded; it never reaches the
//! next test. Setup failures skip the body; teardown runs whenever the case
//! has one.
//!
//! Execution is single-threaded. Registering cases while a run is in
//! progress is not supported.

use std::cell::RefCell;
use std::rc::Rc;

use minitest_core::{Assertions, Failure, FailureKind, TestId};
use tracing::{debug, info};

use crate::capture;
use crate::case::{SETUP, TEARDOWN, TestCase};
use crate::config::{RunnerConfig, TestOrder};
use crate::discovery::discover;
use crate::order::{arrange, fresh_seed, shuffler};
use crate::report::{CaseReport, PASS_MARKER, RunReport, summary_line};
use crate::sink::{OutputSink, detect_sink};

/// Shared handle to a registered test case.
pub type SharedCase = Rc<RefCell<dyn TestCase>>;

/// Runner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run in progress.
    #[default]
    Idle,
    /// Executing tests.
    Running,
    /// Writing the report for a finished case.
    Reporting,
}

struct Registration {
    name: String,
    case: SharedCase,
}

/// Registers test cases and runs them.
pub struct Runner {
    cases: Vec<Registration>,
    config: RunnerConfig,
    sink: Box<dyn OutputSink>,
    assertions: Assertions,
    state: RunState,
}

impl Runner {
    /// Creates a runner writing to the sink selected by `config.output`.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        let sink = detect_sink(config.output);
        Self::with_boxed_sink(config, sink)
    }

    /// Creates a runner writing to `sink`.
    #[must_use]
    pub fn with_sink(config: RunnerConfig, sink: impl OutputSink + 'static) -> Self {
        Self::with_boxed_sink(config, Box::new(sink))
    }

    fn with_boxed_sink(config: RunnerConfig, sink: Box<dyn OutputSink>) -> Self {
        Self {
            cases: Vec::new(),
            config,
            sink,
            assertions: Assertions::new(),
            state: RunState::Idle,
        }
    }

    /// Registers a test case. Its members are not inspected until it runs.
    pub fn new_test_case(&mut self, case: impl TestCase + 'static) {
        self.register(Rc::new(RefCell::new(case)));
    }

    /// Registers a case the caller keeps a handle to, e.g. to inspect its
    /// state after the run.
    pub fn register(&mut self, case: SharedCase) {
        let name = case
            .try_borrow()
            .map_or_else(|_| "<borrowed>".to_string(), |c| c.name().to_string());
        debug!(case = %name, position = self.cases.len(), "test case registered");
        self.cases.push(Registration { name, case });
    }

    /// A snapshot of the registered cases, in registration order.
    #[must_use]
    pub fn list_test_cases(&self) -> Vec<SharedCase> {
        self.cases.iter().map(|r| Rc::clone(&r.case)).collect()
    }

    /// The shared assertion context handed to every test.
    #[must_use]
    pub fn assertions(&self) -> &Assertions {
        &self.assertions
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runner configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every registered case, writing the report to the sink.
    pub fn run(&mut self) {
        let report = self.run_and_report();
        debug!(passed = report.passed(), "run finished");
    }

    /// Runs every registered case and returns the aggregate report.
    pub fn run_and_report(&mut self) -> RunReport {
        self.transition(RunState::Running);
        self.assertions.reset();

        let seed = match self.config.order {
            TestOrder::Random => Some(self.config.seed.unwrap_or_else(fresh_seed)),
            TestOrder::Sorted | TestOrder::Defined => self.config.seed,
        };
        if let (TestOrder::Random, Some(seed)) = (self.config.order, seed) {
            self.sink.write(&format!("Run options: --seed {seed}\n"));
        }
        let mut rng = shuffler(seed.unwrap_or_default());
        let mut report = RunReport::new(seed);

        let registrations: Vec<(String, SharedCase)> = self
            .cases
            .iter()
            .map(|r| (r.name.clone(), Rc::clone(&r.case)))
            .collect();

        for (name, handle) in registrations {
            self.sink.write(&format!("\n# Running {name}:\n\n"));
            let case_report = match handle.try_borrow_mut() {
                Ok(mut case) => self.run_case(&name, &mut *case, &mut rng),
                Err(_) => self.unavailable_case(&name),
            };
            self.sink.write("\n\n");

            self.transition(RunState::Reporting);
            self.write_case_report(&case_report);
            report.absorb(case_report);
            self.transition(RunState::Running);
        }

        if self.cases.is_empty() {
            self.sink.write(&summary_line(0, 0, 0, 0));
            self.sink.write("\n");
        }

        report.assertions_run = self.assertions.count();
        self.sink.flush();
        self.transition(RunState::Idle);
        report
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "runner state");
        self.state = next;
    }

    fn run_case(
        &mut self,
        name: &str,
        case: &mut dyn TestCase,
        rng: &mut rand::rngs::StdRng,
    ) -> CaseReport {
        let tests = arrange(discover(&*case), self.config.order, rng);
        let has_setup = case.responds_to(SETUP);
        let has_teardown = case.responds_to(TEARDOWN);
        debug!(case = %name, tests = tests.len(), has_setup, has_teardown, "running case");

        let mut case_report = CaseReport::default();
        for method in &tests {
            let id = TestId::new(name, method.as_str());
            let mut recorded = Vec::new();

            let setup_ok = !has_setup || self.record(case, SETUP, &id, &mut recorded);
            if setup_ok {
                self.record(case, method, &id, &mut recorded);
            }
            if has_teardown {
                self.record(case, TEARDOWN, &id, &mut recorded);
            }

            let marker = recorded.first().map_or(PASS_MARKER, |f| f.kind.marker());
            if recorded.is_empty() {
                debug!(test = %id, "passed");
            }
            self.write_marker(&id, marker);

            case_report.tests_run += 1;
            for failure in recorded {
                case_report.record(failure);
            }
        }
        case_report
    }

    /// Invokes one member, recording any failure. Returns true on success.
    fn record(
        &self,
        case: &mut dyn TestCase,
        member: &str,
        id: &TestId,
        recorded: &mut Vec<Failure>,
    ) -> bool {
        let Some(failure) = self.invoke(case, member) else {
            return true;
        };
        let failure = failure.for_test(id.clone());
        info!(
            test = %id,
            member,
            kind = %failure.kind,
            message = %failure.message,
            "test did not pass"
        );
        recorded.push(failure);
        false
    }

    fn invoke(&self, case: &mut dyn TestCase, member: &str) -> Option<Failure> {
        match capture::catch(|| case.call(member, &self.assertions)) {
            Ok(Some(Ok(()))) => None,
            Ok(Some(Err(err))) => Some(classify(err)),
            Ok(None) => Some(Failure::error(
                "NoMethodError",
                format!("undefined method `{member}'"),
            )),
            Err(panicked) => {
                let failure = Failure::error("panic", panicked.message);
                Some(match panicked.trace {
                    Some(trace) => failure.with_trace(trace),
                    None => failure,
                })
            }
        }
    }

    fn unavailable_case(&mut self, name: &str) -> CaseReport {
        let failure = Failure::error(
            "BorrowError",
            format!("test case {name} is already borrowed and cannot run"),
        )
        .for_test(TestId::new(name, "run"));
        info!(case = %name, "test case unavailable");
        self.write_marker(&TestId::new(name, "run"), FailureKind::Error.marker());
        let mut case_report = CaseReport::default();
        case_report.record(failure);
        case_report
    }

    fn write_marker(&mut self, id: &TestId, marker: char) {
        if self.config.verbose {
            self.sink.write(&format!("{id} = {marker}\n"));
        } else {
            self.sink.write(marker.encode_utf8(&mut [0; 4]));
        }
    }

    fn write_case_report(&mut self, case_report: &CaseReport) {
        let listing = case_report.listing();
        if !listing.is_empty() {
            self.sink.write(&listing);
        }
        let summary = summary_line(
            case_report.tests_run,
            self.assertions.count(),
            case_report.failures.len(),
            case_report.errors.len(),
        );
        self.sink.write(&summary);
        self.sink.write("\n");
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field(
                "cases",
                &self.cases.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .field("state", &self.state)
            .field("assertions", &self.assertions.count())
            .finish_non_exhaustive()
    }
}

/// Classifies an error returned by a test body.
///
/// A [`Failure`] keeps its own kind; anything else is an unexpected error
/// whose message includes the full context chain.
fn classify(err: anyhow::Error) -> Failure {
    match err.downcast::<Failure>() {
        Ok(failure) => failure,
        Err(err) => {
            let failure = Failure::error("Error", format!("{err:#}"));
            let backtrace = err.backtrace();
            if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
                failure.with_trace(backtrace.to_string())
            } else {
                failure
            }
        }
    }
}
