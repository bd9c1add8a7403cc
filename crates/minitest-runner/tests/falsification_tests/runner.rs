//! Falsification tests: the runner
//!
//! Claims about discovery, ordering, isolation, classification and the
//! report, observed through a memory sink.

use std::cell::RefCell;
use std::rc::Rc;

use minitest_runner::{
    Behavior, Case, MemorySink, RunState, Runner, RunnerConfig, TestOrder,
};

fn runner_with(config: RunnerConfig) -> (Runner, MemorySink) {
    let sink = MemorySink::new();
    (Runner::with_sink(config, sink.clone()), sink)
}

fn sorted() -> RunnerConfig {
    RunnerConfig::new().with_order(TestOrder::Sorted)
}

fn summary(contents: &str) -> &str {
    contents.lines().last().unwrap_or_default()
}

// =============================================================================
// Reporting
// =============================================================================

/// Claim: a case with no test methods reports
/// "0 tests, 0 assertions, 0 failures, 0 errors."
///
/// # Falsification Attempt
/// Register a case with only helpers and hooks, run, read the summary.
#[test]
fn zero_tests_summary() {
    let (mut runner, sink) = runner_with(sorted());
    runner.new_test_case(
        Case::new("NoTests", ())
            .setup(|_, _| Ok(()))
            .method("helper", |_, t| {
                t.pass()?;
                Ok(())
            }),
    );
    runner.run();
    assert_eq!(
        summary(&sink.contents()),
        "0 tests, 0 assertions, 0 failures, 0 errors.",
        "FALSIFIED: empty case summary"
    );
}

/// Claim: running with nothing registered is not an error and reports zero.
///
/// # Falsification Attempt
/// Run an empty runner.
#[test]
fn empty_runner_reports_zero() {
    let (mut runner, sink) = runner_with(RunnerConfig::new());
    let report = runner.run_and_report();
    assert!(report.passed());
    assert_eq!(
        summary(&sink.contents()),
        "0 tests, 0 assertions, 0 failures, 0 errors."
    );
}

/// Claim: two asserts in one test show up as 2 assertions in the summary.
///
/// # Falsification Attempt
/// One test with two asserts; read the summary line.
#[test]
fn two_asserts_count_two() {
    let (mut runner, sink) = runner_with(sorted());
    runner.new_test_case(Case::new("Two", ()).method("test_twice", |_, t| {
        t.assert(true, ())?;
        t.assert(1, ())?;
        Ok(())
    }));
    runner.run();
    assert_eq!(
        summary(&sink.contents()),
        "1 tests, 2 assertions, 0 failures, 0 errors.",
        "FALSIFIED: assertion count"
    );
}

/// Claim: the assertion count in each summary is cumulative for the run.
///
/// # Falsification Attempt
/// Two cases with one assertion each; the second summary must say 2.
#[test]
fn assertion_count_is_cumulative() {
    let (mut runner, sink) = runner_with(sorted());
    for name in ["First", "Second"] {
        runner.new_test_case(Case::new(name, ()).method("test_one", |_, t| {
            t.pass()?;
            Ok(())
        }));
    }
    runner.run();
    let contents = sink.contents();
    let summaries: Vec<_> = contents.lines().filter(|l| l.ends_with("errors.")).collect();
    assert_eq!(
        summaries,
        vec![
            "1 tests, 1 assertions, 0 failures, 0 errors.",
            "1 tests, 2 assertions, 0 failures, 0 errors."
        ]
    );
}

/// Claim: the random-order seed is printed and recorded.
///
/// # Falsification Attempt
/// Run with a pinned seed and read the first line.
#[test]
fn seed_is_printed() {
    let (mut runner, sink) = runner_with(RunnerConfig::new().with_seed(31337));
    runner.new_test_case(Case::new("Seeded", ()).method("test_x", |_, _| Ok(())));
    let report = runner.run_and_report();
    assert_eq!(report.seed, Some(31337));
    assert!(
        sink.contents().starts_with("Run options: --seed 31337\n"),
        "FALSIFIED: seed line missing"
    );
}

/// Claim: pinned orders print no seed line.
///
/// # Falsification Attempt
/// Run sorted and look for the seed line.
#[test]
fn pinned_order_prints_no_seed() {
    let (mut runner, sink) = runner_with(sorted());
    runner.new_test_case(Case::new("Pinned", ()).method("test_x", |_, _| Ok(())));
    runner.run();
    assert!(!sink.contents().contains("Run options"));
}

// =============================================================================
// Isolation
// =============================================================================

/// Claim: setup runs exactly once per test, immediately before it, whatever
/// the order; a teardown asserting the fixture unchanged never fails.
///
/// # Falsification Attempt
/// Shuffle with many seeds; setup zeroes a counter, each test reads it
/// first, teardown asserts it is still zero.
#[test]
fn setup_once_per_test_any_order() {
    for seed in 0..32 {
        let case = Rc::new(RefCell::new(
            Case::new("Fixture", (0_i32, 0_u32))
                .setup(|(counter, setups), _| {
                    *counter = 0;
                    *setups += 1;
                    Ok(())
                })
                .teardown(|(counter, _), t| {
                    t.assert_equal(0, *counter, "fixture changed")?;
                    Ok(())
                })
                .method("test_a", |(counter, _), t| {
                    t.assert_equal(0, *counter, ())?;
                    Ok(())
                })
                .method("test_b", |(counter, _), t| {
                    t.assert_equal(0, *counter, ())?;
                    Ok(())
                })
                .method("test_c", |(counter, _), t| {
                    t.assert_equal(0, *counter, ())?;
                    Ok(())
                }),
        ));
        let (mut runner, _sink) = runner_with(RunnerConfig::new().with_seed(seed));
        runner.register(case.clone());
        let report = runner.run_and_report();

        assert!(report.passed(), "FALSIFIED: seed {seed}: {:?}", report.failures);
        assert_eq!(case.borrow().state().1, 3, "FALSIFIED: setup count, seed {seed}");
    }
}

/// Claim: three tests run exactly once each under random order, for any
/// seed.
///
/// # Falsification Attempt
/// Log test executions over a range of seeds.
#[test]
fn three_tests_run_once_each() {
    for seed in [0, 1, 2, 7, 99, 65535, u64::MAX] {
        let case = Rc::new(RefCell::new(
            Case::new("Three", Vec::<&'static str>::new())
                .method("test_x", |log, _| {
                    log.push("x");
                    Ok(())
                })
                .method("test_y", |log, _| {
                    log.push("y");
                    Ok(())
                })
                .method("test_z", |log, _| {
                    log.push("z");
                    Ok(())
                }),
        ));
        let (mut runner, sink) = runner_with(RunnerConfig::new().with_seed(seed));
        runner.register(case.clone());
        runner.run();

        let mut log = case.borrow().state().clone();
        log.sort_unstable();
        assert_eq!(log, vec!["x", "y", "z"], "FALSIFIED: seed {seed}");
        assert!(sink.contents().contains("3 tests"));
    }
}

/// Claim: different seeds can produce different orders.
///
/// # Falsification Attempt
/// Record the order over many seeds; a single order falsifies shuffling.
#[test]
fn random_order_actually_varies() {
    let mut orders = std::collections::HashSet::new();
    for seed in 0..64 {
        let case = Rc::new(RefCell::new(
            Case::new("Order", String::new())
                .method("test_a", |s: &mut String, _| {
                    s.push('a');
                    Ok(())
                })
                .method("test_b", |s, _| {
                    s.push('b');
                    Ok(())
                })
                .method("test_c", |s, _| {
                    s.push('c');
                    Ok(())
                })
                .method("test_d", |s, _| {
                    s.push('d');
                    Ok(())
                }),
        ));
        let (mut runner, _sink) = runner_with(RunnerConfig::new().with_seed(seed));
        runner.register(case.clone());
        runner.run();
        orders.insert(case.borrow().state().clone());
    }
    assert!(orders.len() > 1, "FALSIFIED: shuffle never changed the order");
}

/// Claim: an unexpected error is reported under errors and does not stop
/// later tests or later cases.
///
/// # Falsification Attempt
/// A failing, an erroring and a panicking test followed by a passing case.
#[test]
fn errors_do_not_stop_the_suite() {
    let later = Rc::new(RefCell::new(Case::new("Later", false).method(
        "test_runs",
        |ran, _| {
            *ran = true;
            Ok(())
        },
    )));
    let (mut runner, sink) = runner_with(sorted());
    runner.new_test_case(
        Case::new("Broken", ())
            .method("test_1_error", |_, _| {
                "not a number".parse::<i32>()?;
                Ok(())
            })
            .method("test_2_fail", |_, t| {
                t.flunk(())?;
                Ok(())
            })
            .method("test_3_panic", |_, _| panic!("kaboom"))
            .method("test_4_pass", |_, t| {
                t.pass()?;
                Ok(())
            }),
    );
    runner.register(later.clone());
    let report = runner.run_and_report();

    assert_eq!(report.tests_run, 5);
    assert_eq!(report.failures.len(), 1, "FALSIFIED: failure count");
    assert_eq!(report.errors.len(), 2, "FALSIFIED: error count");
    assert!(*later.borrow().state(), "FALSIFIED: later case never ran");
    assert!(sink.contents().contains("EFE."));
    assert_eq!(runner.state(), RunState::Idle);
}

/// Claim: failures are classified by kind, never by message text.
///
/// # Falsification Attempt
/// A plain error whose text looks like an assertion failure must still be
/// an error.
#[test]
fn classification_ignores_message_text() {
    let (mut runner, _sink) = runner_with(sorted());
    runner.new_test_case(Case::new("Mimic", ()).method("test_mimic", |_, _| {
        anyhow::bail!("Failed assertion, no message given.")
    }));
    let report = runner.run_and_report();
    assert!(report.failures.is_empty(), "FALSIFIED: text-based classification");
    assert_eq!(report.errors.len(), 1);
}

/// Claim: every recorded failure names the test that produced it.
///
/// # Falsification Attempt
/// Fail two tests and read the attached ids.
#[test]
fn failures_are_attributed() {
    let (mut runner, sink) = runner_with(sorted());
    runner.new_test_case(
        Case::new("Attrib", ())
            .method("test_left", |_, t| {
                t.assert(false, ())?;
                Ok(())
            })
            .method("test_right", |_, t| {
                t.refute(true, ())?;
                Ok(())
            }),
    );
    let report = runner.run_and_report();
    let ids: Vec<String> = report
        .failures
        .iter()
        .filter_map(|f| f.test.as_ref().map(ToString::to_string))
        .collect();
    assert_eq!(ids, vec!["Attrib#test_left", "Attrib#test_right"]);
    assert!(sink.contents().contains("  1) Failure:\nAttrib#test_left:\n"));
}

// =============================================================================
// Discovery and registry
// =============================================================================

/// Claim: tests reached through delegation are discovered and a name shared
/// by the case and its behavior runs once.
///
/// # Falsification Attempt
/// Override a shared test on the case and count executions.
#[test]
fn delegated_tests_run_once() {
    let shared = Behavior::<Vec<&'static str>>::new("Shared")
        .method("test_shared", |hits, _| {
            hits.push("shared");
            Ok(())
        })
        .method("test_overridden", |hits, _| {
            hits.push("base");
            Ok(())
        })
        .shared();
    let case = Rc::new(RefCell::new(
        Case::new("Leaf", Vec::new())
            .include(shared)
            .method("test_overridden", |hits, _| {
                hits.push("leaf");
                Ok(())
            }),
    ));
    let (mut runner, _sink) = runner_with(sorted());
    runner.register(case.clone());
    let report = runner.run_and_report();

    assert_eq!(report.tests_run, 2, "FALSIFIED: duplicate discovery");
    assert_eq!(case.borrow().state(), &vec!["leaf", "shared"]);
}

/// Claim: list_test_cases returns an independent snapshot in registration
/// order.
///
/// # Falsification Attempt
/// Mutate the snapshot and register more cases afterwards.
#[test]
fn list_is_a_snapshot() {
    let (mut runner, _sink) = runner_with(sorted());
    runner.new_test_case(Case::new("One", ()));
    runner.new_test_case(Case::new("Two", ()));
    let mut snapshot = runner.list_test_cases();
    snapshot.clear();
    runner.new_test_case(Case::new("Three", ()));

    let names: Vec<String> = runner
        .list_test_cases()
        .iter()
        .map(|c| c.borrow().name().to_string())
        .collect();
    assert_eq!(names, vec!["One", "Two", "Three"], "FALSIFIED: registry changed");
}
