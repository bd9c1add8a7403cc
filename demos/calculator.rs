// Demos are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Calculator Demo
//!
//! Runs a small suite against a toy calculator: passing tests, an assertion
//! failure, an unexpected error and a panic, plus tests shared between two
//! cases through a behavior.
//!
//! # Usage
//!
//! ```bash
//! # Random order with a fresh seed
//! cargo run --example calculator
//!
//! # Replay an order
//! MINITEST_SEED=1234 cargo run --example calculator
//!
//! # Load runner settings from TOML, one line per test
//! cargo run --example calculator -- minitest.toml
//!
//! # Runner logs
//! RUST_LOG=minitest_runner=debug cargo run --example calculator
//! ```

use std::process::ExitCode;

use minitest::prelude::*;
use tracing::info;

#[derive(Debug, thiserror::Error)]
#[error("division by zero")]
struct DivisionByZero;

#[derive(Debug, Default)]
struct Calculator {
    memory: f64,
}

impl Calculator {
    fn add(&mut self, x: f64) -> f64 {
        self.memory += x;
        self.memory
    }

    fn divide(&mut self, x: f64) -> anyhow::Result<f64> {
        if x == 0.0 {
            return Err(DivisionByZero.into());
        }
        self.memory /= x;
        Ok(self.memory)
    }

    fn parse_and_add(&mut self, input: &str) -> anyhow::Result<f64> {
        Ok(self.add(input.trim().parse::<f64>()?))
    }
}

/// Tests every calculator case shares.
fn arithmetic() -> std::rc::Rc<Behavior<Calculator>> {
    Behavior::<Calculator>::new("Arithmetic")
        .setup(|calc, _| {
            *calc = Calculator::default();
            Ok(())
        })
        .teardown(|calc, t| {
            t.refute(calc.memory.is_nan(), "memory corrupted")?;
            Ok(())
        })
        .method("test_add", |calc, t| {
            t.assert_equal(3, calc.add(3.0), ())?;
            t.assert_operator(calc.add(2.0), ">".parse()?, 4, ())?;
            Ok(())
        })
        .method("test_float_closeness", |calc, t| {
            calc.add(0.1);
            t.assert_in_delta(0.3, calc.add(0.2), None::<f64>, ())?;
            Ok(())
        })
        .shared()
}

fn basic_case(shared: std::rc::Rc<Behavior<Calculator>>) -> Case<Calculator> {
    Case::new("CalculatorTest", Calculator::default())
        .include(shared)
        .method("test_divide", |calc, t| {
            calc.add(10.0);
            t.assert_equal(5, calc.divide(2.0)?, ())?;
            Ok(())
        })
        .method("test_divide_by_zero", |calc, t| {
            let memory = calc.add(1.0);
            let err = t.assert_raises::<DivisionByZero, _>(|| calc.divide(0.0), ())?;
            let text = err.to_string();
            t.assert_match("by zero", &text, ())?;
            // memory is untouched by the failed division
            t.assert_equal(memory, calc.memory, ())?;
            Ok(())
        })
        .method("test_parse", |calc, t| {
            let err = t.assert_raises::<std::num::ParseFloatError, _>(
                || calc.parse_and_add("twelve"),
                "words are not numbers",
            )?;
            t.assert_includes(err.to_string(), "invalid", ())?;
            Ok(())
        })
}

fn broken_case(shared: std::rc::Rc<Behavior<Calculator>>) -> Case<Calculator> {
    Case::new("BrokenCalculatorTest", Calculator::default())
        .include(shared)
        .method("test_wrong_expectation", |calc, t| {
            t.assert_equal(5, calc.add(2.0), "addition is off")?;
            Ok(())
        })
        .method("test_unexpected_error", |calc, _| {
            calc.divide(0.0)?;
            Ok(())
        })
        .method("test_panic", |_, _| {
            let empty: Vec<f64> = Vec::new();
            let first = empty.first().copied().unwrap();
            anyhow::ensure!(first > 0.0);
            Ok(())
        })
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RunnerConfig::load(&path)?.with_verbose(true),
        None => RunnerConfig::new(),
    }
    .with_env_overrides()?;
    info!(order = %config.order, seed = ?config.seed, "starting calculator suite");

    let shared = arithmetic();
    let mut runner = Runner::new(config);
    runner.new_test_case(basic_case(shared.clone()));
    runner.new_test_case(broken_case(shared));

    let report = runner.run_and_report();
    info!(
        tests = report.tests_run,
        assertions = report.assertions_run,
        failures = report.failures.len(),
        errors = report.errors.len(),
        "suite finished"
    );

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
