//! Assertion and refutation operations.
//!
//! [`Assertions::assert`] is the only operation that counts and raises.
//! Every other operation builds an expectation (a boolean plus a lazy
//! default description) once per concept and routes it through `assert` or
//! [`Assertions::refute`], which is itself `assert` of the negated condition.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;

use crate::capability::Capabilities;
use crate::error::{Failure, Result};
use crate::message::{Condition, Message};
use crate::value::{Value, ValueKind};

/// Default tolerance for [`Assertions::assert_in_delta`] and
/// [`Assertions::assert_in_epsilon`].
pub const DEFAULT_DELTA: f64 = 0.001;

/// Which way a shared expectation is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Assert,
    Refute,
}

impl Polarity {
    /// Word inserted into default descriptions for refutations.
    const fn negation(self) -> &'static str {
        match self {
            Self::Assert => "",
            Self::Refute => "not ",
        }
    }
}

/// A condition paired with its default description builder.
struct Expectation<'a> {
    holds: bool,
    describe: Box<dyn FnOnce(Polarity) -> String + 'a>,
}

impl<'a> Expectation<'a> {
    fn new(holds: bool, describe: impl FnOnce(Polarity) -> String + 'a) -> Self {
        Self {
            holds,
            describe: Box::new(describe),
        }
    }
}

fn empty(obj: Value) -> Expectation<'static> {
    Expectation::new(obj.is_empty(), move |p| {
        format!("Expected {obj} to {}be empty", p.negation())
    })
}

fn equal(expected: Value, actual: Value) -> Expectation<'static> {
    Expectation::new(expected.loose_eq(&actual), move |p| {
        format!("Expected {actual} to {}be equal to {expected}", p.negation())
    })
}

fn in_delta(expected: f64, actual: f64, delta: f64) -> Expectation<'static> {
    let diff = (expected - actual).abs();
    Expectation::new(diff <= delta, move |p| {
        format!(
            "Expected |{} - {}| ({}) to {}be <= {}",
            Value::from(expected),
            Value::from(actual),
            diff,
            p.negation(),
            delta
        )
    })
}

fn includes(collection: Value, obj: Value) -> Expectation<'static> {
    Expectation::new(collection.contains(&obj), move |p| {
        format!("Expected {collection} to {}include {obj}", p.negation())
    })
}

fn instance_of(kind: ValueKind, obj: Value) -> Expectation<'static> {
    Expectation::new(obj.kind() == kind, move |p| match p {
        Polarity::Assert => format!(
            "Expected {obj} to be an instance of {kind}, not {}",
            obj.kind()
        ),
        Polarity::Refute => format!("Expected {obj} to not be an instance of {kind}"),
    })
}

fn responds<'a, T: Capabilities + ?Sized>(obj: &'a T, name: &'a str) -> Expectation<'a> {
    Expectation::new(obj.responds_to(name), move |p| {
        format!("Expected {} to {}respond to #{name}", obj.label(), p.negation())
    })
}

fn same<'a, T: fmt::Debug + ?Sized>(expected: &'a T, actual: &'a T) -> Expectation<'a> {
    Expectation::new(std::ptr::eq(expected, actual), move |p| {
        format!(
            "Expected {actual:?} ({actual:p}) to {}be the same as {expected:?} ({expected:p})",
            p.negation()
        )
    })
}

fn matches<'a>(pattern: Pattern, actual: &'a str) -> Expectation<'a> {
    Expectation::new(pattern.is_match(actual), move |p| {
        format!("Expected {pattern} to {}match {actual:?}", p.negation())
    })
}

fn shape(obj: Value, kind: ValueKind) -> Expectation<'static> {
    Expectation::new(obj.kind() == kind, move |p| {
        format!("Expected {obj} to {}be {kind}", p.negation())
    })
}

fn operator(left: Value, op: Operator, right: Value) -> Expectation<'static> {
    Expectation::new(op.apply(&left, &right), move |p| {
        format!("Expected {left} to {}be {op} {right}", p.negation())
    })
}

/// A pattern for [`Assertions::assert_match`].
///
/// Strings are matched literally; pass a [`Regex`] for pattern syntax.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Literal text, matched as a substring.
    Literal(String),
    /// Compiled expression.
    Regex(Regex),
}

impl Pattern {
    /// Returns true if the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Literal(literal) => text.contains(literal.as_str()),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<&Regex> for Pattern {
    fn from(regex: &Regex) -> Self {
        Self::Regex(regex.clone())
    }
}

impl From<&str> for Pattern {
    fn from(literal: &str) -> Self {
        Self::Literal(literal.to_string())
    }
}

impl From<String> for Pattern {
    fn from(literal: String) -> Self {
        Self::Literal(literal)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "/{}/", regex::escape(literal)),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Comparison operators for [`Assertions::assert_operator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==` (loose)
    Eq,
    /// `!=` (loose)
    Ne,
}

impl Operator {
    /// Returns the operator symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Applies the operator to two values.
    #[must_use]
    pub fn apply(&self, left: &Value, right: &Value) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match self {
            Self::Eq => left.loose_eq(right),
            Self::Ne => !left.loose_eq(right),
            Self::Lt => matches!(left.loose_cmp(right), Some(Less)),
            Self::Le => matches!(left.loose_cmp(right), Some(Less | Equal)),
            Self::Gt => matches!(left.loose_cmp(right), Some(Greater)),
            Self::Ge => matches!(left.loose_cmp(right), Some(Greater | Equal)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Operator {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            other => Err(Failure::error(
                "ArgumentError",
                format!("unknown operator {other:?}"),
            )),
        }
    }
}

/// The assertion context.
///
/// Shared by every test in a run; cloning yields another handle to the same
/// counter. The counter is bumped exactly once per [`assert`](Self::assert)
/// call, whatever the outcome.
#[derive(Debug, Clone, Default)]
pub struct Assertions {
    count: Arc<AtomicU64>,
}

impl Assertions {
    /// Creates a context with a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assertions executed since the last reset.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Zeroes the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Primitives
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `condition` holds.
    ///
    /// `condition` is a `bool`, a [`Value`] (checked for truthiness) or a
    /// [`Condition::lazy`] predicate.
    pub fn assert<'a>(
        &self,
        condition: impl Into<Condition<'a>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.count.fetch_add(1, Ordering::Relaxed);
        let message = message
            .into()
            .compose(|| "Failed assertion, no message given".to_string());
        if condition.into().evaluate() {
            Ok(true)
        } else {
            Err(Failure::assertion(message.render()))
        }
    }

    /// Fails if `condition` holds.
    pub fn refute<'a>(
        &self,
        condition: impl Into<Condition<'a>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        let message = message
            .into()
            .compose(|| "Failed refutation, no message given".to_string());
        self.assert(condition.into().negate(), message)
    }

    /// Fails unconditionally.
    pub fn flunk<'a>(&self, message: impl Into<Message<'a>>) -> Result<bool> {
        let message = message.into().compose(|| "Epic Fail!".to_string());
        self.assert(false, message)
    }

    /// Succeeds unconditionally. Still counts as an assertion.
    pub fn pass(&self) -> Result<bool> {
        self.assert(true, ())
    }

    fn verify<'a>(
        &self,
        polarity: Polarity,
        expectation: Expectation<'a>,
        message: Message<'a>,
    ) -> Result<bool> {
        let Expectation { holds, describe } = expectation;
        let message = message.compose(move || describe(polarity));
        match polarity {
            Polarity::Assert => self.assert(holds, message),
            Polarity::Refute => self.refute(holds, message),
        }
    }

    /// Records a check that cannot hold and returns its failure.
    fn failed(&self, message: Message<'_>) -> Failure {
        match self.assert(false, message) {
            Err(failure) => failure,
            Ok(_) => Failure::error("InternalError", "unsatisfiable assertion passed"),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Emptiness
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `obj` is an empty string, array or object.
    pub fn assert_empty<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Assert, empty(obj.into()), message.into())
    }

    /// Fails if `obj` is an empty string, array or object.
    pub fn refute_empty<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Refute, empty(obj.into()), message.into())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Equality
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `expected` loosely equals `actual`.
    pub fn assert_equal<'a>(
        &self,
        expected: impl Into<Value>,
        actual: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            equal(expected.into(), actual.into()),
            message.into(),
        )
    }

    /// Fails if `expected` loosely equals `actual`.
    pub fn refute_equal<'a>(
        &self,
        expected: impl Into<Value>,
        actual: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            equal(expected.into(), actual.into()),
            message.into(),
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Numeric closeness
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `|expected - actual| <= delta` (default [`DEFAULT_DELTA`]).
    pub fn assert_in_delta<'a>(
        &self,
        expected: f64,
        actual: f64,
        delta: impl Into<Option<f64>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        let delta = delta.into().unwrap_or(DEFAULT_DELTA);
        self.verify(
            Polarity::Assert,
            in_delta(expected, actual, delta),
            message.into(),
        )
    }

    /// Fails if `|expected - actual| <= delta` (default [`DEFAULT_DELTA`]).
    pub fn refute_in_delta<'a>(
        &self,
        expected: f64,
        actual: f64,
        delta: impl Into<Option<f64>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        let delta = delta.into().unwrap_or(DEFAULT_DELTA);
        self.verify(
            Polarity::Refute,
            in_delta(expected, actual, delta),
            message.into(),
        )
    }

    /// Relative closeness: [`assert_in_delta`](Self::assert_in_delta) with a
    /// tolerance of `min(|a|, |b|) * epsilon`.
    pub fn assert_in_epsilon<'a>(
        &self,
        a: f64,
        b: f64,
        epsilon: impl Into<Option<f64>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        let delta = relative_delta(a, b, epsilon.into());
        self.assert_in_delta(a, b, delta, message)
    }

    /// Relative closeness refuted through
    /// [`refute_in_delta`](Self::refute_in_delta).
    pub fn refute_in_epsilon<'a>(
        &self,
        a: f64,
        b: f64,
        epsilon: impl Into<Option<f64>>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        let delta = relative_delta(a, b, epsilon.into());
        self.refute_in_delta(a, b, delta, message)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Membership and capability
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `collection` contains `obj`.
    pub fn assert_includes<'a>(
        &self,
        collection: impl Into<Value>,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            includes(collection.into(), obj.into()),
            message.into(),
        )
    }

    /// Fails if `collection` contains `obj`.
    pub fn refute_includes<'a>(
        &self,
        collection: impl Into<Value>,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            includes(collection.into(), obj.into()),
            message.into(),
        )
    }

    /// Fails unless `obj` exposes a callable member called `name`.
    pub fn assert_respond_to<'a, T: Capabilities + ?Sized>(
        &self,
        obj: &'a T,
        name: &'a str,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Assert, responds(obj, name), message.into())
    }

    /// Fails if `obj` exposes a callable member called `name`.
    pub fn refute_respond_to<'a, T: Capabilities + ?Sized>(
        &self,
        obj: &'a T,
        name: &'a str,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Refute, responds(obj, name), message.into())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Identity, kind and shape
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless both references point at the same object.
    ///
    /// Identity is address equality (`std::ptr::eq`). The compiler may
    /// promote equal constants such as `&1` and `&1` to one static, and
    /// zero-sized values can share an address, so those compare as the
    /// same. Compare owned values or heap allocations for a meaningful
    /// identity check.
    pub fn assert_same<'a, T: fmt::Debug + ?Sized>(
        &self,
        expected: &'a T,
        actual: &'a T,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Assert, same(expected, actual), message.into())
    }

    /// Fails if both references point at the same object.
    pub fn refute_same<'a, T: fmt::Debug + ?Sized>(
        &self,
        expected: &'a T,
        actual: &'a T,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Refute, same(expected, actual), message.into())
    }

    /// Fails unless `obj` is of the given kind.
    pub fn assert_instance_of<'a>(
        &self,
        kind: ValueKind,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Assert, instance_of(kind, obj.into()), message.into())
    }

    /// Fails if `obj` is of the given kind.
    pub fn refute_instance_of<'a>(
        &self,
        kind: ValueKind,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(Polarity::Refute, instance_of(kind, obj.into()), message.into())
    }

    /// Fails unless `obj` is `null`.
    pub fn assert_nil<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            shape(obj.into(), ValueKind::Null),
            message.into(),
        )
    }

    /// Fails if `obj` is `null`.
    pub fn refute_nil<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            shape(obj.into(), ValueKind::Null),
            message.into(),
        )
    }

    /// Fails unless `obj` is `undefined`.
    pub fn assert_undefined<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            shape(obj.into(), ValueKind::Undefined),
            message.into(),
        )
    }

    /// Fails if `obj` is `undefined`.
    pub fn refute_undefined<'a>(
        &self,
        obj: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            shape(obj.into(), ValueKind::Undefined),
            message.into(),
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Patterns and operators
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `pattern` matches `actual`. String patterns match
    /// literally.
    pub fn assert_match<'a>(
        &self,
        pattern: impl Into<Pattern>,
        actual: &'a str,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            matches(pattern.into(), actual),
            message.into(),
        )
    }

    /// Fails if `pattern` matches `actual`.
    pub fn refute_match<'a>(
        &self,
        pattern: impl Into<Pattern>,
        actual: &'a str,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            matches(pattern.into(), actual),
            message.into(),
        )
    }

    /// Fails unless `left op right` holds.
    pub fn assert_operator<'a>(
        &self,
        left: impl Into<Value>,
        op: Operator,
        right: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Assert,
            operator(left.into(), op, right.into()),
            message.into(),
        )
    }

    /// Fails if `left op right` holds.
    pub fn refute_operator<'a>(
        &self,
        left: impl Into<Value>,
        op: Operator,
        right: impl Into<Value>,
        message: impl Into<Message<'a>>,
    ) -> Result<bool> {
        self.verify(
            Polarity::Refute,
            operator(left.into(), op, right.into()),
            message.into(),
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Fails unless `block` returns an error of type `E`, which is handed
    /// back on success.
    ///
    /// A panic inside `block` is caught and counts as the wrong kind of
    /// error, so it fails the assertion instead of erroring the test.
    pub fn assert_raises<'a, E, R>(
        &self,
        block: impl FnOnce() -> anyhow::Result<R>,
        message: impl Into<Message<'a>>,
    ) -> Result<E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let expected = std::any::type_name::<E>();
        let message = message.into();
        let outcome = match std::panic::catch_unwind(AssertUnwindSafe(block)) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let raised = panic_text(payload.as_ref());
                return Err(self.failed(message.compose(move || {
                    format!("[{expected}] exception expected, not\nMessage: <panic: {raised}>")
                })));
            }
        };
        match outcome {
            Ok(_) => Err(self.failed(message.compose(move || {
                format!("{expected} expected but nothing was raised")
            }))),
            Err(err) => match err.downcast::<E>() {
                Ok(raised) => {
                    self.assert(true, message)?;
                    Ok(raised)
                }
                Err(other) => Err(self.failed(message.compose(move || {
                    format!("[{expected}] exception expected, not\nMessage: <{other:#}>")
                }))),
            },
        }
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn relative_delta(a: f64, b: f64, epsilon: Option<f64>) -> f64 {
    a.abs().min(b.abs()) * epsilon.unwrap_or(DEFAULT_DELTA)
}
