//! Falsification tests: assertion primitives
//!
//! Claims about counting, polarity, message composition and the derived
//! checks, exercised through the public API only.

use std::cell::Cell;

use minitest_core::{Assertions, Condition, FailureKind, Message, Value};

// =============================================================================
// Counting and polarity
// =============================================================================

/// Claim: a truthy condition passes and returns true.
///
/// # Falsification Attempt
/// Assert a spread of truthy values; any failure falsifies the claim.
#[test]
fn truthy_conditions_pass() {
    let t = Assertions::new();
    let truthy = [
        Value::from(true),
        Value::from(1),
        Value::from("0"),
        Value::from(Vec::<i32>::new()),
        Value::from(f64::INFINITY),
    ];
    for value in truthy {
        let shown = value.to_string();
        assert_eq!(
            t.assert(value, ()),
            Ok(true),
            "FALSIFIED: truthy value {shown} failed assert"
        );
    }
}

/// Claim: a falsy condition with message "m" fails with "m." followed by a
/// newline and a non-empty default description.
///
/// # Falsification Attempt
/// Assert each falsy value with a message and inspect the failure.
#[test]
fn falsy_condition_message_layout() {
    let t = Assertions::new();
    let falsy = [
        Value::Undefined,
        Value::Null,
        Value::from(false),
        Value::from(0),
        Value::from(f64::NAN),
        Value::from(""),
    ];
    for value in falsy {
        let failure = t.assert(value, "m").unwrap_err();
        assert_eq!(failure.kind, FailureKind::Assertion);
        let (head, tail) = failure
            .message
            .split_once('\n')
            .expect("FALSIFIED: message has no second line");
        assert_eq!(head, "m.", "FALSIFIED: caller message not first");
        assert!(!tail.is_empty(), "FALSIFIED: default description missing");
    }
}

/// Claim: refute raises exactly when assert passes.
///
/// # Falsification Attempt
/// Run both on the same values and compare outcomes.
#[test]
fn refute_mirrors_assert() {
    let t = Assertions::new();
    let values = [
        Value::from(true),
        Value::from(false),
        Value::from(0),
        Value::from("x"),
        Value::Null,
    ];
    for value in values {
        let asserted = t.assert(value.clone(), ()).is_ok();
        let refuted = t.refute(value, ()).is_ok();
        assert_ne!(asserted, refuted, "FALSIFIED: assert and refute agreed");
    }
}

/// Claim: every assert call counts once, passing or failing, and refute
/// shares the same counter.
///
/// # Falsification Attempt
/// Mix passing and failing asserts and refutes and check the counter.
#[test]
fn every_check_counts_once() {
    let t = Assertions::new();
    let _ = t.assert(true, ());
    let _ = t.assert(false, ());
    let _ = t.refute(false, ());
    let _ = t.refute(true, ());
    let _ = t.assert_equal(1, 2, ());
    let _ = t.flunk(());
    let _ = t.pass();
    assert_eq!(t.count(), 7, "FALSIFIED: counter drifted");
}

/// Claim: clones of the context share one counter.
///
/// # Falsification Attempt
/// Assert through a clone and read the count through the original.
#[test]
fn clones_share_counter() {
    let t = Assertions::new();
    let clone = t.clone();
    let _ = clone.pass();
    assert_eq!(t.count(), 1, "FALSIFIED: clone kept a separate counter");
}

// =============================================================================
// Laziness
// =============================================================================

/// Claim: lazy messages are never evaluated when the check passes.
///
/// # Falsification Attempt
/// Pass a counting thunk to passing checks of every flavor.
#[test]
fn lazy_message_untouched_on_pass() {
    let t = Assertions::new();
    let calls = Cell::new(0);
    let thunk = || {
        Message::lazy(|| {
            calls.set(calls.get() + 1);
            "expensive".to_string()
        })
    };
    t.assert(true, thunk()).unwrap();
    t.refute(false, thunk()).unwrap();
    t.assert_equal(3, "3", thunk()).unwrap();
    t.assert_in_delta(1.0, 1.0009, 0.001, thunk()).unwrap();
    t.assert_includes(vec![1, 2, 3], 2, thunk()).unwrap();
    assert_eq!(calls.get(), 0, "FALSIFIED: lazy message evaluated on pass");
}

/// Claim: a lazy message is evaluated exactly once on failure.
///
/// # Falsification Attempt
/// Fail an equality with a counting thunk.
#[test]
fn lazy_message_evaluated_once_on_failure() {
    let t = Assertions::new();
    let calls = Cell::new(0);
    let failure = t
        .assert_equal(
            1,
            2,
            Message::lazy(|| {
                calls.set(calls.get() + 1);
                "computed".to_string()
            }),
        )
        .unwrap_err();
    assert_eq!(calls.get(), 1, "FALSIFIED: thunk evaluated {} times", calls.get());
    assert!(failure.message.starts_with("computed.\n"));
}

/// Claim: a lazy condition is invoked exactly once.
///
/// # Falsification Attempt
/// Count invocations through assert and refute.
#[test]
fn lazy_condition_invoked_once() {
    let t = Assertions::new();
    let calls = Cell::new(0);
    let predicate = || {
        calls.set(calls.get() + 1);
        false
    };
    assert!(t.assert(Condition::lazy(predicate), ()).is_err());
    assert!(t.refute(Condition::lazy(predicate), ()).is_ok());
    assert_eq!(calls.get(), 2, "FALSIFIED: predicate invocation count");
}

// =============================================================================
// Derived checks
// =============================================================================

/// Claim: assert_in_delta(1.0, 1.0009, 0.001) passes and
/// assert_in_delta(1.0, 1.01, 0.001) fails.
///
/// # Falsification Attempt
/// Run both and check outcomes.
#[test]
fn in_delta_boundary() {
    let t = Assertions::new();
    assert!(
        t.assert_in_delta(1.0, 1.0009, 0.001, ()).is_ok(),
        "FALSIFIED: 0.0009 apart rejected"
    );
    let failure = t.assert_in_delta(1.0, 1.01, 0.001, ()).unwrap_err();
    assert!(failure.is_assertion());
    assert!(
        failure.message.contains("<= 0.001"),
        "FALSIFIED: delta not mentioned: {}",
        failure.message
    );
}

/// Claim: the default delta is 0.001.
///
/// # Falsification Attempt
/// Compare values just inside and just outside the default.
#[test]
fn default_delta() {
    let t = Assertions::new();
    assert!(t.assert_in_delta(2.0, 2.0005, None::<f64>, ()).is_ok());
    assert!(t.assert_in_delta(2.0, 2.002, None::<f64>, ()).is_err());
}

/// Claim: epsilon closeness scales with the smaller operand.
///
/// # Falsification Attempt
/// 10000 vs 10009 is within 0.1% of the smaller value; 1 vs 1.01 is not.
#[test]
fn in_epsilon_is_relative() {
    let t = Assertions::new();
    assert!(t.assert_in_epsilon(10000.0, 10009.0, None::<f64>, ()).is_ok());
    assert!(t.assert_in_epsilon(1.0, 1.01, None::<f64>, ()).is_err());
    assert!(t.refute_in_epsilon(1.0, 1.01, None::<f64>, ()).is_ok());
}

/// Claim: equality is loose: 1 equals "1", 1 does not equal 2, and the
/// failure mentions both operands.
///
/// # Falsification Attempt
/// Check both and read the default message.
#[test]
fn loose_equality() {
    let t = Assertions::new();
    assert!(t.assert_equal(1, "1", ()).is_ok(), "FALSIFIED: 1 != \"1\"");
    assert!(t.assert_equal(Value::Null, Value::Undefined, ()).is_ok());
    let failure = t.assert_equal(1, 2, ()).unwrap_err();
    assert_eq!(failure.message, "Expected 2 to be equal to 1.");
}

/// Claim: emptiness holds for empty strings, arrays and objects only.
///
/// # Falsification Attempt
/// Check each shape and a non-empty string.
#[test]
fn emptiness() {
    let t = Assertions::new();
    assert!(t.assert_empty("", ()).is_ok());
    assert!(t.assert_empty(Vec::<i32>::new(), ()).is_ok());
    assert!(t.assert_empty(Value::from_iter(Vec::<(String, i32)>::new()), ()).is_ok());
    let failure = t.assert_empty("abc", ()).unwrap_err();
    assert_eq!(failure.message, "Expected \"abc\" to be empty.");
    assert!(t.refute_empty("abc", ()).is_ok());
}

/// Claim: membership works over arrays, strings and object keys.
///
/// # Falsification Attempt
/// Probe each collection for present and absent members.
#[test]
fn membership() {
    let t = Assertions::new();
    assert!(t.assert_includes(vec![1, 2, 3], 2, ()).is_ok());
    assert!(t.assert_includes(vec![1, 2, 3], "2", ()).is_ok());
    assert!(t.assert_includes("haystack", "st", ()).is_ok());
    let object: Value = [("key", 1)].into_iter().collect();
    assert!(t.assert_includes(object.clone(), "key", ()).is_ok());
    assert!(t.refute_includes(object, "other", ()).is_ok());
    assert!(t.assert_includes(vec![1], 5, ()).is_err());
}

/// Claim: nil and undefined are distinct shapes.
///
/// # Falsification Attempt
/// Cross-check null and undefined against both checks.
#[test]
fn nil_and_undefined_distinct() {
    let t = Assertions::new();
    assert!(t.assert_nil(Value::Null, ()).is_ok());
    assert!(t.assert_nil(Value::Undefined, ()).is_err());
    assert!(t.assert_undefined(Value::Undefined, ()).is_ok());
    assert!(t.refute_undefined(Value::Null, ()).is_ok());
    assert!(t.assert_nil(None::<i32>, ()).is_ok());
}

/// Claim: string patterns match literally, compiled patterns as regexes.
///
/// # Falsification Attempt
/// A string with regex metacharacters must not be treated as a regex.
#[test]
fn pattern_coercion() {
    let t = Assertions::new();
    assert!(t.assert_match("a.c", "xa.cx", ()).is_ok());
    assert!(t.assert_match("a.c", "abc", ()).is_err(), "FALSIFIED: literal treated as regex");
    let regex = regex::Regex::new("^a.c$").unwrap();
    assert!(t.assert_match(&regex, "abc", ()).is_ok());
    assert!(t.refute_match(&regex, "abcd", ()).is_ok());
}

/// Claim: identity compares references, not values.
///
/// # Falsification Attempt
/// Two equal strings in different allocations are not the same.
#[test]
fn identity_is_not_equality() {
    let t = Assertions::new();
    let a = String::from("same");
    let b = String::from("same");
    assert!(t.assert_same(&a, &a, ()).is_ok());
    assert!(t.assert_same(&a, &b, ()).is_err(), "FALSIFIED: equal values were same");
    assert!(t.refute_same(&a, &b, ()).is_ok());
}

/// Claim: assert_raises hands back an error of the expected type and fails
/// on no error or a different one.
///
/// # Falsification Attempt
/// Raise the right type, nothing, and the wrong type.
#[test]
fn raises() {
    let t = Assertions::new();
    let raised: std::num::ParseIntError = t
        .assert_raises(|| Ok("x".parse::<i32>()?), ())
        .unwrap();
    assert!(raised.to_string().contains("invalid digit"));

    let nothing = t
        .assert_raises::<std::num::ParseIntError, i32>(|| Ok(1), ())
        .unwrap_err();
    assert!(nothing.message.contains("expected but nothing was raised"));

    let wrong = t
        .assert_raises::<std::num::ParseIntError, f64>(|| Ok("x".parse::<f64>()?), ())
        .unwrap_err();
    assert!(wrong.message.contains("exception expected, not"));
    assert!(wrong.is_assertion());
}

/// Claim: flunk fails with "Epic Fail!" unless given a message.
///
/// # Falsification Attempt
/// Flunk with and without a message.
#[test]
fn flunk_messages() {
    let t = Assertions::new();
    assert_eq!(t.flunk(()).unwrap_err().message, "Epic Fail!.");
    assert_eq!(t.flunk("stop").unwrap_err().message, "stop.\nEpic Fail!.");
}

/// Claim: a trailing period on the caller message is not doubled.
///
/// # Falsification Attempt
/// Fail with "done." and look for "..".
#[test]
fn no_double_period() {
    let t = Assertions::new();
    let failure = t.refute(true, "done.").unwrap_err();
    assert!(!failure.message.contains(".."), "FALSIFIED: {}", failure.message);
    assert_eq!(failure.message, "done.\nFailed refutation, no message given.");
}

/// Claim: an empty caller message keeps the two-line layout with a lone
/// period on the first line.
///
/// # Falsification Attempt
/// Fail with "" and compare against the message-less rendering.
#[test]
fn empty_message_keeps_layout() {
    let t = Assertions::new();
    let failure = t.assert_empty(vec![1], "").unwrap_err();
    assert_eq!(
        failure.message, ".\nExpected [1] to be empty.",
        "FALSIFIED: empty message collapsed"
    );
    let bare = t.assert_empty(vec![1], ()).unwrap_err();
    assert_eq!(bare.message, "Expected [1] to be empty.");
}

/// Claim: plain numbers and strings are accepted as boolean-like
/// conditions and judged by truthiness.
///
/// # Falsification Attempt
/// Assert and refute scalars without wrapping them in a Value.
#[test]
fn scalar_conditions_use_truthiness() {
    let t = Assertions::new();
    assert!(t.assert(1, ()).is_ok(), "FALSIFIED: 1 is falsy");
    assert!(t.assert("text", ()).is_ok());
    assert!(t.refute(0, ()).is_ok(), "FALSIFIED: 0 is truthy");
    assert!(t.refute(f64::NAN, ()).is_ok());
    assert!(t.refute(String::new(), ()).is_ok());
    assert_eq!(t.count(), 5);
}

