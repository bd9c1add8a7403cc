// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # minitest-core
//!
//! Assertion primitives for the minitest framework.
//!
//! - [`Assertions`] carries the assertion counter and every `assert_*` /
//!   `refute_*` check
//! - [`Failure`] classifies what went wrong as an assertion failure or an
//!   unexpected error
//! - [`Message`] and [`Condition`] defer work until an assertion needs it
//! - [`Value`] is the dynamic value model with loose equality
//! - [`Capabilities`] answers "does this object respond to X", including
//!   members reached through delegation
//! - [`Scope`] receives the assertion operations on explicit request
//!
//! ## Example
//!
//! ```rust
//! use minitest_core::{Assertions, Message};
//!
//! let t = Assertions::new();
//! assert!(t.assert_equal(4, 2 + 2, ()).is_ok());
//!
//! let failure = t
//!     .assert_in_delta(1.0, 1.5, 0.1, Message::lazy(|| "too far".to_string()))
//!     .unwrap_err();
//! assert!(failure.is_assertion());
//! assert_eq!(t.count(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assertions;
pub mod capability;
pub mod error;
pub mod message;
pub mod scope;
pub mod value;

pub use assertions::{Assertions, DEFAULT_DELTA, Operator, Pattern};
pub use capability::{Capabilities, Member};
pub use error::{Failure, FailureKind, Result, TestId};
pub use message::{Condition, Message};
pub use scope::{Binding, Operation, Scope, operations};
pub use value::{Value, ValueKind};
