//! Named assertion operations and opt-in installation into a scope.
//!
//! [`operations`] exposes the value-based assertions as a table of
//! dynamically callable operations. [`Scope::install_assertions`] merges that
//! table into a caller-owned scope without ever replacing a binding that is
//! already callable.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::assertions::{Assertions, Operator};
use crate::capability::{Capabilities, Member};
use crate::error::{Failure, Result};
use crate::message::Message;
use crate::value::{Value, ValueKind};

/// A dynamically callable operation.
pub type Operation = Rc<dyn Fn(&Assertions, &[Value]) -> Result<bool>>;

/// Positional arguments with trailing optional values.
struct Args<'a> {
    name: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(name: &'static str, values: &'a [Value], max: usize) -> Result<Self> {
        if values.len() > max {
            return Err(Failure::error(
                "ArgumentError",
                format!(
                    "{name}: wrong number of arguments (given {}, expected at most {max})",
                    values.len()
                ),
            ));
        }
        Ok(Self { name, values })
    }

    fn value(&self, index: usize) -> Value {
        self.values.get(index).cloned().unwrap_or_default()
    }

    fn number(&self, index: usize) -> f64 {
        self.value(index).to_number()
    }

    fn optional_number(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|v| !v.is_nullish())
            .map(Value::to_number)
    }

    fn string(&self, index: usize) -> Result<String> {
        match self.value(index) {
            Value::String(s) => Ok(s),
            other => Err(Failure::error(
                "TypeError",
                format!("{}: expected a string argument, got {}", self.name, other.kind()),
            )),
        }
    }

    fn message<'m>(&self, index: usize) -> Message<'m> {
        match self.value(index) {
            Value::Undefined | Value::Null => Message::none(),
            Value::String(s) => Message::from(s),
            other => Message::from(other.to_string()),
        }
    }

    fn kind(&self, index: usize) -> Result<ValueKind> {
        let name = self.string(index)?;
        [
            ValueKind::Undefined,
            ValueKind::Null,
            ValueKind::Boolean,
            ValueKind::Number,
            ValueKind::String,
            ValueKind::Array,
            ValueKind::Object,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
        .ok_or_else(|| Failure::error("ArgumentError", format!("unknown kind {name:?}")))
    }
}

fn op(
    name: &'static str,
    max: usize,
    body: impl Fn(&Assertions, &Args<'_>) -> Result<bool> + 'static,
) -> (&'static str, Operation) {
    let operation: Operation = Rc::new(move |t: &Assertions, values: &[Value]| {
        let args = Args::new(name, values, max)?;
        body(t, &args)
    });
    (name, operation)
}

/// The assertion operations, by name.
///
/// Arguments arrive as [`Value`]s, so the trailing message is always
/// eager: strings are used as-is, `null`/`undefined` mean no message and
/// any other value is rendered with its display form. Lazy messages
/// ([`Message::lazy`]) are only available through [`Assertions`] directly.
#[must_use]
pub fn operations() -> Vec<(&'static str, Operation)> {
    vec![
        op("assert", 2, |t, a| t.assert(a.value(0), a.message(1))),
        op("refute", 2, |t, a| t.refute(a.value(0), a.message(1))),
        op("flunk", 1, |t, a| t.flunk(a.message(0))),
        op("pass", 0, |t, _| t.pass()),
        op("assert_empty", 2, |t, a| t.assert_empty(a.value(0), a.message(1))),
        op("refute_empty", 2, |t, a| t.refute_empty(a.value(0), a.message(1))),
        op("assert_equal", 3, |t, a| {
            t.assert_equal(a.value(0), a.value(1), a.message(2))
        }),
        op("refute_equal", 3, |t, a| {
            t.refute_equal(a.value(0), a.value(1), a.message(2))
        }),
        op("assert_in_delta", 4, |t, a| {
            t.assert_in_delta(a.number(0), a.number(1), a.optional_number(2), a.message(3))
        }),
        op("refute_in_delta", 4, |t, a| {
            t.refute_in_delta(a.number(0), a.number(1), a.optional_number(2), a.message(3))
        }),
        op("assert_in_epsilon", 4, |t, a| {
            t.assert_in_epsilon(a.number(0), a.number(1), a.optional_number(2), a.message(3))
        }),
        op("refute_in_epsilon", 4, |t, a| {
            t.refute_in_epsilon(a.number(0), a.number(1), a.optional_number(2), a.message(3))
        }),
        op("assert_includes", 3, |t, a| {
            t.assert_includes(a.value(0), a.value(1), a.message(2))
        }),
        op("refute_includes", 3, |t, a| {
            t.refute_includes(a.value(0), a.value(1), a.message(2))
        }),
        op("assert_match", 3, |t, a| {
            let actual = a.string(1)?;
            t.assert_match(a.string(0)?, &actual, a.message(2))
        }),
        op("refute_match", 3, |t, a| {
            let actual = a.string(1)?;
            t.refute_match(a.string(0)?, &actual, a.message(2))
        }),
        op("assert_nil", 2, |t, a| t.assert_nil(a.value(0), a.message(1))),
        op("refute_nil", 2, |t, a| t.refute_nil(a.value(0), a.message(1))),
        op("assert_undefined", 2, |t, a| {
            t.assert_undefined(a.value(0), a.message(1))
        }),
        op("refute_undefined", 2, |t, a| {
            t.refute_undefined(a.value(0), a.message(1))
        }),
        op("assert_instance_of", 3, |t, a| {
            t.assert_instance_of(a.kind(0)?, a.value(1), a.message(2))
        }),
        op("refute_instance_of", 3, |t, a| {
            t.refute_instance_of(a.kind(0)?, a.value(1), a.message(2))
        }),
        op("assert_operator", 4, |t, a| {
            let operator: Operator = a.string(1)?.parse()?;
            t.assert_operator(a.value(0), operator, a.value(2), a.message(3))
        }),
        op("refute_operator", 4, |t, a| {
            let operator: Operator = a.string(1)?.parse()?;
            t.refute_operator(a.value(0), operator, a.value(2), a.message(3))
        }),
    ]
}

/// A binding in a [`Scope`].
#[derive(Clone)]
pub enum Binding {
    /// A plain value.
    Value(Value),
    /// A callable operation.
    Operation(Operation),
}

impl Binding {
    /// Returns true if the binding can be called.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Operation(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Operation(_) => f.write_str("Operation(..)"),
        }
    }
}

/// A caller-owned namespace of named bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, Binding>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a value, replacing any previous binding.
    pub fn bind_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), Binding::Value(value.into()));
    }

    /// Binds a name to an operation, replacing any previous binding.
    pub fn bind_operation(&mut self, name: impl Into<String>, operation: Operation) {
        self.bindings
            .insert(name.into(), Binding::Operation(operation));
    }

    /// Looks up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Merges operations into the scope.
    ///
    /// A name already bound to something callable is left untouched; plain
    /// values are replaced. Returns how many operations were installed.
    pub fn install<'n>(
        &mut self,
        operations: impl IntoIterator<Item = (&'n str, Operation)>,
    ) -> usize {
        let mut installed = 0;
        for (name, operation) in operations {
            if self.get(name).is_some_and(Binding::is_callable) {
                continue;
            }
            self.bind_operation(name, operation);
            installed += 1;
        }
        installed
    }

    /// Installs every assertion operation. See [`Scope::install`].
    pub fn install_assertions(&mut self) -> usize {
        self.install(operations())
    }

    /// Calls a bound operation.
    pub fn call(&self, name: &str, assertions: &Assertions, args: &[Value]) -> Result<bool> {
        match self.get(name) {
            Some(Binding::Operation(operation)) => operation(assertions, args),
            Some(Binding::Value(value)) => Err(Failure::error(
                "TypeError",
                format!("{name} is not callable (bound to {})", value.kind()),
            )),
            None => Err(Failure::error(
                "NameError",
                format!("undefined operation {name}"),
            )),
        }
    }
}

impl Capabilities for Scope {
    fn label(&self) -> String {
        "scope".to_string()
    }

    fn own_members(&self) -> Vec<Member> {
        self.bindings
            .iter()
            .map(|(name, binding)| Member {
                name: name.clone(),
                callable: binding.is_callable(),
            })
            .collect()
    }
}
