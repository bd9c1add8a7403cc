//! Deferred conditions and failure messages.
//!
//! Both are evaluated at most once and only when needed: a lazy condition is
//! invoked when the assertion runs, a lazy message only when the assertion
//! is about to fail.

use std::fmt;

/// The condition checked by [`Assertions::assert`](crate::Assertions::assert).
pub enum Condition<'a> {
    /// An already computed value.
    Fixed(bool),
    /// A zero-argument predicate, invoked when the assertion runs.
    Lazy(Box<dyn FnOnce() -> bool + 'a>),
}

impl<'a> Condition<'a> {
    /// Wraps a predicate to be invoked when the assertion runs.
    pub fn lazy(predicate: impl FnOnce() -> bool + 'a) -> Self {
        Self::Lazy(Box::new(predicate))
    }

    /// Evaluates the condition.
    pub fn evaluate(self) -> bool {
        match self {
            Self::Fixed(value) => value,
            Self::Lazy(predicate) => predicate(),
        }
    }

    /// Returns the logical negation, keeping a lazy predicate lazy.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Fixed(value) => Self::Fixed(!value),
            Self::Lazy(predicate) => Self::Lazy(Box::new(move || !predicate())),
        }
    }
}

impl From<bool> for Condition<'_> {
    fn from(value: bool) -> Self {
        Self::Fixed(value)
    }
}

impl From<crate::Value> for Condition<'_> {
    fn from(value: crate::Value) -> Self {
        Self::Fixed(value.is_truthy())
    }
}

impl From<&crate::Value> for Condition<'_> {
    fn from(value: &crate::Value) -> Self {
        Self::Fixed(value.is_truthy())
    }
}

// Boolean-like scalars are checked for truthiness, like any other value.
macro_rules! truthy_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Condition<'_> {
                fn from(value: $t) -> Self {
                    Self::Fixed(crate::Value::from(value).is_truthy())
                }
            }
        )*
    };
}

truthy_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, &str, String);

impl fmt::Debug for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

enum Inner<'a> {
    Absent,
    Text(String),
    Lazy(Box<dyn FnOnce() -> String + 'a>),
    Rendered(Box<dyn FnOnce() -> String + 'a>),
}

/// An optional caller-supplied failure message.
///
/// Built from `()` (no message), a string, or [`Message::lazy`]. Assertions
/// combine it with their default description:
///
/// - no message: `"<default>."`
/// - empty message: `".\n<default>."`
/// - otherwise: `"<message>.\n<default>."`, with a trailing period on the
///   caller's message not doubled.
pub struct Message<'a> {
    inner: Inner<'a>,
}

impl<'a> Message<'a> {
    /// No caller message.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            inner: Inner::Absent,
        }
    }

    /// A message computed only if the assertion fails.
    pub fn lazy(thunk: impl FnOnce() -> String + 'a) -> Self {
        Self {
            inner: Inner::Lazy(Box::new(thunk)),
        }
    }

    /// Returns true if the caller supplied no message.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self.inner, Inner::Absent)
    }

    /// Combines the caller message with a lazily computed default
    /// description. Already combined messages pass through unchanged.
    pub(crate) fn compose(self, default: impl FnOnce() -> String + 'a) -> Self {
        let caller: Box<dyn FnOnce() -> Option<String> + 'a> = match self.inner {
            Inner::Rendered(_) => return self,
            Inner::Absent => Box::new(|| None),
            Inner::Text(text) => Box::new(move || Some(text)),
            Inner::Lazy(thunk) => Box::new(move || Some(thunk())),
        };
        Self {
            inner: Inner::Rendered(Box::new(move || {
                let description = default();
                match caller() {
                    Some(text) => {
                        let text = text.strip_suffix('.').unwrap_or(&text);
                        format!("{text}.\n{description}.")
                    }
                    None => format!("{description}."),
                }
            })),
        }
    }

    /// Produces the final text. Lazy parts run here and nowhere else.
    pub(crate) fn render(self) -> String {
        match self.inner {
            Inner::Absent => String::new(),
            Inner::Text(text) => text,
            Inner::Lazy(thunk) | Inner::Rendered(thunk) => thunk(),
        }
    }
}

impl Default for Message<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl From<()> for Message<'_> {
    fn from((): ()) -> Self {
        Self::none()
    }
}

impl From<&str> for Message<'_> {
    fn from(text: &str) -> Self {
        Self {
            inner: Inner::Text(text.to_string()),
        }
    }
}

impl From<String> for Message<'_> {
    fn from(text: String) -> Self {
        Self {
            inner: Inner::Text(text),
        }
    }
}

impl<'a, T: Into<Message<'a>>> From<Option<T>> for Message<'a> {
    fn from(text: Option<T>) -> Self {
        text.map_or_else(Self::none, Into::into)
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Absent => f.write_str("Message(none)"),
            Inner::Text(text) => f.debug_tuple("Message").field(text).finish(),
            Inner::Lazy(_) | Inner::Rendered(_) => f.write_str("Message(..)"),
        }
    }
}
