//! Test cases.
//!
//! A [`TestCase`] is anything that can list its members and invoke one by
//! name. [`Case`] is the ready-made implementation: a named state value plus
//! a table of methods, optionally delegating to shared [`Behavior`]s so a
//! group of cases can reuse tests, `setup` and `teardown`.
//!
//! Test bodies receive the shared [`Assertions`] context as an explicit
//! argument and return [`TestResult`], so assertion failures propagate with
//! `?` like any other error.

use std::fmt;
use std::rc::Rc;

use minitest_core::{Assertions, Capabilities, Member, Value};

/// Outcome of a test body, `setup` or `teardown`.
pub type TestResult = anyhow::Result<()>;

/// A method stored on a case or behavior.
pub type Method<S> = Rc<dyn Fn(&mut S, &Assertions) -> TestResult>;

/// Name of the per-test setup hook.
pub const SETUP: &str = "setup";

/// Name of the per-test teardown hook.
pub const TEARDOWN: &str = "teardown";

/// A registered unit of tests.
///
/// The runner only reads members and invokes them; it never inspects the
/// case any other way. Implementations report their callable members
/// through [`Capabilities`], including any reached through delegation.
pub trait TestCase: Capabilities {
    /// Name shown in reports.
    fn name(&self) -> &str;

    /// Invokes the method `name`. Returns `None` if no such method exists.
    fn call(&mut self, name: &str, assertions: &Assertions) -> Option<TestResult>;
}

enum Entry<S> {
    Method(Method<S>),
    Field(Value),
}

/// A reusable table of methods and fields, shared between cases.
pub struct Behavior<S> {
    name: String,
    entries: Vec<(String, Entry<S>)>,
    bases: Vec<Rc<Behavior<S>>>,
}

impl<S> Behavior<S> {
    /// Creates an empty behavior.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            bases: Vec::new(),
        }
    }

    /// Behavior name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defines a method, replacing any own member with the same name.
    #[must_use]
    pub fn method(
        self,
        name: impl Into<String>,
        body: impl Fn(&mut S, &Assertions) -> TestResult + 'static,
    ) -> Self {
        self.define(name.into(), Entry::Method(Rc::new(body)))
    }

    /// Defines the `setup` hook.
    #[must_use]
    pub fn setup(self, body: impl Fn(&mut S, &Assertions) -> TestResult + 'static) -> Self {
        self.method(SETUP, body)
    }

    /// Defines the `teardown` hook.
    #[must_use]
    pub fn teardown(self, body: impl Fn(&mut S, &Assertions) -> TestResult + 'static) -> Self {
        self.method(TEARDOWN, body)
    }

    /// Defines a non-callable member. A field shadows any delegated method
    /// with the same name.
    #[must_use]
    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define(name.into(), Entry::Field(value.into()))
    }

    /// Delegates lookups that miss the own table to `base`.
    #[must_use]
    pub fn include(mut self, base: Rc<Self>) -> Self {
        self.bases.push(base);
        self
    }

    /// Wraps the behavior for sharing between cases.
    #[must_use]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// Looks up a field value, own entries first, then bases depth-first.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self.lookup(name)? {
            Entry::Field(value) => Some(value),
            Entry::Method(_) => None,
        }
    }

    fn define(mut self, name: String, entry: Entry<S>) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name, entry)),
        }
        self
    }

    fn lookup(&self, name: &str) -> Option<&Entry<S>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
            .or_else(|| self.bases.iter().find_map(|base| base.lookup(name)))
    }

    fn lookup_method(&self, name: &str) -> Option<Method<S>> {
        match self.lookup(name)? {
            Entry::Method(method) => Some(Rc::clone(method)),
            Entry::Field(_) => None,
        }
    }
}

impl<S> Capabilities for Behavior<S> {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn own_members(&self) -> Vec<Member> {
        self.entries
            .iter()
            .map(|(name, entry)| match entry {
                Entry::Method(_) => Member::method(name.clone()),
                Entry::Field(_) => Member::field(name.clone()),
            })
            .collect()
    }

    fn delegates(&self) -> Vec<&dyn Capabilities> {
        self.bases
            .iter()
            .map(|base| base.as_ref() as &dyn Capabilities)
            .collect()
    }
}

impl<S> fmt::Debug for Behavior<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field(
                "members",
                &self.entries.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field(
                "bases",
                &self.bases.iter().map(|base| base.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A named test case: state plus methods operating on it.
///
/// ```rust
/// use minitest_runner::Case;
///
/// let case = Case::new("CounterTest", 0_u32)
///     .setup(|n, _| {
///         *n = 0;
///         Ok(())
///     })
///     .method("test_increment", |n, t| {
///         *n += 1;
///         t.assert_equal(1, *n, ())?;
///         Ok(())
///     });
/// assert_eq!(case.state(), &0);
/// ```
pub struct Case<S> {
    table: Behavior<S>,
    state: S,
}

impl<S> Case<S> {
    /// Creates a case with no members.
    #[must_use]
    pub fn new(name: impl Into<String>, state: S) -> Self {
        Self {
            table: Behavior::new(name),
            state,
        }
    }

    /// Defines a method on the case itself.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&mut S, &Assertions) -> TestResult + 'static,
    ) -> Self {
        self.table = self.table.method(name, body);
        self
    }

    /// Defines the `setup` hook.
    #[must_use]
    pub fn setup(self, body: impl Fn(&mut S, &Assertions) -> TestResult + 'static) -> Self {
        self.method(SETUP, body)
    }

    /// Defines the `teardown` hook.
    #[must_use]
    pub fn teardown(self, body: impl Fn(&mut S, &Assertions) -> TestResult + 'static) -> Self {
        self.method(TEARDOWN, body)
    }

    /// Defines a non-callable member.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.table = self.table.field(name, value);
        self
    }

    /// Delegates to a shared behavior.
    #[must_use]
    pub fn include(mut self, base: Rc<Behavior<S>>) -> Self {
        self.table = self.table.include(base);
        self
    }

    /// The case state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the case state.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consumes the case, returning its state.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> Capabilities for Case<S> {
    fn label(&self) -> String {
        self.table.label()
    }

    fn own_members(&self) -> Vec<Member> {
        self.table.own_members()
    }

    fn delegates(&self) -> Vec<&dyn Capabilities> {
        self.table.delegates()
    }
}

impl<S> TestCase for Case<S> {
    fn name(&self) -> &str {
        self.table.name()
    }

    fn call(&mut self, name: &str, assertions: &Assertions) -> Option<TestResult> {
        let method = self.table.lookup_method(name)?;
        Some(method(&mut self.state, assertions))
    }
}

impl<S: fmt::Debug> fmt::Debug for Case<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("table", &self.table)
            .field("state", &self.state)
            .finish()
    }
}
