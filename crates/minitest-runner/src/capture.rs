//! Panic capture for test bodies.
//!
//! A panicking test must not abort the run. [`catch`] runs a closure under
//! `catch_unwind` and turns a panic into a [`Panicked`] record holding the
//! payload text and the panic location (plus a backtrace when
//! `RUST_BACKTRACE` enables one).
//!
//! The location is only visible to a panic hook, so one process-wide hook is
//! installed on first use. It records into a thread-local slot while a
//! capture is active on the current thread and defers to the previously
//! installed hook otherwise.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Once;

/// A panic caught while running a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked {
    /// Panic payload rendered as text.
    pub message: String,
    /// Panic location and optional backtrace.
    pub trace: Option<String>,
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_TRACE: Cell<Option<String>> = const { Cell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                LAST_TRACE.with(|slot| slot.set(Some(describe(info))));
            } else {
                previous(info);
            }
        }));
    });
}

fn describe(info: &PanicHookInfo<'_>) -> String {
    let mut trace = info.location().map_or_else(
        || "at <unknown location>".to_string(),
        |location| {
            format!(
                "at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )
        },
    );
    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        trace.push('\n');
        trace.push_str(&backtrace.to_string());
    }
    trace
}

/// Renders a panic payload as text.
#[must_use]
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Runs `body`, converting a panic into [`Panicked`].
pub fn catch<R>(body: impl FnOnce() -> R) -> Result<R, Panicked> {
    install_hook();
    let outer = CAPTURING.with(|capturing| capturing.replace(true));
    LAST_TRACE.with(Cell::take);
    let result = panic::catch_unwind(AssertUnwindSafe(body));
    CAPTURING.with(|capturing| capturing.set(outer));
    result.map_err(|payload| Panicked {
        message: payload_message(payload.as_ref()),
        trace: LAST_TRACE.with(Cell::take),
    })
}
