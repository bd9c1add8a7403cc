//! Output sinks for progress markers and reports.
//!
//! The runner only ever calls [`OutputSink::write`] and
//! [`OutputSink::flush`]. Write failures are logged and dropped so that
//! reporting can never abort a run.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::config::OutputMode;

/// Destination for runner output.
pub trait OutputSink {
    /// Writes text.
    fn write(&mut self, text: &str);

    /// Flushes anything written so far.
    fn flush(&mut self);
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn write(&mut self, text: &str) {
        (**self).write(text);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Writes straight through to stdout.
#[derive(Debug)]
pub struct ConsoleSink {
    out: io::Stdout,
}

impl ConsoleSink {
    /// Creates a console sink.
    #[must_use]
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for ConsoleSink {
    fn write(&mut self, text: &str) {
        let mut out = self.out.lock();
        // Progress markers are single characters; push them out immediately.
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %e, "console write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "console flush failed");
        }
    }
}

/// Accumulates all output and writes it once, on flush.
#[derive(Debug)]
pub struct BufferedSink<W: Write> {
    buffer: String,
    writer: W,
}

impl<W: Write> BufferedSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            buffer: String::new(),
            writer,
        }
    }

    /// Text written since the last flush.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Returns the wrapped writer, discarding unflushed text.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for BufferedSink<W> {
    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let result = self
            .writer
            .write_all(self.buffer.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(e) = result {
            warn!(error = %e, bytes = self.buffer.len(), "buffered output write failed");
        }
        self.buffer.clear();
    }
}

/// In-memory sink whose contents can be read back.
///
/// Clones share the same buffer, so a clone handed to the runner can be
/// inspected through the original after the run.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    contents: Arc<Mutex<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.contents.lock().clone()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.contents.lock().clear();
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, text: &str) {
        self.contents.lock().push_str(text);
    }

    fn flush(&mut self) {}
}

/// Picks a sink for the given mode.
///
/// `Auto` writes through when stdout is a terminal and buffers otherwise.
#[must_use]
pub fn detect_sink(mode: OutputMode) -> Box<dyn OutputSink> {
    let mode = match mode {
        OutputMode::Auto if io::stdout().is_terminal() => OutputMode::Console,
        OutputMode::Auto => OutputMode::Buffered,
        explicit => explicit,
    };
    match mode {
        OutputMode::Console => Box::new(ConsoleSink::new()),
        OutputMode::Buffered | OutputMode::Auto => Box::new(BufferedSink::new(io::stdout())),
    }
}
