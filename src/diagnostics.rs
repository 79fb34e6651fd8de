//! Per-client diagnostic output
//!
//! Each client owns a [`Diagnostics`] value: a sink plus an on/off switch. Nothing reaches the
//! sink while verbose output is off. The default sink forwards to `tracing` at debug level.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receiver for verbose diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic line
    fn emit(&self, line: &str);
}

/// Sink that forwards to `tracing::debug!`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::debug!(target: "labbcat::diagnostics", "{}", line);
    }
}

/// A sink and its verbose switch, scoped to one client
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn DiagnosticSink>,
    verbose: Arc<AtomicBool>,
}

impl Diagnostics {
    /// Diagnostics writing to `sink`, initially silent
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            verbose: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Turn verbose output on or off
    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    /// Whether verbose output is on
    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Emit a line if verbose output is on
    ///
    /// The line is built lazily so silent clients pay nothing for formatting.
    pub fn emit_with(&self, line: impl FnOnce() -> String) {
        if self.is_verbose() {
            self.sink.emit(&line());
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.is_verbose())
            .finish_non_exhaustive()
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

impl MemorySink {
    /// Lines recorded so far
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
