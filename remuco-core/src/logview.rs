//! User-facing session log.
//!
//! A deliberately small logging surface: line-oriented, one severity,
//! swappable sink. It carries the narrative the UI shows on its log
//! screen — diagnostic logging throughout the crate goes through
//! `tracing` instead and is not routed here.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A line-oriented log sink. Single severity.
pub trait LogSink: Send {
    fn println(&self, line: &str);
}

/// Default sink: standard output.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn println(&self, line: &str) {
        println!("{line}");
    }
}

// ── Logger ───────────────────────────────────────────────────────

/// Session logger with a runtime-swappable sink.
///
/// Cloning yields a handle to the same sink, so components created at
/// different times all write to whatever sink is currently installed.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Mutex<Box<dyn LogSink>>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// A logger writing to standard output.
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(ConsoleSink))),
        }
    }

    /// Replace the sink. Takes effect for all handles immediately.
    pub fn set_sink(&self, sink: Box<dyn LogSink>) {
        let mut guard = self.sink.lock().expect("log sink lock poisoned");
        *guard = sink;
    }

    /// Log a line.
    pub fn ln(&self, line: &str) {
        let guard = self.sink.lock().expect("log sink lock poisoned");
        guard.println(line);
    }
}

// ── LogView ──────────────────────────────────────────────────────

/// Lines kept before the view starts dropping old ones.
const MAX_LINES: usize = 70;

/// Lines dropped in one go when the view is full.
const DROP_CHUNK: usize = 10;

/// Bounded in-memory log buffer backing the UI's log screen.
///
/// Keeps at most [`MAX_LINES`] lines; when full, the oldest
/// [`DROP_CHUNK`] lines are discarded at once so the buffer is not
/// trimmed on every append.
#[derive(Clone, Default)]
pub struct LogView {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the buffered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        let guard = self.lines.lock().expect("log view lock poisoned");
        guard.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().expect("log view lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for LogView {
    fn println(&self, line: &str) {
        let mut guard = self.lines.lock().expect("log view lock poisoned");
        if guard.len() >= MAX_LINES {
            for _ in 0..DROP_CHUNK {
                guard.pop_front();
            }
        }
        guard.push_back(line.to_string());
    }
}
