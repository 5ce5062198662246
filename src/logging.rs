// src/logging.rs

//! Per-file log sinks
//!
//! Every input file reports through its own [`FileLog`]. Messages go out as
//! `tracing` events tagged with the file name and are also kept on the sink,
//! so the batch driver can attach them to the file's outcome.
//!
//! Sinks are handed out by a [`LogRegistry`] that lives for one batch run.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Severity of a recorded message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// A message recorded against one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub text: String,
}

/// Log sink for a single input file
#[derive(Debug)]
pub struct FileLog {
    name: String,
    messages: Mutex<Vec<LogMessage>>,
}

impl FileLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// File name this sink reports for
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self, text: impl Into<String>) {
        let text = text.into();
        info!(file = %self.name, "{}", text);
        self.record(Level::Info, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        let text = text.into();
        warn!(file = %self.name, "{}", text);
        self.record(Level::Warn, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        let text = text.into();
        error!(file = %self.name, "{}", text);
        self.record(Level::Error, text);
    }

    /// Snapshot of everything recorded so far
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages.lock().clone()
    }

    /// Recorded messages at the given level
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.level == level)
            .map(|m| m.text.clone())
            .collect()
    }

    fn record(&self, level: Level, text: String) {
        self.messages.lock().push(LogMessage { level, text });
    }
}

/// Registry of file log sinks, scoped to one batch run
#[derive(Debug, Default)]
pub struct LogRegistry {
    sinks: DashMap<String, Arc<FileLog>>,
}

impl LogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the sink for a file, creating it on first access
    ///
    /// Concurrent first accesses for the same name observe the same sink.
    pub fn get_or_create(&self, name: &str) -> Arc<FileLog> {
        self.sinks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(FileLog::new(name)))
            .value()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<FileLog>> {
        self.sinks.get(name).map(|sink| sink.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
