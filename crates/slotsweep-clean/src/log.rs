//! Leveled diagnostics sink.
//!
//! The orchestrator reports what it finds and does through a [`LogSink`].
//! Nothing it logs is ever read back for control flow. [`TracingLog`]
//! forwards to `tracing`; [`RecordingLog`] keeps entries in memory.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Receives leveled messages, optionally tied to an object (a node path or
/// an asset path).
pub trait LogSink {
    fn log(&mut self, level: LogLevel, message: &str, object: Option<&str>);

    fn info(&mut self, message: &str, object: Option<&str>) {
        self.log(LogLevel::Info, message, object);
    }

    fn warning(&mut self, message: &str, object: Option<&str>) {
        self.log(LogLevel::Warning, message, object);
    }

    fn error(&mut self, message: &str, object: Option<&str>) {
        self.log(LogLevel::Error, message, object);
    }
}

/// Forwards every message to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&mut self, level: LogLevel, message: &str, object: Option<&str>) {
        let object = object.unwrap_or_default();
        match level {
            LogLevel::Info => tracing::info!(object, "{}", message),
            LogLevel::Warning => tracing::warn!(object, "{}", message),
            LogLevel::Error => tracing::error!(object, "{}", message),
        }
    }
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub object: Option<String>,
}

/// Keeps every message in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    pub entries: Vec<LogEntry>,
}

impl RecordingLog {
    pub fn new() -> Self {
        RecordingLog::default()
    }

    /// Number of entries at `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Messages at `level`, in order.
    pub fn messages(&self, level: LogLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.as_str())
            .collect()
    }
}

impl LogSink for RecordingLog {
    fn log(&mut self, level: LogLevel, message: &str, object: Option<&str>) {
        self.entries.push(LogEntry {
            level,
            message: message.to_string(),
            object: object.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_log_counts_by_level() {
        let mut log = RecordingLog::new();
        log.info("scanned", None);
        log.warning("skipped", Some("Assets/A.prefab"));
        log.info("done", None);

        assert_eq!(log.count(LogLevel::Info), 2);
        assert_eq!(log.messages(LogLevel::Warning), vec!["skipped"]);
        assert_eq!(log.entries[1].object.as_deref(), Some("Assets/A.prefab"));
    }
}
