//! # Logging Capability
//!
//! The gate never reaches for a global logger. Callers pass a
//! [`LogSink`] into each operation; the gate emits at most one record per
//! API entity it processes.
//!
//! Two implementations ship with the crate:
//!
//! - [`TracingLogSink`] forwards records to `tracing`, letting the host's
//!   subscriber decide formatting and filtering.
//! - [`MemoryLogSink`] captures records so tests can assert on exact
//!   messages and call counts.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

/// Log record level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A borrowed log record with optional structured fields.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub message: &'a str,
    pub fields: &'a [(&'a str, &'a str)],
}

/// Capability to emit log records.
///
/// Implementations must be `Send + Sync`: a single sink may be shared by
/// concurrent validations.
pub trait LogSink: Send + Sync {
    /// Emit one record.
    fn record(&self, record: &LogRecord<'_>);

    fn debug(&self, message: &str) {
        self.debug_with(message, &[]);
    }

    fn debug_with(&self, message: &str, fields: &[(&str, &str)]) {
        self.record(&LogRecord { level: LogLevel::Debug, message, fields });
    }

    fn info(&self, message: &str) {
        self.info_with(message, &[]);
    }

    fn info_with(&self, message: &str, fields: &[(&str, &str)]) {
        self.record(&LogRecord { level: LogLevel::Info, message, fields });
    }

    fn warn(&self, message: &str) {
        self.warn_with(message, &[]);
    }

    fn warn_with(&self, message: &str, fields: &[(&str, &str)]) {
        self.record(&LogRecord { level: LogLevel::Warn, message, fields });
    }

    fn error(&self, message: &str) {
        self.error_with(message, &[]);
    }

    fn error_with(&self, message: &str, fields: &[(&str, &str)]) {
        self.record(&LogRecord { level: LogLevel::Error, message, fields });
    }
}

// ─── Tracing Sink ───────────────────────────────────────────────────

/// `tracing` target for every event emitted by [`TracingLogSink`].
pub const LOG_TARGET: &str = "specgate";

/// Forwards records to the `tracing` macros under [`LOG_TARGET`].
///
/// Structured fields are rendered into a single `fields` value
/// (`key=value key=value`) because `tracing` field names must be static.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

struct DisplayFields<'a>(&'a [(&'a str, &'a str)]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl LogSink for TracingLogSink {
    fn record(&self, record: &LogRecord<'_>) {
        let fields = DisplayFields(record.fields);
        let message = record.message;
        match (record.level, record.fields.is_empty()) {
            (LogLevel::Debug, true) => tracing::debug!(target: LOG_TARGET, "{message}"),
            (LogLevel::Debug, false) => {
                tracing::debug!(target: LOG_TARGET, fields = %fields, "{message}")
            }
            (LogLevel::Info, true) => tracing::info!(target: LOG_TARGET, "{message}"),
            (LogLevel::Info, false) => {
                tracing::info!(target: LOG_TARGET, fields = %fields, "{message}")
            }
            (LogLevel::Warn, true) => tracing::warn!(target: LOG_TARGET, "{message}"),
            (LogLevel::Warn, false) => {
                tracing::warn!(target: LOG_TARGET, fields = %fields, "{message}")
            }
            (LogLevel::Error, true) => tracing::error!(target: LOG_TARGET, "{message}"),
            (LogLevel::Error, false) => {
                tracing::error!(target: LOG_TARGET, fields = %fields, "{message}")
            }
        }
    }
}

// ─── Memory Sink ────────────────────────────────────────────────────

/// An owned copy of a captured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedLogRecord {
    pub level: LogLevel,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl OwnedLogRecord {
    /// Look up a structured field by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Captures every record in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<OwnedLogRecord>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured records.
    pub fn records(&self) -> Vec<OwnedLogRecord> {
        self.records.lock().clone()
    }

    /// Messages captured at `level`, in order.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemoryLogSink {
    fn record(&self, record: &LogRecord<'_>) {
        self.records.lock().push(OwnedLogRecord {
            level: record.level,
            message: record.message.to_string(),
            fields: record
                .fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}
