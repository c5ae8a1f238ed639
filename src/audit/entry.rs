//! Audit entry type.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::Level;

/// A single audit log entry.
///
/// Immutable once created; rendered as exactly one line in the per-day
/// log file.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// UTC creation time, second precision when rendered.
    pub timestamp: DateTime<Utc>,
    /// Severity of the entry.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context, rendered as compact JSON.
    pub context: Option<Value>,
}

impl LogEntry {
    /// Create an entry stamped with the current wall clock.
    pub fn new(level: Level, message: impl Into<String>, context: Option<Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context,
        }
    }

    /// Render the entry as a single log line.
    ///
    /// Format: `[YYYY-MM-DD HH:MM:SS] [LEVEL] message {context}`. Embedded
    /// newlines in the message are flattened so one entry is always one
    /// line.
    pub fn render(&self) -> String {
        let message = if self.message.contains(['\r', '\n']) {
            self.message.replace(['\r', '\n'], " ")
        } else {
            self.message.clone()
        };
        let mut line = format!(
            "[{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            message
        );
        if let Some(context) = &self.context {
            line.push(' ');
            line.push_str(&serde_json::to_string(context).unwrap_or_default());
        }
        line
    }
}
