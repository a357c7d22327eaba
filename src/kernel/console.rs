//! Append-only activity log shown in the console panel.

use chrono::{DateTime, Utc};

/// `tracing` target every console entry is mirrored under.
pub const CONSOLE_TARGET: &str = "promptbench::console";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Info,
    Success,
    Warning,
    Error,
    System,
}

impl LogCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogEntryId(u64);

impl LogEntryId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLogEntry {
    id: LogEntryId,
    category: LogCategory,
    message: String,
    timestamp: DateTime<Utc>,
}

impl ConsoleLogEntry {
    pub fn id(&self) -> LogEntryId {
        self.id
    }

    pub fn category(&self) -> LogCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl std::fmt::Display for ConsoleLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {:<7} {}",
            self.timestamp.format("%H:%M:%S"),
            self.category.label(),
            self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct ConsoleLog {
    entries: Vec<ConsoleLogEntry>,
    next_id: u64,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, category: LogCategory, message: impl Into<String>) -> LogEntryId {
        let message = message.into();
        match category {
            LogCategory::Error => {
                tracing::error!(target: CONSOLE_TARGET, category = category.label(), "{message}")
            }
            LogCategory::Warning => {
                tracing::warn!(target: CONSOLE_TARGET, category = category.label(), "{message}")
            }
            _ => {
                tracing::info!(target: CONSOLE_TARGET, category = category.label(), "{message}")
            }
        }

        let id = LogEntryId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        // Clock skew must not reorder entries.
        let now = Utc::now();
        let timestamp = self
            .entries
            .last()
            .map(|last| last.timestamp.max(now))
            .unwrap_or(now);

        self.entries.push(ConsoleLogEntry {
            id,
            category,
            message,
            timestamp,
        });
        id
    }

    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.clear();
        true
    }

    pub fn entries(&self) -> &[ConsoleLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConsoleLogEntry> {
        self.entries.last()
    }
}
