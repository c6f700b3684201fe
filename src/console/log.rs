//! Console log entries

use chrono::{DateTime, Local};
use std::fmt;

/// Kind of a log entry, used by renderers to pick a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
    Success,
    System,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Info => write!(f, "info"),
            LogKind::Error => write!(f, "error"),
            LogKind::Success => write!(f, "success"),
            LogKind::System => write!(f, "system"),
        }
    }
}

/// One block of terminal output
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    pub kind: LogKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Append-only sequence of entries with monotonic ids
#[derive(Debug, Default)]
pub struct ConsoleLog {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id
    pub fn push(&mut self, kind: LogKind, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            kind,
            message: message.into(),
            timestamp: Local::now(),
        });
        id
    }

    /// Drop every entry. Ids keep increasing so renderers never see a reused one.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, oldest first
    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_stay_unique_across_clear() {
        let mut log = ConsoleLog::new();
        let first = log.push(LogKind::Info, "one");
        let second = log.push(LogKind::Error, "two");
        assert!(second > first);

        log.clear();
        assert!(log.is_empty());

        let third = log.push(LogKind::System, "three");
        assert!(third > second);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_of_kind() {
        let mut log = ConsoleLog::new();
        log.push(LogKind::Info, "a");
        log.push(LogKind::Error, "b");
        log.push(LogKind::Info, "c");

        let infos: Vec<_> = log.of_kind(LogKind::Info).map(|e| e.message.as_str()).collect();
        assert_eq!(infos, vec!["a", "c"]);
    }
}
