//! Submitted command history and arrow-key recall

use std::collections::VecDeque;

/// Raw commands, most recent first. Never deduplicated.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a submitted command and stop browsing
    pub fn record(&mut self, command: &str) {
        self.entries.push_front(command.to_string());
        self.cursor = None;
    }

    /// Stop browsing without recording anything
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Up arrow: step toward older commands, stopping at the oldest.
    /// Returns the command to place in the input, if any.
    pub fn recall_older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }

        let index = match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.entries.len() - 1),
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Down arrow: step toward newer commands. Moving past the newest ends
    /// browsing and yields an empty input. `None` means leave the input alone.
    pub fn recall_newer(&mut self) -> Option<&str> {
        match self.cursor {
            None => None,
            Some(0) => {
                self.cursor = None;
                Some("")
            }
            Some(i) => {
                self.cursor = Some(i - 1);
                self.entries.get(i - 1).map(String::as_str)
            }
        }
    }

    /// Position while browsing (0 = most recent)
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Most recent first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numbered listing, oldest first, as printed by `history`
    pub fn listing(&self) -> String {
        self.entries
            .iter()
            .rev()
            .enumerate()
            .map(|(i, cmd)| format!("{}  {}", i + 1, cmd))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(commands: &[&str]) -> CommandHistory {
        let mut history = CommandHistory::new();
        for cmd in commands {
            history.record(cmd);
        }
        history
    }

    #[test]
    fn test_recall_older_clamps_at_oldest() {
        let mut history = history_of(&["ping", "start 1gb", "stop"]);

        assert_eq!(history.recall_older(), Some("stop"));
        assert_eq!(history.recall_older(), Some("start 1gb"));
        assert_eq!(history.recall_older(), Some("ping"));
        assert_eq!(history.recall_older(), Some("ping"));
        assert_eq!(history.cursor(), Some(2));
    }

    #[test]
    fn test_recall_newer_resets_past_newest() {
        let mut history = history_of(&["ping", "stop"]);

        assert_eq!(history.recall_newer(), None);

        history.recall_older();
        history.recall_older();
        assert_eq!(history.recall_newer(), Some("stop"));
        assert_eq!(history.recall_newer(), Some(""));
        assert_eq!(history.cursor(), None);
        assert_eq!(history.recall_newer(), None);
    }

    #[test]
    fn test_empty_history() {
        let mut history = CommandHistory::new();
        assert_eq!(history.recall_older(), None);
        assert_eq!(history.recall_newer(), None);
        assert_eq!(history.listing(), "");
    }

    #[test]
    fn test_record_keeps_duplicates_and_resets_cursor() {
        let mut history = history_of(&["ping", "ping"]);
        history.recall_older();
        history.record("help");

        assert_eq!(history.cursor(), None);
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["help", "ping", "ping"]);
        assert_eq!(history.listing(), "1  ping\n2  ping\n3  help");
    }
}
