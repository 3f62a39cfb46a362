//! Append-only transcript of submitted command lines with shell-style
//! up/down recall.

use ccview_protocol::HistoryDirection;

/// Invariant: `cursor` is always in `[0, entries.len()]`. `entries.len()`
/// means "past the end", i.e. a fresh blank input line.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one submitted line. Whitespace-only lines are not recorded.
    /// Recording always resets the cursor past the last entry.
    pub fn record(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        self.entries.push(raw.to_string());
        self.cursor = self.entries.len();
    }

    /// Move the cursor and return the entry now under it.
    ///
    /// `Up` past the oldest entry and `Down` past the end are no-ops
    /// returning `None`; `Down` landing exactly past the end returns an
    /// empty string ("back to a blank line").
    pub fn navigate(&mut self, direction: HistoryDirection) -> Option<String> {
        match direction {
            HistoryDirection::Up => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor -= 1;
                Some(self.entries[self.cursor].clone())
            }
            HistoryDirection::Down => {
                if self.cursor >= self.entries.len() {
                    return None;
                }
                self.cursor += 1;
                if self.cursor == self.entries.len() {
                    Some(String::new())
                } else {
                    Some(self.entries[self.cursor].clone())
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn filled() -> HistoryNavigator {
        let mut history = HistoryNavigator::new();
        for line in ["ccget natom", "ccget charge", "ccwrite xyz"] {
            history.record(line);
        }
        history
    }

    #[test]
    fn record_resets_cursor_past_the_end() {
        let mut history = filled();
        history.navigate(HistoryDirection::Up);
        history.navigate(HistoryDirection::Up);
        history.record("help");
        assert_eq!(history.cursor(), history.len());
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut history = HistoryNavigator::new();
        history.record("   ");
        history.record("");
        assert!(history.is_empty());
    }

    #[test]
    fn up_walks_back_in_reverse_chronological_order() {
        let mut history = filled();
        assert_eq!(history.navigate(HistoryDirection::Up).as_deref(), Some("ccwrite xyz"));
        assert_eq!(history.navigate(HistoryDirection::Up).as_deref(), Some("ccget charge"));
        assert_eq!(history.navigate(HistoryDirection::Up).as_deref(), Some("ccget natom"));
        // Past the oldest entry: nothing, not an empty string.
        assert_eq!(history.navigate(HistoryDirection::Up), None);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn down_returns_to_a_blank_line() {
        let mut history = filled();
        history.navigate(HistoryDirection::Up);
        history.navigate(HistoryDirection::Up);
        assert_eq!(history.navigate(HistoryDirection::Down).as_deref(), Some("ccwrite xyz"));
        assert_eq!(history.navigate(HistoryDirection::Down).as_deref(), Some(""));
        assert_eq!(history.navigate(HistoryDirection::Down), None);
    }

    #[test]
    fn down_on_fresh_history_is_a_noop() {
        let mut history = filled();
        assert_eq!(history.navigate(HistoryDirection::Down), None);
        assert_eq!(history.cursor(), history.len());
    }
}
