// history.rs

use std::collections::VecDeque;
use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use log::trace;

use crate::parser::join_tokens;

/// Default number of entries the store holds before evicting the oldest.
pub const MAX_HISTORY: usize = 50;

/// How many entries the `history` builtin lists.
pub const RECENT_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub arguments: Vec<OsString>,
}

/// Bounded ring of accepted commands.
///
/// Sequence numbers keep counting up across evictions, so a number that has
/// fallen out of the ring never resolves again.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    next_sequence: u64,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    /// Stores a copy of `arguments` and returns its sequence number.
    ///
    /// Empty commands and `!` re-invocations are never recorded.
    pub fn record(&mut self, arguments: &[OsString]) -> Option<u64> {
        let first = arguments.first()?;
        if first.as_bytes().starts_with(b"!") {
            return None;
        }
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                trace!("history full, evicting entry {}", evicted.sequence);
            }
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(HistoryEntry {
            sequence,
            arguments: arguments.to_vec(),
        });
        trace!("recorded history entry {sequence}");
        Some(sequence)
    }

    pub fn resolve(&self, sequence: u64) -> Option<&[OsString]> {
        self.entries
            .iter()
            .find(|entry| entry.sequence == sequence)
            .map(|entry| entry.arguments.as_slice())
    }

    pub fn last(&self) -> Option<&[OsString]> {
        self.entries.back().map(|entry| entry.arguments.as_slice())
    }

    /// Lists the `count` most recent entries, oldest first, one per line as
    /// `<sequence>\t<arguments joined by spaces>`.
    pub fn render_recent(&self, count: usize) -> Vec<u8> {
        let start = self.entries.len().saturating_sub(count);
        let mut listing = Vec::new();
        for entry in self.entries.iter().skip(start) {
            listing.extend_from_slice(format!("{}\t", entry.sequence).as_bytes());
            listing.extend_from_slice(&join_tokens(&entry.arguments));
            listing.push(b'\n');
        }
        listing
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<OsString> {
        line.split_whitespace().map(OsString::from).collect()
    }

    fn rendered(history: &History, count: usize) -> String {
        String::from_utf8(history.render_recent(count)).unwrap()
    }

    #[test]
    fn test_record_assigns_increasing_numbers() {
        let mut history = History::new();
        assert_eq!(history.record(&args("ls")), Some(0));
        assert_eq!(history.record(&args("pwd")), Some(1));
        assert_eq!(history.record(&args("echo hi")), Some(2));
        assert_eq!(history.len(), 3);
        assert_eq!(history.resolve(2), Some(args("echo hi").as_slice()));
        assert_eq!(history.last(), Some(args("echo hi").as_slice()));
    }

    #[test]
    fn test_record_rejects_empty_and_bang_commands() {
        let mut history = History::new();
        assert_eq!(history.record(&[]), None);
        assert_eq!(history.record(&args("!!")), None);
        assert_eq!(history.record(&args("!3")), None);
        assert!(history.is_empty());
        assert_eq!(history.last(), None);
        // rejected commands do not consume a sequence number
        assert_eq!(history.record(&args("true")), Some(0));
    }

    #[test]
    fn test_resolve_unknown_number() {
        let mut history = History::new();
        history.record(&args("ls"));
        assert_eq!(history.resolve(1), None);
        assert_eq!(history.resolve(u64::MAX), None);
    }

    #[test]
    fn test_full_ring_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for word in ["a", "b", "c", "d"] {
            history.record(&args(word));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.resolve(0), None);
        assert_eq!(history.resolve(1), Some(args("b").as_slice()));
        assert_eq!(history.record(&args("e")), Some(4));
        assert_eq!(history.resolve(1), None);
        assert_eq!(history.last(), Some(args("e").as_slice()));
    }

    #[test]
    fn test_default_capacity_holds_fifty() {
        let mut history = History::new();
        for n in 0..MAX_HISTORY {
            history.record(&[OsString::from(format!("cmd{n}"))]);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        for n in 0..MAX_HISTORY as u64 {
            assert!(history.resolve(n).is_some());
        }
        history.record(&args("one-more"));
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.resolve(0), None);
        assert_eq!(history.resolve(MAX_HISTORY as u64), Some(args("one-more").as_slice()));
    }

    #[test]
    fn test_render_recent_short_history() {
        let mut history = History::new();
        history.record(&args("ls"));
        history.record(&args("sleep 1 &"));
        assert_eq!(rendered(&history, RECENT_WINDOW), "0\tls\n1\tsleep 1 &\n");
    }

    #[test]
    fn test_render_recent_window() {
        let mut history = History::new();
        for n in 0..15 {
            history.record(&[OsString::from(format!("cmd{n}"))]);
        }
        let listing = rendered(&history, RECENT_WINDOW);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "5\tcmd5");
        assert_eq!(lines[9], "14\tcmd14");
    }

    #[test]
    fn test_render_empty() {
        assert!(History::new().render_recent(RECENT_WINDOW).is_empty());
    }

    #[test]
    fn test_non_utf8_arguments_kept_verbatim() {
        use std::ffi::OsStr;

        let mut history = History::new();
        let cd = vec![OsString::from("cd"), OsStr::from_bytes(b"caf\xe9").to_os_string()];
        history.record(&cd);
        assert_eq!(history.last(), Some(cd.as_slice()));
        assert_eq!(history.render_recent(RECENT_WINDOW), b"0\tcd caf\xe9\n");
    }
}
