//! Bounded, newest-first lookup history.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Definition;

/// Default number of entries kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default window within which a repeated lookup replaces the earlier entry
pub const DEFAULT_DEDUPE_WINDOW: Duration = Duration::from_secs(60);

/// A definition and when it was looked up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub definition: Definition,
    pub looked_up_at: DateTime<Utc>,
}

/// Lookup history, newest first
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    dedupe_window: chrono::Duration,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_DEDUPE_WINDOW)
    }
}

impl History {
    pub fn new(capacity: usize, dedupe_window: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            dedupe_window: chrono::Duration::from_std(dedupe_window)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
        }
    }

    /// Restore persisted entries (assumed newest first), dropping overflow
    pub fn with_entries(mut self, entries: Vec<HistoryEntry>) -> Self {
        self.entries = entries.into_iter().take(self.capacity).collect();
        self
    }

    pub fn record(&mut self, definition: Definition) {
        self.record_at(definition, Utc::now());
    }

    /// Push a definition as the newest entry.
    ///
    /// An entry for the same word (case-insensitive) recorded within the
    /// dedupe window is removed first.
    pub fn record_at(&mut self, definition: Definition, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }

        let word = definition.word.to_lowercase();
        let window = self.dedupe_window;
        self.entries.retain(|e| {
            !(e.definition.word.to_lowercase() == word && now - e.looked_up_at <= window)
        });

        self.entries.push_front(HistoryEntry {
            definition,
            looked_up_at: now,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
