//! Bounded, newest-first command history.

use std::collections::VecDeque;

use terra_types::CommandRecord;

/// Number of records kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;

/// Newest-first log of successfully processed commands.
///
/// Index `0` is always the most recent record. Pushing beyond
/// [`HISTORY_CAPACITY`] drops the oldest entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandHistory {
    records: VecDeque<CommandRecord>,
}

impl CommandHistory {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    /// Insert `record` at the front, evicting the oldest entry past capacity.
    pub fn push(&mut self, record: CommandRecord) {
        self.records.push_front(record);
        self.records.truncate(HISTORY_CAPACITY);
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `k`-th most recent record (0 = newest).
    pub fn get(&self, k: usize) -> Option<&CommandRecord> {
        self.records.get(k)
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.records.iter()
    }

    /// Copy the records into a newest-first `Vec`.
    pub fn to_vec(&self) -> Vec<CommandRecord> {
        self.records.iter().cloned().collect()
    }

    /// Drop every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }
}
