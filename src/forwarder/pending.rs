//! Entries waiting for the session handle.

use crate::entry::LogEntry;

/// Ordered entries plus a clear flag that logically precedes all of them.
#[derive(Debug, Default)]
pub struct PendingBuffer {
    entries: Vec<LogEntry>,
    clear_requested: bool,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Forget everything buffered so far and remember to clear on drain.
    pub fn request_clear(&mut self) {
        self.entries.clear();
        self.clear_requested = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_requested
    }

    /// Consume the buffer, yielding the clear flag and the entries in order.
    pub fn into_parts(self) -> (bool, Vec<LogEntry>) {
        (self.clear_requested, self.entries)
    }
}
