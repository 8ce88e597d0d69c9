use serde::Serialize;
use std::time::SystemTime;

/// Change/save bookkeeping for the store.
///
/// Timestamps are for reporting; ordering uses a change sequence so that a set
/// and a flush landing in the same clock tick are still ordered correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreClock {
    last_change: SystemTime,
    last_save: SystemTime,
    change_seq: u64,
    saved_seq: u64,
}

impl StoreClock {
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            last_change: now,
            last_save: now,
            change_seq: 0,
            saved_seq: 0,
        }
    }

    pub fn last_change(&self) -> SystemTime {
        self.last_change
    }

    pub fn last_save(&self) -> SystemTime {
        self.last_save
    }

    pub fn change_seq(&self) -> u64 {
        self.change_seq
    }

    /// Dirty iff the latest change is after the latest save.
    pub fn is_dirty(&self) -> bool {
        self.change_seq > self.saved_seq
    }

    pub(crate) fn mark_changed(&mut self) {
        self.change_seq += 1;
        self.last_change = SystemTime::now();
    }

    /// Record that everything up to `seq` is durable. Changes made after the
    /// snapshot was taken keep the store dirty.
    pub(crate) fn mark_saved(&mut self, seq: u64) {
        self.saved_seq = self.saved_seq.max(seq);
        self.last_save = SystemTime::now();
    }
}

impl Default for StoreClock {
    fn default() -> Self {
        Self::new()
    }
}
