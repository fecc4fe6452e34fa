//! Per-identifier emission history
//!
//! The store lives exactly as long as one pipeline and is never evicted.
//! Records are written only after a frame passes every filter.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Emission history for one identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    /// Data of the last emitted frame. `Some(vec![])` is a real zero-length
    /// emission and differs from `None`.
    pub last_data: Option<Vec<u8>>,

    /// Session offset of the last emission that passed the rate limiter
    pub last_emit_time: Option<Duration>,
}

/// Identifier to emission history map owned by one pipeline
#[derive(Debug, Clone, Default)]
pub struct IdentityStore {
    records: HashMap<u32, IdentityRecord>,
}

impl IdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `id`, if anything was ever emitted for it
    pub fn get(&self, id: u32) -> Option<&IdentityRecord> {
        self.records.get(&id)
    }

    /// Last emitted data for `id`
    pub fn last_data(&self, id: u32) -> Option<&[u8]> {
        self.records.get(&id).and_then(|record| record.last_data.as_deref())
    }

    /// Session offset of the last rate-limited emission for `id`
    pub fn last_emit_time(&self, id: u32) -> Option<Duration> {
        self.records.get(&id).and_then(|record| record.last_emit_time)
    }

    /// Record a successful emission
    ///
    /// `emitted_at` is `None` when rate limiting is off, which leaves any
    /// previous emission time untouched.
    pub fn record_emission(&mut self, id: u32, data: Vec<u8>, emitted_at: Option<Duration>) {
        let record = self.records.entry(id).or_default();
        record.last_data = Some(data);
        if let Some(at) = emitted_at {
            record.last_emit_time = Some(at);
        }
    }

    /// Number of identifiers with history
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no identifier has been emitted yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers with history, in ascending order
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
