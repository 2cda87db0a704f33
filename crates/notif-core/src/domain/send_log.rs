use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The persisted send history: normalized address -> unix timestamps of
/// successful sends, in append order.
///
/// Serialized as a bare JSON object, e.g. `{"foo@bar.com": [1700000000]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendLog {
    entries: BTreeMap<String, Vec<i64>>,
}

impl SendLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamps recorded for `key`, oldest first. Empty if unknown.
    pub fn timestamps(&self, key: &str) -> &[i64] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a send, creating the key's history if absent.
    pub fn append(&mut self, key: &str, timestamp: i64) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(timestamp);
    }

    /// Drop timestamps for `key` that fall outside the window at `now`.
    pub fn prune(&mut self, key: &str, now: i64, window_secs: u64) {
        let window = i64::try_from(window_secs).unwrap_or(i64::MAX);
        if let Some(history) = self.entries.get_mut(key) {
            history.retain(|ts| now.saturating_sub(*ts) < window);
        }
    }

    /// Number of addresses with a recorded history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
