//! In-memory id → last-seen association.
//!
//! The tracker trusts its input: callers validate ids before `update`.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct SessionTracker {
    sessions: HashMap<String, u64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record. An older timestamp simply wins;
    /// out-of-order delivery is not an error.
    pub fn update(&mut self, session_id: &str, timestamp: u64) {
        self.sessions.insert(session_id.to_string(), timestamp);
    }

    pub fn remove(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drops every record with `last_seen < cutoff` and returns their ids.
    /// A record exactly at the cutoff survives.
    pub fn prune(&mut self, cutoff: u64) -> Vec<String> {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, last_seen)| **last_seen < cutoff)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.sessions.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn last_seen(&self, session_id: &str) -> Option<u64> {
        self.sessions.get(session_id).copied()
    }

    /// All current records, in no particular order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.sessions
            .iter()
            .map(|(id, last_seen)| (id.clone(), *last_seen))
            .collect()
    }
}
