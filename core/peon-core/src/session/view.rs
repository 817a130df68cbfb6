//! Recency roster derived from the tracker.
//!
//! Recomputed every poll tick; nothing here is stored.

use serde::{Deserialize, Serialize};

/// One entry in the roster indicator.
///
/// `hot` and `warm` are independent flags. `hot` implies `warm` only when the
/// configured hot window is shorter than the warm window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: String,
    pub hot: bool,
    pub warm: bool,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Builds the roster: most recent first, capped at `max_count`.
///
/// Both windows use strict less-than, so a session exactly `hot_ms` old is not
/// hot. Timestamps ahead of `now` count as age zero. Ties keep input order.
pub fn build_session_views<S: AsRef<str>>(
    entries: &[(S, u64)],
    now: u64,
    hot_ms: u64,
    warm_ms: u64,
    max_count: usize,
) -> Vec<SessionView> {
    let mut ordered: Vec<&(S, u64)> = entries.iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    ordered
        .into_iter()
        .take(max_count)
        .map(|(id, last_seen)| {
            let id: &str = id.as_ref();
            let age = now.saturating_sub(*last_seen);
            SessionView {
                id: id.to_string(),
                hot: age < hot_ms,
                warm: age < warm_ms,
                cwd: None,
            }
        })
        .collect()
}
