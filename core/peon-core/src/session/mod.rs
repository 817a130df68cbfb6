//! Session activity tracking.
//!
//! Hooks report one event at a time; this module keeps the in-memory picture
//! of which sessions are alive and how recently each one spoke.
//!
//! ```text
//! EventRecord → id::is_valid_session_id → SessionTracker → view::build_session_views
//!   (poller)          (gate)                 (id → last seen)       (hot/warm roster)
//! ```
//!
//! - [`id`]: UUID gate; nothing enters the tracker without passing it
//! - [`tracker`]: id → last-seen map with prune-by-cutoff
//! - [`view`]: recency-ordered, capped roster tagged hot/warm

mod id;
mod tracker;
mod view;

pub use id::{is_valid_session_id, is_valid_session_str};
pub use tracker::SessionTracker;
pub use view::{build_session_views, SessionView};
