//! Sprite animation state machine.
//!
//! Two independent callers drive the machine:
//!
//! ```text
//! render tick  → on_tick(delta)          frame advance, due timers
//! poll tick    → on_session_roster(...)  wake on activity
//!              → play(name)              reaction for a hook event
//! ```
//!
//! Deferred transitions (settle after a reaction, idle timeout) are
//! [`TimerSlot`]s checked against an injected [`Clock`], so tests run on a
//! [`ManualClock`] instead of wall time.

mod clock;
mod machine;

pub use clock::{Clock, ManualClock, SystemClock, TimerSlot};
pub use machine::{AnimationMachine, FrameRef, MAX_TICK_SECS};
