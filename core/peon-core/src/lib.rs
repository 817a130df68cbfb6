//! # peon-core
//!
//! Session activity tracking and the sprite animation state machine behind
//! the peon-pet overlay.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. Callers drive two ticks (poll, render).
//! - **Not thread-safe**: One engine per overlay, owned by a single thread.
//! - **Graceful degradation**: Bad ids, unknown events, unknown animations and
//!   repeated records are no-ops. Only construction can fail.
//! - **Intents out**: The core never renders; it emits [`Intent`]s.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use peon_core::{PetConfig, PetEngine, SystemClock};
//!
//! let mut engine = PetEngine::new(&PetConfig::default(), SystemClock::new())?;
//! let mut intents = Vec::new();
//! engine.on_poll(record.as_ref(), now_ms, &mut intents);
//! engine.on_tick(1.0 / 60.0, &mut intents);
//! ```

pub mod anim;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod intent;
pub mod patterns;
pub mod session;
pub mod skin;

pub use anim::{AnimationMachine, Clock, FrameRef, ManualClock, SystemClock, TimerSlot};
pub use config::{load_config, AnimationConfig, PetConfig, PollConfig, SessionConfig};
pub use engine::PetEngine;
pub use error::{PetError, Result};
pub use events::HookEvent;
pub use intent::{Flash, Intent, IntentSink};
pub use peon_protocol::EventRecord;
pub use session::{
    build_session_views, is_valid_session_id, is_valid_session_str, SessionTracker, SessionView,
};
pub use skin::{skin_by_name, AnimationSpec, AtlasLayout, EffectCue, FrameUv, Skin, SKINS};
