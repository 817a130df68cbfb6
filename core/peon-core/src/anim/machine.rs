//! Frame timing, reaction replays, and deferred transitions.
//!
//! ## States
//!
//! ```text
//! resting ──roster turns hot──▶ busy
//!    ▲                           │
//!    │ settle (no hot session)   ▼
//!    └──────── reaction ◀── play(name)
//!              │  replays `reaction_loops` times, holds last frame,
//!              └─ settle after `settle_delay_ms` → resting | busy
//! ```
//!
//! Any non-resting animation arms the idle timer; if it fires while no session
//! is hot, the sprite goes back to resting.

use tracing::debug;

use super::clock::{Clock, TimerSlot};
use crate::config::AnimationConfig;
use crate::error::Result;
use crate::intent::{Intent, IntentSink};
use crate::session::SessionView;
use crate::skin::{AnimationSpec, FrameUv, Skin};

/// Longest render-tick delta honored. A stalled frame (window hidden, laptop
/// lid closed) must not fast-forward through a whole reaction.
pub const MAX_TICK_SECS: f32 = 0.1;

/// What the renderer should draw right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRef {
    pub anim: &'static str,
    pub row: u32,
    pub frame: u32,
    pub uv: FrameUv,
}

pub struct AnimationMachine<C: Clock> {
    skin: &'static Skin,
    clock: C,
    idle_timeout_ms: u64,
    settle_delay_ms: u64,
    reaction_loops: u32,

    current: &'static AnimationSpec,
    frame: u32,
    frame_timer: f32,
    remaining_loops: u32,
    pending_settle: bool,
    settle_timer: TimerSlot,
    idle_timer: TimerSlot,
    any_session_active: bool,
}

impl<C: Clock> AnimationMachine<C> {
    /// Starts at the skin's resting animation with no timers armed.
    pub fn new(skin: &'static Skin, config: &AnimationConfig, clock: C) -> Result<Self> {
        skin.validate()?;
        let resting = skin.resting_spec()?;

        Ok(Self {
            skin,
            clock,
            idle_timeout_ms: config.idle_timeout_ms,
            settle_delay_ms: config.settle_delay_ms,
            reaction_loops: config.reaction_loops,
            current: resting,
            frame: 0,
            frame_timer: 0.0,
            remaining_loops: 0,
            pending_settle: false,
            settle_timer: TimerSlot::default(),
            idle_timer: TimerSlot::default(),
            any_session_active: false,
        })
    }

    /// Switches to `name`. Unknown names are ignored and return false.
    pub fn play(&mut self, name: &str, sink: &mut impl IntentSink) -> bool {
        let spec = match self.skin.animation(name) {
            Some(spec) => spec,
            None => {
                debug!(anim = %name, skin = self.skin.name, "Ignoring unknown animation");
                return false;
            }
        };

        let resting = spec.name == self.skin.resting;
        debug!(from = self.current.name, to = spec.name, "Playing animation");

        self.current = spec;
        self.frame = 0;
        self.frame_timer = 0.0;
        self.pending_settle = false;
        self.settle_timer.cancel();
        self.remaining_loops = if resting {
            0
        } else {
            self.reaction_loops.saturating_sub(1)
        };

        sink.emit(Intent::PlayAnim {
            name: spec.name.to_string(),
        });
        self.fire_effects(spec.name, sink);

        if resting {
            self.idle_timer.cancel();
        } else {
            self.idle_timer
                .arm(self.clock.now_ms(), self.idle_timeout_ms);
        }
        true
    }

    /// Advances by one render tick. Due timers run before frames advance.
    pub fn on_tick(&mut self, delta_secs: f32, sink: &mut impl IntentSink) {
        self.poll_timers(sink);

        let delta = if delta_secs.is_finite() {
            delta_secs.clamp(0.0, MAX_TICK_SECS)
        } else {
            0.0
        };
        self.frame_timer += delta;

        let quantum = self.current.frame_secs();
        while self.frame_timer >= quantum {
            self.frame_timer -= quantum;
            if self.advance_frame() {
                self.frame_timer = 0.0;
                break;
            }
        }
    }

    /// Fires the settle and idle timers if their deadlines have passed.
    pub fn poll_timers(&mut self, sink: &mut impl IntentSink) {
        let now = self.clock.now_ms();

        if self.settle_timer.take_due(now) {
            self.pending_settle = false;
            let target = if self.any_session_active {
                self.skin.busy
            } else {
                self.skin.resting
            };
            debug!(from = self.current.name, to = target, "Reaction settled");
            self.play(target, sink);
        }

        if self.idle_timer.take_due(now) {
            if self.any_session_active {
                debug!(anim = self.current.name, "Idle timeout while a session is hot");
            } else if !self.is_resting() {
                debug!(from = self.current.name, "Idle timeout; resting");
                let resting = self.skin.resting;
                self.play(resting, sink);
            }
        }
    }

    /// Records roster activity. Wakes to the busy animation only when the
    /// roster turns hot while resting; running reactions are never cut off.
    pub fn on_session_roster(&mut self, sessions: &[SessionView], sink: &mut impl IntentSink) {
        let active = sessions.iter().any(|view| view.hot);
        let was_active = self.any_session_active;
        self.any_session_active = active;

        if active && !was_active && self.is_resting() {
            debug!(sessions = sessions.len(), "Session activity detected; waking");
            let busy = self.skin.busy;
            self.play(busy, sink);
        }
    }

    /// Returns true when the animation is now holding its last frame.
    fn advance_frame(&mut self) -> bool {
        let spec = self.current;
        self.frame += 1;
        if self.frame < spec.frames {
            return false;
        }

        if spec.looping {
            self.frame = 0;
            return false;
        }

        if self.remaining_loops > 0 {
            self.remaining_loops -= 1;
            self.frame = 0;
            return false;
        }

        self.frame = spec.frames - 1;
        if !self.pending_settle {
            self.pending_settle = true;
            self.settle_timer
                .arm(self.clock.now_ms(), self.settle_delay_ms);
        }
        true
    }

    fn fire_effects(&self, anim: &str, sink: &mut impl IntentSink) {
        let cue = match self.skin.effect_for(anim) {
            Some(cue) => cue,
            None => return,
        };
        if let Some(flash) = cue.flash {
            sink.emit(Intent::Flash(flash));
        }
        if let Some(intensity) = cue.shake {
            sink.emit(Intent::Shake { intensity });
        }
        if cue.particles {
            sink.emit(Intent::BurstParticles);
        }
    }

    pub fn skin(&self) -> &'static Skin {
        self.skin
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn current_anim(&self) -> &'static str {
        self.current.name
    }

    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_ref(&self) -> FrameRef {
        FrameRef {
            anim: self.current.name,
            row: self.current.row,
            frame: self.frame,
            uv: self.skin.atlas.frame_uv(self.current.row, self.frame),
        }
    }

    pub fn is_resting(&self) -> bool {
        self.current.name == self.skin.resting
    }

    pub fn remaining_reaction_loops(&self) -> u32 {
        self.remaining_loops
    }

    pub fn is_settle_pending(&self) -> bool {
        self.pending_settle
    }

    pub fn settle_deadline(&self) -> Option<u64> {
        self.settle_timer.deadline()
    }

    pub fn idle_deadline(&self) -> Option<u64> {
        self.idle_timer.deadline()
    }

    pub fn any_session_active(&self) -> bool {
        self.any_session_active
    }
}
