//! Output side of the core: what the renderer is asked to do.
//!
//! Intents are fire-and-forget. The renderer realizes them visually and never
//! writes back except through `PetEngine` entry points.

use serde::{Deserialize, Serialize};

use crate::session::SessionView;

/// Full-sprite color flash. `intensity` fades by `decay` per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub intensity: f32,
    pub decay: f32,
}

impl Flash {
    pub const DEFAULT_INTENSITY: f32 = 0.6;
    pub const DEFAULT_DECAY: f32 = 3.0;

    pub const fn new(r: f32, g: f32, b: f32, intensity: f32, decay: f32) -> Self {
        Self {
            r,
            g,
            b,
            intensity,
            decay,
        }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, Self::DEFAULT_INTENSITY, Self::DEFAULT_DECAY)
    }
}

pub const DEFAULT_SHAKE_INTENSITY: f32 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    PlayAnim { name: String },
    UpdateDots { sessions: Vec<SessionView> },
    Flash(Flash),
    Shake { intensity: f32 },
    BurstParticles,
}

/// Receiver for intents. The renderer host implements this; tests collect
/// into a `Vec`.
pub trait IntentSink {
    fn emit(&mut self, intent: Intent);
}

impl IntentSink for Vec<Intent> {
    fn emit(&mut self, intent: Intent) {
        self.push(intent);
    }
}

impl<S: IntentSink + ?Sized> IntentSink for &mut S {
    fn emit(&mut self, intent: Intent) {
        (**self).emit(intent);
    }
}
