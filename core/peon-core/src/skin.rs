//! Built-in skins: atlas layout, animation table, event map, effect cues.
//!
//! A skin is static data. The machine reads it but never mutates it, and each
//! running overlay picks exactly one.
//!
//! Hook event → animation mapping, per skin:
//!
//! ```text
//! event                orc         laptop
//! SessionStart         waking      waking
//! UserPromptSubmit     typing      typing
//! Stop                 celebrate   typing
//! PermissionRequest    alarmed     alarmed
//! PostToolUseFailure   annoyed     alarmed
//! PreCompact           alarmed     alarmed
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{PetError, Result};
use crate::intent::{Flash, DEFAULT_SHAKE_INTENSITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasLayout {
    pub cols: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationSpec {
    pub name: &'static str,
    pub row: u32,
    pub frames: u32,
    pub fps: f32,
    pub looping: bool,
}

impl AnimationSpec {
    pub const fn new(name: &'static str, row: u32, frames: u32, fps: f32, looping: bool) -> Self {
        Self {
            name,
            row,
            frames,
            fps,
            looping,
        }
    }

    /// Seconds each frame stays on screen.
    pub fn frame_secs(&self) -> f32 {
        1.0 / self.fps
    }
}

/// Texture coordinates of one atlas cell. v = 0 is the bottom of the texture,
/// so row 0 sits at the top: TL = (u0, v1), BR = (u1, v0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameUv {
    pub u0: f32,
    pub u1: f32,
    pub v0: f32,
    pub v1: f32,
}

impl AtlasLayout {
    pub fn frame_uv(&self, row: u32, frame: u32) -> FrameUv {
        let cols = self.cols as f32;
        let rows = self.rows as f32;
        let row = row as f32;
        let frame = frame as f32;
        FrameUv {
            u0: frame / cols,
            u1: (frame + 1.0) / cols,
            v0: (rows - 1.0 - row) / rows,
            v1: (rows - row) / rows,
        }
    }
}

/// Visual side effects fired when an animation starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectCue {
    pub anim: &'static str,
    pub flash: Option<Flash>,
    pub shake: Option<f32>,
    pub particles: bool,
}

#[derive(Debug, Serialize)]
pub struct Skin {
    pub name: &'static str,
    pub atlas: AtlasLayout,
    pub animations: &'static [AnimationSpec],
    pub events: &'static [(&'static str, &'static str)],
    pub effects: &'static [EffectCue],
    /// Looping animation shown when nothing is happening.
    pub resting: &'static str,
    /// Shown after a reaction while some session is still hot.
    pub busy: &'static str,
}

const WAKING_FLASH: EffectCue = EffectCue {
    anim: "waking",
    flash: Some(Flash::new(0.4, 0.8, 1.0, 0.3, 2.0)),
    shake: None,
    particles: false,
};

const TYPING_FLASH: EffectCue = EffectCue {
    anim: "typing",
    flash: Some(Flash::new(1.0, 0.8, 0.0, 0.3, 2.0)),
    shake: None,
    particles: false,
};

const ALARMED_FLASH: EffectCue = EffectCue {
    anim: "alarmed",
    flash: Some(Flash::new(1.0, 0.1, 0.1, 0.5, 2.5)),
    shake: None,
    particles: false,
};

pub static ORC: Skin = Skin {
    name: "orc",
    atlas: AtlasLayout { cols: 6, rows: 6 },
    animations: &[
        AnimationSpec::new("sleeping", 0, 6, 3.0, true),
        AnimationSpec::new("waking", 1, 6, 8.0, false),
        AnimationSpec::new("typing", 2, 6, 8.0, false),
        AnimationSpec::new("alarmed", 3, 6, 8.0, false),
        AnimationSpec::new("celebrate", 4, 6, 8.0, false),
        AnimationSpec::new("annoyed", 5, 6, 8.0, false),
    ],
    events: &[
        ("SessionStart", "waking"),
        ("Stop", "celebrate"),
        ("UserPromptSubmit", "typing"),
        ("PermissionRequest", "alarmed"),
        ("PostToolUseFailure", "annoyed"),
        ("PreCompact", "alarmed"),
    ],
    effects: &[
        WAKING_FLASH,
        TYPING_FLASH,
        ALARMED_FLASH,
        EffectCue {
            anim: "celebrate",
            flash: Some(Flash::new(1.0, 0.85, 0.0, 0.4, 2.0)),
            shake: None,
            particles: true,
        },
        EffectCue {
            anim: "annoyed",
            flash: Some(Flash::new(1.0, 0.4, 0.1, 0.4, 2.5)),
            shake: Some(DEFAULT_SHAKE_INTENSITY),
            particles: false,
        },
    ],
    resting: "sleeping",
    busy: "typing",
};

pub static LAPTOP: Skin = Skin {
    name: "laptop",
    atlas: AtlasLayout { cols: 6, rows: 4 },
    animations: &[
        AnimationSpec::new("sleeping", 0, 6, 3.0, true),
        AnimationSpec::new("waking", 1, 6, 8.0, false),
        AnimationSpec::new("typing", 2, 6, 8.0, false),
        AnimationSpec::new("alarmed", 3, 6, 8.0, false),
    ],
    events: &[
        ("SessionStart", "waking"),
        ("Stop", "typing"),
        ("UserPromptSubmit", "typing"),
        ("PermissionRequest", "alarmed"),
        ("PostToolUseFailure", "alarmed"),
        ("PreCompact", "alarmed"),
    ],
    effects: &[WAKING_FLASH, TYPING_FLASH, ALARMED_FLASH],
    resting: "sleeping",
    busy: "typing",
};

pub static SKINS: &[&Skin] = &[&ORC, &LAPTOP];

pub const DEFAULT_SKIN: &str = "orc";

pub fn skin_by_name(name: &str) -> Result<&'static Skin> {
    SKINS
        .iter()
        .copied()
        .find(|skin| skin.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PetError::UnknownSkin(name.to_string()))
}

impl Skin {
    pub fn animation(&self, name: &str) -> Option<&'static AnimationSpec> {
        self.animations.iter().find(|spec| spec.name == name)
    }

    /// Animation for a hook event name; `None` for anything unmapped.
    pub fn anim_for_event(&self, event_name: &str) -> Option<&'static str> {
        self.events
            .iter()
            .find(|(event, _)| *event == event_name)
            .map(|(_, anim)| *anim)
    }

    pub fn effect_for(&self, anim: &str) -> Option<&'static EffectCue> {
        self.effects.iter().find(|cue| cue.anim == anim)
    }

    pub fn resting_spec(&self) -> Result<&'static AnimationSpec> {
        self.require(self.resting)
    }

    pub fn busy_spec(&self) -> Result<&'static AnimationSpec> {
        self.require(self.busy)
    }

    fn require(&self, name: &str) -> Result<&'static AnimationSpec> {
        self.animation(name)
            .ok_or_else(|| PetError::UnknownAnimation {
                skin: self.name.to_string(),
                name: name.to_string(),
            })
    }

    /// Checks every table against the atlas and against each other.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| PetError::InvalidSkin {
            skin: self.name.to_string(),
            reason,
        };

        if self.atlas.cols == 0 || self.atlas.rows == 0 {
            return Err(invalid("atlas has no cells".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in self.animations {
            if !seen.insert(spec.name) {
                return Err(invalid(format!("duplicate animation {}", spec.name)));
            }
            if spec.row >= self.atlas.rows {
                return Err(invalid(format!(
                    "{} row {} outside {} atlas rows",
                    spec.name, spec.row, self.atlas.rows
                )));
            }
            if spec.frames == 0 || spec.frames > self.atlas.cols {
                return Err(invalid(format!(
                    "{} has {} frames for {} atlas columns",
                    spec.name, spec.frames, self.atlas.cols
                )));
            }
            if !(spec.fps.is_finite() && spec.fps > 0.0) {
                return Err(invalid(format!("{} fps must be positive", spec.name)));
            }
        }

        for (event, anim) in self.events {
            if self.animation(anim).is_none() {
                return Err(invalid(format!("{} maps to missing {}", event, anim)));
            }
        }
        for cue in self.effects {
            if self.animation(cue.anim).is_none() {
                return Err(invalid(format!("effect for missing {}", cue.anim)));
            }
        }

        self.resting_spec()?;
        self.busy_spec()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn builtin_skins_validate() {
        for skin in SKINS {
            skin.validate()
                .unwrap_or_else(|err| panic!("{} invalid: {}", skin.name, err));
        }
    }

    #[test]
    fn sleeping_loops_and_reactions_do_not() {
        for skin in SKINS {
            assert!(skin.animation("sleeping").expect("sleeping").looping);
            for name in ["waking", "typing", "alarmed"] {
                assert!(!skin.animation(name).expect(name).looping);
            }
        }
    }

    #[test]
    fn orc_event_map() {
        assert_eq!(ORC.anim_for_event("SessionStart"), Some("waking"));
        assert_eq!(ORC.anim_for_event("Stop"), Some("celebrate"));
        assert_eq!(ORC.anim_for_event("UserPromptSubmit"), Some("typing"));
        assert_eq!(ORC.anim_for_event("PermissionRequest"), Some("alarmed"));
        assert_eq!(ORC.anim_for_event("PostToolUseFailure"), Some("annoyed"));
        assert_eq!(ORC.anim_for_event("PreCompact"), Some("alarmed"));
        assert_eq!(ORC.anim_for_event("UnknownEvent"), None);
        assert_eq!(ORC.anim_for_event("SessionEnd"), None);
    }

    #[test]
    fn laptop_event_map() {
        assert_eq!(LAPTOP.anim_for_event("Stop"), Some("typing"));
        assert_eq!(LAPTOP.anim_for_event("PostToolUseFailure"), Some("alarmed"));
        assert_eq!(LAPTOP.anim_for_event("PreCompact"), Some("alarmed"));
    }

    #[test]
    fn skin_lookup_is_case_insensitive() {
        assert_eq!(skin_by_name("ORC").expect("orc").name, "orc");
        assert!(matches!(
            skin_by_name("goblin"),
            Err(PetError::UnknownSkin(_))
        ));
    }

    #[test]
    fn first_frame_of_top_row() {
        let uv = ORC.atlas.frame_uv(0, 0);
        assert!(close(uv.u0, 0.0));
        assert!(close(uv.u1, 1.0 / 6.0));
        assert!(close(uv.v0, 5.0 / 6.0));
        assert!(close(uv.v1, 1.0));
    }

    #[test]
    fn last_frame_reaches_right_edge() {
        let uv = ORC.atlas.frame_uv(0, 5);
        assert!(close(uv.u0, 5.0 / 6.0));
        assert!(close(uv.u1, 1.0));
    }

    #[test]
    fn second_row_sits_one_row_lower() {
        let uv = LAPTOP.atlas.frame_uv(1, 0);
        assert!(close(uv.v0, 2.0 / 4.0));
        assert!(close(uv.v1, 3.0 / 4.0));
    }

    #[test]
    fn uvs_stay_in_unit_square() {
        for skin in SKINS {
            for spec in skin.animations {
                for frame in 0..spec.frames {
                    let uv = skin.atlas.frame_uv(spec.row, frame);
                    assert!(uv.u0 < uv.u1 && uv.v0 < uv.v1);
                    assert!(uv.u0 >= 0.0 && uv.u1 <= 1.0 + 1e-6);
                    assert!(uv.v0 >= -1e-6 && uv.v1 <= 1.0 + 1e-6);
                }
            }
        }
    }

    #[test]
    fn effect_cues() {
        let celebrate = ORC.effect_for("celebrate").expect("celebrate cue");
        assert!(celebrate.particles);
        let annoyed = ORC.effect_for("annoyed").expect("annoyed cue");
        assert_eq!(annoyed.shake, Some(DEFAULT_SHAKE_INTENSITY));
        assert!(ORC.effect_for("sleeping").is_none());
    }

    #[test]
    fn validate_rejects_row_outside_atlas() {
        static BROKEN: Skin = Skin {
            name: "broken",
            atlas: AtlasLayout { cols: 2, rows: 1 },
            animations: &[
                AnimationSpec::new("sleeping", 0, 2, 3.0, true),
                AnimationSpec::new("typing", 1, 2, 8.0, false),
            ],
            events: &[],
            effects: &[],
            resting: "sleeping",
            busy: "typing",
        };
        assert!(matches!(
            BROKEN.validate(),
            Err(PetError::InvalidSkin { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_busy() {
        static NO_BUSY: Skin = Skin {
            name: "no-busy",
            atlas: AtlasLayout { cols: 2, rows: 1 },
            animations: &[AnimationSpec::new("sleeping", 0, 2, 3.0, true)],
            events: &[],
            effects: &[],
            resting: "sleeping",
            busy: "typing",
        };
        assert!(matches!(
            NO_BUSY.validate(),
            Err(PetError::UnknownAnimation { .. })
        ));
    }
}
