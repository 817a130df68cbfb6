//! Hook event classification.
//!
//! Session start and end are recognized structurally; what each event
//! animates is skin data (see [`crate::skin`]).

use crate::skin::Skin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    SessionStart,
    SessionEnd,
    UserPromptSubmit,
    PermissionRequest,
    PostToolUseFailure,
    PreCompact,
    Stop,
    Unknown { event_name: String },
}

impl HookEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SessionStart" => HookEvent::SessionStart,
            "SessionEnd" => HookEvent::SessionEnd,
            "UserPromptSubmit" => HookEvent::UserPromptSubmit,
            "PermissionRequest" => HookEvent::PermissionRequest,
            "PostToolUseFailure" => HookEvent::PostToolUseFailure,
            "PreCompact" => HookEvent::PreCompact,
            "Stop" => HookEvent::Stop,
            other => HookEvent::Unknown {
                event_name: other.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::PermissionRequest => "PermissionRequest",
            HookEvent::PostToolUseFailure => "PostToolUseFailure",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::Stop => "Stop",
            HookEvent::Unknown { event_name } => event_name,
        }
    }

    /// Triggers the restart merge before the session is tracked.
    pub fn is_session_start(&self) -> bool {
        matches!(self, HookEvent::SessionStart)
    }

    /// Removes the session from the roster regardless of its timestamp.
    pub fn is_session_end(&self) -> bool {
        matches!(self, HookEvent::SessionEnd)
    }

    pub fn animation(&self, skin: &Skin) -> Option<&'static str> {
        skin.anim_for_event(self.name())
    }
}
