//! Poll-tick orchestration.
//!
//! `PetEngine` owns the tracker, the cwd side table, and the animation
//! machine for one overlay. Each poll tick runs the same pipeline:
//!
//! ```text
//! record ─▶ duplicate guard ─▶ id gate ─▶ tracker (end / restart merge / update)
//!                                            │
//!          play(reaction) ◀─ classify ◀─ roster ◀─ prune + build views
//! ```
//!
//! Tracker mutation always happens before the views for that tick are built,
//! and the roster reaches the machine before the event's reaction does.

use std::collections::HashMap;

use peon_protocol::EventRecord;
use tracing::debug;

use crate::anim::{AnimationMachine, Clock};
use crate::config::{PetConfig, SessionConfig};
use crate::error::Result;
use crate::events::HookEvent;
use crate::intent::{Intent, IntentSink};
use crate::session::{build_session_views, is_valid_session_id, SessionTracker, SessionView};
use crate::skin::skin_by_name;

pub struct PetEngine<C: Clock> {
    sessions: SessionConfig,
    tracker: SessionTracker,
    cwds: HashMap<String, String>,
    last_timestamp: Option<u64>,
    last_views: Option<Vec<SessionView>>,
    machine: AnimationMachine<C>,
}

impl<C: Clock> PetEngine<C> {
    pub fn new(config: &PetConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let skin = skin_by_name(&config.animation.skin)?;
        let machine = AnimationMachine::new(skin, &config.animation, clock)?;

        Ok(Self {
            sessions: config.sessions.clone(),
            tracker: SessionTracker::new(),
            cwds: HashMap::new(),
            last_timestamp: None,
            last_views: None,
            machine,
        })
    }

    /// Runs one poll tick with zero or one new record.
    pub fn on_poll(&mut self, record: Option<&EventRecord>, now_ms: u64, sink: &mut impl IntentSink) {
        let event = record.and_then(|record| self.accept(record, now_ms));

        self.prune(now_ms);
        let views = self.sessions(now_ms);
        if self.last_views.as_ref() != Some(&views) {
            sink.emit(Intent::UpdateDots {
                sessions: views.clone(),
            });
        }
        self.machine.on_session_roster(&views, sink);
        self.last_views = Some(views);

        if let Some(anim) = event.and_then(|event| event.animation(self.machine.skin())) {
            self.machine.play(anim, sink);
        }

        self.machine.poll_timers(sink);
    }

    /// Advances the sprite by one render tick.
    pub fn on_tick(&mut self, delta_secs: f32, sink: &mut impl IntentSink) {
        self.machine.on_tick(delta_secs, sink);
    }

    /// Current roster, most recent first, with cwd attached where known.
    pub fn sessions(&self, now_ms: u64) -> Vec<SessionView> {
        let mut views = build_session_views(
            &self.tracker.entries(),
            now_ms,
            self.sessions.hot_window_ms,
            self.sessions.warm_window_ms,
            self.sessions.max_sessions,
        );
        for view in &mut views {
            view.cwd = self.cwds.get(&view.id).cloned();
        }
        views
    }

    /// Applies a record to the tracker. Returns the event to animate, or
    /// `None` when the record repeats the last processed timestamp.
    fn accept(&mut self, record: &EventRecord, now_ms: u64) -> Option<HookEvent> {
        let timestamp = match record.timestamp {
            Some(timestamp) if self.last_timestamp != Some(timestamp) => timestamp,
            _ => return None,
        };
        self.last_timestamp = Some(timestamp);

        let event = HookEvent::from_name(&record.event);
        let session_id = match record.session_id.as_deref() {
            Some(id) if is_valid_session_id(Some(id)) => id,
            other => {
                debug!(
                    event = %record.event,
                    session = ?other,
                    "Skipping roster update (invalid session_id)"
                );
                return Some(event);
            }
        };

        if event.is_session_end() {
            self.forget(session_id);
            debug!(session = %session_id, "Session ended");
            return Some(event);
        }

        if event.is_session_start() {
            self.merge_restarted_session(session_id, now_ms);
        }

        self.tracker.update(session_id, now_ms);
        if let Some(cwd) = record.cwd.as_deref().filter(|cwd| !cwd.is_empty()) {
            self.cwds.insert(session_id.to_string(), cwd.to_string());
        }
        Some(event)
    }

    /// Resuming a session hands it a new id. When exactly one other session
    /// is tracked and it spoke within the merge window, treat it as the
    /// pre-restart identity and drop it. With zero or several sessions the
    /// intent is ambiguous and nothing is merged.
    fn merge_restarted_session(&mut self, new_id: &str, now_ms: u64) {
        if self.tracker.contains(new_id) || self.tracker.len() != 1 {
            return;
        }

        let (old_id, last_seen) = match self.tracker.entries().into_iter().next() {
            Some(entry) => entry,
            None => return,
        };
        if now_ms.saturating_sub(last_seen) <= self.sessions.restart_merge_window_ms {
            debug!(old = %old_id, new = %new_id, "Merging restarted session");
            self.forget(&old_id);
        }
    }

    fn forget(&mut self, session_id: &str) {
        self.tracker.remove(session_id);
        self.cwds.remove(session_id);
    }

    fn prune(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.sessions.prune_after_ms);
        for session_id in self.tracker.prune(cutoff) {
            debug!(session = %session_id, "Pruned silent session");
            self.cwds.remove(&session_id);
        }
    }

    pub fn machine(&self) -> &AnimationMachine<C> {
        &self.machine
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn cwd_for(&self, session_id: &str) -> Option<&str> {
        self.cwds.get(session_id).map(String::as_str)
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::ManualClock;
    use std::rc::Rc;

    const A: &str = "a1b2c3d4-e5f6-7890-abcd-00000000000a";
    const B: &str = "a1b2c3d4-e5f6-7890-abcd-00000000000b";
    const C: &str = "a1b2c3d4-e5f6-7890-abcd-00000000000c";
    const NOW: u64 = 1_000_000;

    fn engine() -> PetEngine<Rc<ManualClock>> {
        PetEngine::new(&PetConfig::default(), Rc::new(ManualClock::new(0))).expect("engine")
    }

    fn poll(engine: &mut PetEngine<Rc<ManualClock>>, record: EventRecord, now: u64) -> Vec<Intent> {
        let mut sink = Vec::new();
        engine.on_poll(Some(&record), now, &mut sink);
        sink
    }

    #[test]
    fn restart_merges_single_recent_session() {
        let mut engine = engine();
        poll(&mut engine, EventRecord::new(1, "UserPromptSubmit", Some(A)), NOW - 2_000);
        poll(&mut engine, EventRecord::new(2, "SessionStart", Some(B)), NOW);

        assert_eq!(engine.tracker().len(), 1);
        assert!(engine.tracker().contains(B));
        assert!(!engine.tracker().contains(A));
    }

    #[test]
    fn restart_keeps_session_outside_merge_window() {
        let mut engine = engine();
        poll(&mut engine, EventRecord::new(1, "Stop", Some(A)), NOW - 5_001);
        poll(&mut engine, EventRecord::new(2, "SessionStart", Some(B)), NOW);
        assert_eq!(engine.tracker().len(), 2);
    }

    #[test]
    fn restart_does_not_merge_with_two_sessions() {
        let mut engine = engine();
        poll(&mut engine, EventRecord::new(1, "Stop", Some(A)), NOW - 1_000);
        poll(&mut engine, EventRecord::new(2, "Stop", Some(B)), NOW - 500);
        poll(&mut engine, EventRecord::new(3, "SessionStart", Some(C)), NOW);
        assert_eq!(engine.tracker().len(), 3);
    }

    #[test]
    fn session_start_for_tracked_id_does_not_merge() {
        let mut engine = engine();
        poll(&mut engine, EventRecord::new(1, "Stop", Some(A)), NOW - 100);
        poll(&mut engine, EventRecord::new(2, "SessionStart", Some(A)), NOW);
        assert_eq!(engine.tracker().len(), 1);
        assert_eq!(engine.tracker().last_seen(A), Some(NOW));
    }

    #[test]
    fn merge_drops_old_cwd() {
        let mut engine = engine();
        poll(
            &mut engine,
            EventRecord::new(1, "Stop", Some(A)).with_cwd("/repo"),
            NOW - 100,
        );
        poll(&mut engine, EventRecord::new(2, "SessionStart", Some(B)), NOW);
        assert_eq!(engine.cwd_for(A), None);
    }

    #[test]
    fn duplicate_timestamp_is_ignored() {
        let mut engine = engine();
        let record = EventRecord::new(7, "PermissionRequest", Some(A));
        let first = poll(&mut engine, record.clone(), NOW);
        assert!(first.contains(&Intent::PlayAnim {
            name: "alarmed".to_string()
        }));

        let second = poll(&mut engine, record, NOW + 200);
        assert!(!second
            .iter()
            .any(|intent| matches!(intent, Intent::PlayAnim { name } if name == "alarmed")));
        assert_eq!(engine.tracker().last_seen(A), Some(NOW));
    }

    #[test]
    fn missing_timestamp_is_ignored() {
        let mut engine = engine();
        let mut record = EventRecord::new(1, "Stop", Some(A));
        record.timestamp = None;
        poll(&mut engine, record, NOW);
        assert!(engine.tracker().is_empty());
        assert_eq!(engine.last_timestamp(), None);
    }

    #[test]
    fn invalid_session_id_still_animates() {
        let mut engine = engine();
        let sink = poll(&mut engine, EventRecord::new(1, "Stop", Some("test-123")), NOW);
        assert!(engine.tracker().is_empty());
        assert!(sink.contains(&Intent::PlayAnim {
            name: "celebrate".to_string()
        }));
    }

    #[test]
    fn unknown_event_still_tracks_session() {
        let mut engine = engine();
        let sink = poll(&mut engine, EventRecord::new(1, "SubagentStop", Some(A)), NOW);
        assert!(engine.tracker().contains(A));
        // Roster turned hot while resting, so the busy animation is the only play.
        assert_eq!(
            sink.iter()
                .filter(|intent| matches!(intent, Intent::PlayAnim { .. }))
                .count(),
            1
        );
        assert_eq!(engine.machine().current_anim(), "typing");
    }

    #[test]
    fn session_end_removes_session_and_cwd() {
        let mut engine = engine();
        poll(
            &mut engine,
            EventRecord::new(1, "UserPromptSubmit", Some(A)).with_cwd("/repo"),
            NOW,
        );
        assert_eq!(engine.cwd_for(A), Some("/repo"));

        poll(&mut engine, EventRecord::new(2, "SessionEnd", Some(A)), NOW + 10);
        assert!(engine.tracker().is_empty());
        assert_eq!(engine.cwd_for(A), None);
    }

    #[test]
    fn silent_sessions_are_pruned_with_cwd() {
        let mut engine = engine();
        poll(
            &mut engine,
            EventRecord::new(1, "Stop", Some(A)).with_cwd("/repo"),
            NOW,
        );

        let mut sink = Vec::new();
        engine.on_poll(None, NOW + PetConfig::default().sessions.prune_after_ms, &mut sink);
        assert!(engine.tracker().contains(A));

        engine.on_poll(None, NOW + PetConfig::default().sessions.prune_after_ms + 1, &mut sink);
        assert!(engine.tracker().is_empty());
        assert_eq!(engine.cwd_for(A), None);
    }

    #[test]
    fn roster_carries_cwd_and_is_emitted_on_change_only() {
        let mut engine = engine();
        let sink = poll(
            &mut engine,
            EventRecord::new(1, "Stop", Some(A)).with_cwd("/repo"),
            NOW,
        );
        let dots: Vec<&Vec<SessionView>> = sink
            .iter()
            .filter_map(|intent| match intent {
                Intent::UpdateDots { sessions } => Some(sessions),
                _ => None,
            })
            .collect();
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0][0].cwd.as_deref(), Some("/repo"));
        assert!(dots[0][0].hot);

        let mut sink = Vec::new();
        engine.on_poll(None, NOW + 200, &mut sink);
        assert!(!sink
            .iter()
            .any(|intent| matches!(intent, Intent::UpdateDots { .. })));

        engine.on_poll(None, NOW + 30_000, &mut sink);
        assert!(sink
            .iter()
            .any(|intent| matches!(intent, Intent::UpdateDots { sessions } if !sessions[0].hot)));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = PetConfig::default();
        config.animation.skin = "goblin".to_string();
        assert!(PetEngine::new(&config, ManualClock::new(0)).is_err());
    }
}
