//! Intent sinks for the headless driver.

use std::io::{self, Write};

use peon_core::{Clock, Intent, IntentSink};
use serde::Serialize;
use tracing::{debug, info};

/// Routes intents to structured logs in place of a renderer.
#[derive(Debug, Default)]
pub struct LogSink {
    emitted: u64,
}

impl LogSink {
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl IntentSink for LogSink {
    fn emit(&mut self, intent: Intent) {
        self.emitted += 1;
        match intent {
            Intent::PlayAnim { name } => info!(anim = %name, "Play animation"),
            Intent::UpdateDots { sessions } => {
                let hot = sessions.iter().filter(|view| view.hot).count();
                let warm = sessions.iter().filter(|view| view.warm).count();
                info!(sessions = sessions.len(), hot, warm, "Session roster changed");
            }
            Intent::Flash(flash) => debug!(
                r = flash.r,
                g = flash.g,
                b = flash.b,
                intensity = flash.intensity,
                decay = flash.decay,
                "Flash"
            ),
            Intent::Shake { intensity } => debug!(intensity, "Shake"),
            Intent::BurstParticles => debug!("Burst particles"),
        }
    }
}

#[derive(Serialize)]
struct TimedIntent<'a> {
    at_ms: u64,
    #[serde(flatten)]
    intent: &'a Intent,
}

/// Writes one JSON object per intent, stamped with the clock's time.
///
/// `IntentSink::emit` cannot fail, so the first write error is held and
/// later intents are dropped; `finish` reports it.
pub struct JsonLinesSink<W: Write, C: Clock> {
    out: W,
    clock: C,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write, C: Clock> JsonLinesSink<W, C> {
    pub fn new(out: W, clock: C) -> Self {
        Self {
            out,
            clock,
            written: 0,
            error: None,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_line(&mut self, intent: &Intent) -> io::Result<()> {
        let line = TimedIntent {
            at_ms: self.clock.now_ms(),
            intent,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write, C: Clock> IntentSink for JsonLinesSink<W, C> {
    fn emit(&mut self, intent: Intent) {
        if self.error.is_some() {
            return;
        }
        match self.write_line(&intent) {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}
