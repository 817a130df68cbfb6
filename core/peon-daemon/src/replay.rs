//! Offline replay of a JSONL event log.
//!
//! Record timestamps drive a `ManualClock`. Between records the driver
//! steps frame ticks and empty polls on the virtual clock, so timers,
//! reaction loops and recency tiers behave as they would live. Every intent
//! is written as a JSON line stamped with its virtual time.

use std::io::{BufRead, Write};
use std::rc::Rc;

use peon_core::{EventRecord, ManualClock, PetConfig, PetEngine};
use peon_protocol::parse_record_line;
use tracing::{info, warn};

use crate::sink::JsonLinesSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub records: usize,
    pub skipped: usize,
    pub intents: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub fps: u32,
    /// Virtual time simulated after the last record.
    pub tail_ms: u64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            tail_ms: 2_000,
        }
    }
}

pub fn replay(
    input: impl BufRead,
    out: impl Write,
    config: &PetConfig,
    options: ReplayOptions,
) -> Result<ReplaySummary, String> {
    let mut summary = ReplaySummary::default();
    let mut records = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|err| format!("Failed to read event log: {}", err))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_record_line(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(line = index + 1, code = %err.code, message = %err.message, "Skipping event line");
                summary.skipped += 1;
            }
        }
    }

    let Some(start) = records.first().and_then(|record| record.timestamp) else {
        info!(skipped = summary.skipped, "Event log had no usable records");
        return Ok(summary);
    };

    let clock = Rc::new(ManualClock::new(start));
    let mut engine = PetEngine::new(config, Rc::clone(&clock)).map_err(String::from)?;
    let mut sink = JsonLinesSink::new(out, Rc::clone(&clock));
    let mut driver = VirtualTicks::new(start, config.poll.interval_ms, frame_ms(options.fps));

    for record in &records {
        let at = record.timestamp.unwrap_or(start).max(driver.now);
        driver.advance_to(at, &clock, &mut engine, &mut sink);
        driver.deliver(record, &clock, &mut engine, &mut sink);
        summary.records += 1;
    }

    let end = driver.now.saturating_add(options.tail_ms);
    driver.advance_to(end, &clock, &mut engine, &mut sink);

    summary.intents = sink.written();
    sink.finish()
        .map_err(|err| format!("Failed to write intents: {}", err))?;

    info!(
        records = summary.records,
        skipped = summary.skipped,
        intents = summary.intents,
        "Replay finished"
    );
    Ok(summary)
}

fn frame_ms(fps: u32) -> u64 {
    (1_000 / u64::from(fps.max(1))).max(1)
}

/// Poll and frame schedule on the virtual clock.
struct VirtualTicks {
    now: u64,
    poll_ms: u64,
    frame_ms: u64,
    next_poll: u64,
    next_frame: u64,
}

impl VirtualTicks {
    fn new(start: u64, poll_ms: u64, frame_ms: u64) -> Self {
        Self {
            now: start,
            poll_ms: poll_ms.max(1),
            frame_ms,
            next_poll: start,
            next_frame: start.saturating_add(frame_ms),
        }
    }

    /// Runs every poll and frame scheduled strictly before `target`, then
    /// parks the clock at `target`.
    fn advance_to<W: Write>(
        &mut self,
        target: u64,
        clock: &Rc<ManualClock>,
        engine: &mut PetEngine<Rc<ManualClock>>,
        sink: &mut JsonLinesSink<W, Rc<ManualClock>>,
    ) {
        loop {
            let next = self.next_poll.min(self.next_frame);
            if next >= target {
                break;
            }
            clock.set(next);
            self.now = next;

            if next == self.next_poll {
                engine.on_poll(None, next, sink);
                self.next_poll += self.poll_ms;
            }
            if next == self.next_frame {
                engine.on_tick(self.frame_ms as f32 / 1_000.0, sink);
                self.next_frame += self.frame_ms;
            }
        }

        clock.set(target);
        self.now = target;
    }

    /// Delivers a record as the poll at the current instant.
    fn deliver<W: Write>(
        &mut self,
        record: &EventRecord,
        clock: &Rc<ManualClock>,
        engine: &mut PetEngine<Rc<ManualClock>>,
        sink: &mut JsonLinesSink<W, Rc<ManualClock>>,
    ) {
        clock.set(self.now);
        engine.on_poll(Some(record), self.now, sink);
        self.next_poll = self.now + self.poll_ms;
    }
}
