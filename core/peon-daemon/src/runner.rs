//! Live poll + render loop.
//!
//! Both ticks run on this thread; the loop sleeps until whichever deadline
//! comes first. The animation machine times itself off a monotonic
//! `SystemClock` while session recency uses wall-clock milliseconds, the
//! same scale hook records are stamped with.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use peon_core::{PetConfig, PetEngine, SystemClock};
use tracing::info;

use crate::poller::StatePoller;
use crate::sink::LogSink;

pub fn run(config: &PetConfig, state_file: PathBuf) -> Result<(), String> {
    let mut engine = PetEngine::new(config, SystemClock::new()).map_err(String::from)?;
    let mut poller = StatePoller::new(state_file);
    let mut sink = LogSink::default();

    info!(
        state_file = %poller.path().display(),
        skin = engine.machine().skin().name,
        poll_ms = config.poll.interval_ms,
        frame_ms = config.poll.frame_interval_ms,
        "Pet started"
    );

    let poll_every = Duration::from_millis(config.poll.interval_ms);
    let frame_every = Duration::from_millis(config.poll.frame_interval_ms);
    let mut next_poll = Instant::now();
    let mut last_frame = Instant::now();
    let mut next_frame = last_frame + frame_every;

    loop {
        let now = Instant::now();

        if now >= next_poll {
            let record = poller.poll();
            engine.on_poll(record.as_ref(), wall_clock_ms(), &mut sink);
            next_poll = now + poll_every;
        }

        if now >= next_frame {
            let delta = now.duration_since(last_frame).as_secs_f32();
            engine.on_tick(delta, &mut sink);
            last_frame = now;
            next_frame = now + frame_every;
        }

        let wake = next_poll.min(next_frame);
        thread::sleep(wake.saturating_duration_since(Instant::now()));
    }
}

fn wall_clock_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
