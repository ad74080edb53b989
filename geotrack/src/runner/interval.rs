//! Tokio-backed periodic runner.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::collaborators::{BackgroundRunner, RunnerHandle, TickFn};

/// Runs the tick callback on a tokio interval.
///
/// Each schedule spawns one task. The first tick fires one interval after
/// scheduling. Ticks are awaited in sequence, so a slow tick delays the next
/// one instead of overlapping it, and ticks missed while waiting are skipped
/// rather than bursted.
///
/// Must be scheduled from within a tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct IntervalRunner;

impl IntervalRunner {
    pub fn new() -> Self {
        Self
    }
}

impl BackgroundRunner for IntervalRunner {
    fn schedule(&self, interval: Duration, tick: TickFn) -> RunnerHandle {
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(interval_ms = interval.as_millis() as u64, "Interval runner started");

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = ticker.tick() => {
                        trace!("Tick");
                        // Not raced against cancellation: an in-flight tick
                        // is allowed to finish.
                        tick().await;
                    }
                }
            }

            debug!("Interval runner stopped");
        });

        RunnerHandle::new(cancellation)
    }
}
