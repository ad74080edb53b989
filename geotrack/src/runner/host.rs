//! Runner for hosts that own the timer themselves.

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::collaborators::{BackgroundRunner, RunnerHandle, TickFn};

struct Scheduled {
    interval: Duration,
    tick: TickFn,
    cancellation: CancellationToken,
}

/// A runner whose ticks are delivered by the host.
///
/// Mobile background services and similar hosts keep their own timer and
/// call back into the app. `HostDrivenRunner` stores the scheduled callback
/// and the host calls [`fire`](Self::fire) whenever its timer elapses. The
/// requested interval is exposed so the host can configure its timer.
///
/// `fire` runs the tick on the caller's task, so it must be awaited inside
/// a tokio runtime with timers enabled (`enable_time` or `enable_all`).
#[derive(Default)]
pub struct HostDrivenRunner {
    scheduled: Mutex<Option<Scheduled>>,
    schedule_count: Mutex<usize>,
}

impl HostDrivenRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick. Returns false if nothing is scheduled or the
    /// schedule was cancelled.
    pub async fn fire(&self) -> bool {
        let tick = {
            let scheduled = self.scheduled.lock();
            match scheduled.as_ref() {
                Some(s) if !s.cancellation.is_cancelled() => s.tick.clone(),
                _ => return false,
            }
        };

        tick().await;
        true
    }

    /// Interval requested by the current schedule.
    pub fn interval(&self) -> Option<Duration> {
        self.scheduled
            .lock()
            .as_ref()
            .filter(|s| !s.cancellation.is_cancelled())
            .map(|s| s.interval)
    }

    /// Whether a live schedule exists.
    pub fn is_scheduled(&self) -> bool {
        self.interval().is_some()
    }

    /// Number of times `schedule` has been called.
    pub fn schedule_count(&self) -> usize {
        *self.schedule_count.lock()
    }
}

impl BackgroundRunner for HostDrivenRunner {
    fn schedule(&self, interval: Duration, tick: TickFn) -> RunnerHandle {
        let cancellation = CancellationToken::new();

        let previous = self.scheduled.lock().replace(Scheduled {
            interval,
            tick,
            cancellation: cancellation.clone(),
        });
        if let Some(previous) = previous {
            previous.cancellation.cancel();
        }
        *self.schedule_count.lock() += 1;

        RunnerHandle::new(cancellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick(counter: Arc<AtomicUsize>) -> TickFn {
        Arc::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test]
    async fn test_fire_without_schedule() {
        let runner = HostDrivenRunner::new();
        assert!(!runner.fire().await);
        assert!(!runner.is_scheduled());
    }

    #[tokio::test]
    async fn test_fire_invokes_tick() {
        let runner = HostDrivenRunner::new();
        let counter = Arc::new(AtomicUsize::new(0));
        runner.schedule(Duration::from_secs(5), counting_tick(Arc::clone(&counter)));

        assert!(runner.fire().await);
        assert!(runner.fire().await);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(runner.interval(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_cancelled_schedule_does_not_fire() {
        let runner = HostDrivenRunner::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = runner.schedule(Duration::from_secs(1), counting_tick(Arc::clone(&counter)));

        handle.cancel();
        assert!(!runner.fire().await);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!runner.is_scheduled());
    }

    #[tokio::test]
    async fn test_reschedule_cancels_previous() {
        let runner = HostDrivenRunner::new();
        let first = runner.schedule(
            Duration::from_secs(1),
            counting_tick(Arc::new(AtomicUsize::new(0))),
        );
        let _second = runner.schedule(
            Duration::from_secs(2),
            counting_tick(Arc::new(AtomicUsize::new(0))),
        );

        assert!(first.is_cancelled());
        assert_eq!(runner.interval(), Some(Duration::from_secs(2)));
        assert_eq!(runner.schedule_count(), 2);
    }
}
