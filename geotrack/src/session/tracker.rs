//! The tracking session: lifecycle, tick loop and synced-fix bookkeeping.
//!
//! # Tick flow
//!
//! ```text
//! runner tick ──► in-flight guard ──► PositionSource::current_fix (timeout)
//!                  │ busy                  │ error / stale
//!                  ▼                       ▼
//!             TickSkipped(Overlap)    TickSkipped(...), logged
//!                                          │ fix
//!                                          ▼
//!                                  evaluate(synced_fix, fix)
//!                                          │
//!                 ┌────────────────────────┼─────────────────────────┐
//!                 ▼                        ▼                         ▼
//!           display fix             should_sync:               is_infraction:
//!           + Sampled event         baseline = fix,            append message
//!                                   spawn RecordStore::save    + Infraction event
//! ```
//!
//! Session state sits behind a short synchronous lock that is never held
//! across an await. Ticks are serialized by the in-flight guard; a tick that
//! arrives while another is running is skipped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::collaborators::{
    BackgroundRunner, PermissionProvider, PositionSource, RecordStore, RunnerHandle, TickFn,
};
use crate::error::{PositionError, TrackingError};
use crate::geo::Coordinate;
use crate::sample::{evaluate, Decision, Fix, LocationRecord, SyncedFix};

use super::config::SessionConfig;
use super::events::{FailureReason, SessionEvent, SessionStatus, SkipReason};
use super::metrics::{SessionMetrics, SessionSnapshot};

/// The external services a session depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub permission: Arc<dyn PermissionProvider>,
    pub source: Arc<dyn PositionSource>,
    pub store: Arc<dyn RecordStore>,
    pub runner: Arc<dyn BackgroundRunner>,
}

/// Format the message recorded for an over-limit sample.
pub fn infraction_message(speed_kmh: f64) -> String {
    format!("⚠️ SPEED ABOVE LIMIT: {:.2} km/h", speed_kmh)
}

/// A location tracking session.
///
/// Owns the synced baseline and the infraction log. Each session is
/// independent; nothing is shared between sessions.
///
/// # Example
///
/// ```ignore
/// let session = TrackingSession::new(SessionConfig::default(), collaborators);
///
/// let mut events = session.subscribe();
/// session.start(5_000).await?;
///
/// while let Ok(event) = events.recv().await {
///     if let SessionEvent::Infraction { message, .. } = event {
///         println!("{}", message);
///     }
/// }
///
/// session.stop();
/// ```
pub struct TrackingSession {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    collaborators: Collaborators,
    state: Mutex<SessionState>,
    /// Serializes `start` calls across the permission await.
    lifecycle: tokio::sync::Mutex<()>,
    tick_in_flight: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
    metrics: SessionMetrics,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    /// Incremented on every successful start. Ticks carry the generation
    /// they were scheduled under so late results from an earlier run are
    /// dropped.
    generation: u64,
    runner: Option<RunnerHandle>,
    synced_fix: Option<SyncedFix>,
    infractions: Vec<String>,
    display_fix: Option<Fix>,
    last_decision: Option<Decision>,
}

impl TrackingSession {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                config,
                collaborators,
                state: Mutex::new(SessionState::default()),
                lifecycle: tokio::sync::Mutex::new(()),
                tick_in_flight: AtomicBool::new(false),
                events,
                metrics: SessionMetrics::new(),
            }),
        }
    }

    /// Start sampling every `interval_ms` milliseconds.
    ///
    /// A no-op if the session is already running. Otherwise asks for
    /// location permission, clears the previous run's baseline, infraction
    /// log and counters, and schedules the tick.
    ///
    /// Ticks read fixes under `tokio::time::timeout` and hand saves to
    /// `tokio::spawn`, so they must run inside a tokio runtime with the time
    /// driver enabled, whichever runner delivers them.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::InvalidInterval`] if `interval_ms` is 0
    /// - [`TrackingError::PermissionDenied`] if permission is refused; the
    ///   session is then in [`SessionStatus::Failed`]
    pub async fn start(&self, interval_ms: u64) -> Result<(), TrackingError> {
        let _lifecycle = self.inner.lifecycle.lock().await;

        if self.is_running() {
            debug!("Tracking already running, ignoring start");
            return Ok(());
        }

        if interval_ms == 0 {
            return Err(TrackingError::InvalidInterval(interval_ms));
        }

        let granted = self
            .inner
            .collaborators
            .permission
            .request_location_permission()
            .await;

        if !granted {
            self.inner.state.lock().status = SessionStatus::Failed(FailureReason::PermissionDenied);
            warn!("Location permission denied, tracking not started");
            self.inner
                .emit(SessionEvent::StartFailed(FailureReason::PermissionDenied));
            return Err(TrackingError::PermissionDenied);
        }

        let interval = Duration::from_millis(interval_ms);
        self.inner.metrics.reset();

        {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.status = SessionStatus::Running;
            state.synced_fix = None;
            state.infractions.clear();
            state.display_fix = None;
            state.last_decision = None;

            let tick = tick_callback(&self.inner, state.generation);
            state.runner = Some(self.inner.collaborators.runner.schedule(interval, tick));
        }

        info!(interval_ms, "Tracking started");
        self.inner.emit(SessionEvent::Started { interval });
        Ok(())
    }

    /// Stop sampling.
    ///
    /// Cancels the timer immediately. Reads and saves already in flight
    /// finish on their own; a fix that arrives after this call is dropped.
    /// The baseline and infraction log stay readable until the next start.
    pub fn stop(&self) {
        let runner = {
            let mut state = self.inner.state.lock();
            if state.status != SessionStatus::Running {
                debug!("Tracking not running, ignoring stop");
                return;
            }
            state.status = SessionStatus::Idle;
            state.runner.take()
        };

        if let Some(runner) = runner {
            runner.cancel();
        }

        let snapshot = self.inner.metrics.snapshot();
        info!(
            ticks = snapshot.ticks,
            synced = snapshot.records_synced,
            infractions = snapshot.infractions,
            "Tracking stopped"
        );
        self.inner.emit(SessionEvent::Stopped);
    }

    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.lock().status
    }

    /// The most recently evaluated fix.
    pub fn current_display_fix(&self) -> Option<Fix> {
        self.inner.state.lock().display_fix
    }

    /// The decision made for [`current_display_fix`](Self::current_display_fix).
    pub fn last_decision(&self) -> Option<Decision> {
        self.inner.state.lock().last_decision
    }

    /// The current distance baseline.
    pub fn synced_fix(&self) -> Option<SyncedFix> {
        self.inner.state.lock().synced_fix
    }

    /// Infraction messages recorded since the last start, oldest first.
    pub fn infraction_messages(&self) -> Vec<String> {
        self.inner.state.lock().infractions.clone()
    }

    pub fn stats(&self) -> SessionSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Subscribe to session events.
    ///
    /// Receivers that fall more than `event_capacity` events behind lose
    /// the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }
}

/// Dropping the session stops it. Saves already handed to the store keep
/// the shared state alive until they finish, so the timer is cancelled here
/// rather than when that state goes away.
impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the runner callback for one generation.
///
/// Holds the session weakly so a runner that outlives the session does not
/// keep it alive.
fn tick_callback(inner: &Arc<Inner>, generation: u64) -> TickFn {
    let weak = Arc::downgrade(inner);
    Arc::new(move || {
        let weak = weak.clone();
        Box::pin(async move {
            if let Some(inner) = weak.upgrade() {
                inner.tick(generation).await;
            }
        })
    })
}

/// Marks a tick as in progress until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then(|| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Inner {
    fn emit(&self, event: SessionEvent) {
        // Err only means nobody is subscribed.
        let _ = self.events.send(event);
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.generation == generation && state.status == SessionStatus::Running
    }

    async fn tick(self: &Arc<Self>, generation: u64) {
        let Some(_in_flight) = InFlight::acquire(&self.tick_in_flight) else {
            self.metrics.tick_overlapped();
            debug!("Previous tick still running, skipping");
            self.emit(SessionEvent::TickSkipped(SkipReason::Overlap));
            return;
        };

        if !self.is_current(generation) {
            trace!(generation, "Tick for an inactive run, ignoring");
            return;
        }

        self.metrics.tick_started();

        match self.read_fix().await {
            Ok(fix) => self.apply(generation, fix),
            Err(error) => self.skip(error),
        }
    }

    async fn read_fix(&self) -> Result<Fix, PositionError> {
        let timeout = self.config.fix_timeout;
        let max_age = self.config.max_fix_age;

        let read = self.collaborators.source.current_fix(timeout, max_age);
        let fix = match tokio::time::timeout(timeout, read).await {
            Ok(result) => result?,
            Err(_) => return Err(PositionError::Timeout(timeout)),
        };

        let age = fix.age();
        if age > max_age {
            return Err(PositionError::Stale { age, max_age });
        }

        Ok(fix)
    }

    fn skip(&self, error: PositionError) {
        let reason = match &error {
            PositionError::Stale { age, .. } => {
                self.metrics.fix_stale();
                SkipReason::Stale { age: *age }
            }
            other => {
                self.metrics.position_failed();
                SkipReason::PositionUnavailable(other.to_string())
            }
        };

        let exhausted = error == PositionError::Exhausted;
        let error = TrackingError::from(error);
        let last = self.state.lock().display_fix.map(|fix| fix.coordinate());

        match (last, exhausted) {
            (_, true) => debug!(error = %error, "Skipping tick"),
            (Some(last), false) => warn!(
                error = %error,
                last_lat = last.latitude,
                last_lon = last.longitude,
                "Skipping tick"
            ),
            (None, false) => warn!(error = %error, "Skipping tick, no fix yet"),
        }

        self.emit(SessionEvent::TickSkipped(reason));
    }

    fn apply(self: &Arc<Self>, generation: u64, fix: Fix) {
        let (decision, synced, infraction) = {
            let mut state = self.state.lock();
            if state.generation != generation || state.status != SessionStatus::Running {
                debug!("Fix arrived after the run ended, dropping");
                return;
            }

            let decision = evaluate(state.synced_fix, &fix, &self.config.evaluator);
            state.display_fix = Some(fix);
            state.last_decision = Some(decision);

            // The baseline advances whether or not the save succeeds.
            let synced = decision.should_sync.then(|| {
                let baseline = decision.synced_fix(fix.coordinate());
                state.synced_fix = Some(baseline);
                baseline
            });

            let infraction = decision.is_infraction.then(|| {
                let message = infraction_message(decision.speed_kmh);
                state.infractions.push(message.clone());
                message
            });

            (decision, synced, infraction)
        };

        let coordinate = fix.coordinate();
        self.metrics.fix_evaluated();
        debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            distance_m = decision.distance_m,
            speed_kmh = decision.speed_kmh,
            should_sync = decision.should_sync,
            is_infraction = decision.is_infraction,
            "Fix evaluated"
        );
        self.emit(SessionEvent::Sampled { fix, decision });

        if let Some(baseline) = synced {
            self.metrics.record_synced();
            info!(
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                distance_m = baseline.distance_from_previous_m,
                "Fix synced"
            );
            self.emit(SessionEvent::Synced(baseline));
            self.persist(generation, LocationRecord::from_sample(&fix, &decision));
        }

        if let Some(message) = infraction {
            self.metrics.infraction();
            warn!(
                speed_kmh = decision.speed_kmh,
                limit_kmh = self.config.evaluator.speed_limit_kmh,
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                "Speed limit exceeded"
            );
            self.emit(SessionEvent::Infraction {
                message,
                speed_kmh: decision.speed_kmh,
            });
        }
    }

    /// Hand the record to the store without waiting for the result.
    ///
    /// The outcome is counted only if no later run has started meanwhile;
    /// counters are reset per run.
    fn persist(self: &Arc<Self>, generation: u64, record: LocationRecord) {
        let inner = Arc::clone(self);

        tokio::spawn(async move {
            let coordinate = Coordinate::new(record.latitude, record.longitude);
            let result = inner.collaborators.store.save(record).await;
            let same_run = inner.state.lock().generation == generation;

            match result {
                Ok(()) => {
                    if same_run {
                        inner.metrics.record_persisted();
                    }
                    trace!(lat = coordinate.latitude, lon = coordinate.longitude, "Record saved");
                }
                Err(e) => {
                    if same_run {
                        inner.metrics.persistence_failed();
                    }
                    let error = TrackingError::from(e);
                    warn!(
                        error = %error,
                        lat = coordinate.latitude,
                        lon = coordinate.longitude,
                        "Record not saved, baseline kept"
                    );
                    inner.emit(SessionEvent::PersistenceFailed {
                        coordinate,
                        error: error.to_string(),
                    });
                }
            }
        });
    }
}
