//! Session status and the events broadcast to observers.

use std::time::Duration;

use crate::geo::Coordinate;
use crate::sample::{Decision, Fix, SyncedFix};

/// Why a start attempt left the session in [`SessionStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    PermissionDenied,
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    /// The last start attempt failed. The session is not sampling; a later
    /// `start` may try again.
    Failed(FailureReason),
}

/// Why a tick produced no evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The previous tick was still in progress.
    Overlap,
    /// The position source failed or timed out.
    PositionUnavailable(String),
    /// The fix was older than the maximum age.
    Stale { age: Duration },
}

/// Events published by a tracking session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session entered Running.
    Started { interval: Duration },
    /// The session returned to Idle.
    Stopped,
    /// A start attempt was refused.
    StartFailed(FailureReason),
    /// A fix was evaluated. Sent for every evaluated fix.
    Sampled { fix: Fix, decision: Decision },
    /// The fix became the new baseline and was sent to the store.
    Synced(SyncedFix),
    /// The fix exceeded the speed limit.
    Infraction { message: String, speed_kmh: f64 },
    /// A tick was skipped.
    TickSkipped(SkipReason),
    /// The store rejected a synced fix.
    PersistenceFailed { coordinate: Coordinate, error: String },
}
