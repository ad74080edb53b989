//! Interfaces the tracking session consumes.
//!
//! Everything outside the sampling loop (permission prompts, the platform's
//! location service, the remote store, the host's background scheduler) is
//! reached through these traits. They use boxed futures so sessions can hold
//! them as `Arc<dyn ...>` trait objects.
//!
//! ```text
//! ┌──────────────────┐  tick   ┌─────────────────┐  current_fix  ┌────────────────┐
//! │ BackgroundRunner │───────► │ TrackingSession │─────────────► │ PositionSource │
//! └──────────────────┘         │                 │               └────────────────┘
//!                              │                 │  save         ┌────────────────┐
//!  PermissionProvider ◄─start──│                 │─────────────► │  RecordStore   │
//!                              └─────────────────┘               └────────────────┘
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{PositionError, StoreError};
use crate::sample::{Fix, LocationRecord};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Grants or refuses access to location data.
pub trait PermissionProvider: Send + Sync {
    /// Ask for location access. May suspend while the user decides.
    fn request_location_permission(&self) -> BoxFuture<'_, bool>;
}

/// Delivers position fixes.
pub trait PositionSource: Send + Sync {
    /// Read the current position.
    ///
    /// Implementations should give up after `timeout` and should not return
    /// a cached fix older than `max_age`. The session enforces both bounds
    /// again on its side.
    fn current_fix(
        &self,
        timeout: Duration,
        max_age: Duration,
    ) -> BoxFuture<'_, Result<Fix, PositionError>>;
}

/// Persists synced fixes.
///
/// The session does not wait for or retry saves; retry policy belongs to
/// the implementation.
pub trait RecordStore: Send + Sync {
    fn save(&self, record: LocationRecord) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// Callback invoked once per tick.
pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Keeps the tick alive, in the foreground or not.
///
/// The only contract is "call `tick` every `interval` until the returned
/// handle is cancelled".
pub trait BackgroundRunner: Send + Sync {
    fn schedule(&self, interval: Duration, tick: TickFn) -> RunnerHandle;
}

/// Handle to a scheduled tick.
///
/// Cancelling stops further ticks. A tick that is already running is left
/// to finish on its own.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    cancellation: CancellationToken,
}

impl RunnerHandle {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// Stop delivering ticks.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
