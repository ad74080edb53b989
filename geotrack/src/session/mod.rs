//! Tracking session: the periodic sample-evaluate-emit loop.
//!
//! # Lifecycle
//!
//! ```text
//!            start() ok                    stop()
//!   Idle ─────────────────► Running ─────────────────► Idle
//!    │                        ▲
//!    │ start() denied         │ start() ok
//!    ▼                        │
//!   Failed(PermissionDenied) ─┘
//! ```
//!
//! # Components
//!
//! - [`TrackingSession`] - lifecycle and tick processing
//! - [`SessionConfig`] - thresholds, read timeout and staleness bound
//! - [`SessionEvent`] - broadcast to observers
//! - [`SessionMetrics`] / [`SessionSnapshot`] - session counters

mod config;
mod events;
mod metrics;
mod tracker;

pub use config::{
    SessionConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_FIX_TIMEOUT, DEFAULT_INTERVAL_MS,
    DEFAULT_MAX_FIX_AGE,
};
pub use events::{FailureReason, SessionEvent, SessionStatus, SkipReason};
pub use metrics::{SessionMetrics, SessionSnapshot};
pub use tracker::{infraction_message, Collaborators, TrackingSession};
