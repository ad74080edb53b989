//! GeoTrack - distance-gated location tracking with speed infraction alerts
//!
//! A tracking session periodically reads a position fix, measures how far
//! it is from the last synced fix, syncs it to a record store once it has
//! moved far enough, and flags samples over the speed limit.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────── TrackingSession ─────────────────────────────┐
//! │                                                                           │
//! │  BackgroundRunner ──tick──► PositionSource ──Fix──► sample::evaluate       │
//! │                                                        │ (geo::distance)  │
//! │                                                        ▼                  │
//! │                         synced baseline ◄── Decision ──► infraction log   │
//! │                                                        │                  │
//! │                                                        ▼                  │
//! │                                                  RecordStore::save        │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`geo`] - coordinates and haversine distance
//! - [`sample`] - fixes, the synced baseline, per-sample decisions
//! - [`session`] - the tracking session state machine
//! - [`collaborators`] - traits for the permission, position, store and runner services
//! - [`runner`], [`source`], [`store`], [`permission`] - implementations of those traits
//! - [`config`] - INI configuration file
//! - [`logging`] - tracing subscriber setup

pub mod collaborators;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod permission;
pub mod runner;
pub mod sample;
pub mod session;
pub mod source;
pub mod store;

pub use error::{PositionError, StoreError, TrackingError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
