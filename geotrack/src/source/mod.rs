//! [`PositionSource`](crate::collaborators::PositionSource) implementations.

mod replay;

pub use replay::{ReplayPositionSource, TrackParseError, TrackPoint};
