//! [`BackgroundRunner`](crate::collaborators::BackgroundRunner)
//! implementations.
//!
//! - [`IntervalRunner`] - spawns a tokio task that ticks on an interval
//! - [`HostDrivenRunner`] - the host calls `fire()` from its own timer

mod host;
mod interval;

pub use host::HostDrivenRunner;
pub use interval::IntervalRunner;
