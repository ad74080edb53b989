//! Sample evaluation: fixes, baselines and per-sample decisions.
//!
//! # Components
//!
//! - [`Fix`] - one position reading from a position source
//! - [`SyncedFix`] - the baseline the session measures movement against
//! - [`evaluate`] - stateless decision: distance, speed, sync, infraction
//! - [`LocationRecord`] - the document persisted for a synced fix

mod evaluator;
mod fix;
mod record;

pub use evaluator::{
    evaluate, speed_to_kmh, Decision, EvaluatorConfig, DEFAULT_DISTANCE_THRESHOLD_M,
    DEFAULT_SPEED_LIMIT_KMH,
};
pub use fix::{Fix, SyncedFix};
pub use record::LocationRecord;
