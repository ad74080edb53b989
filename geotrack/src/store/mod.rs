//! [`RecordStore`](crate::collaborators::RecordStore) implementations.
//!
//! - [`MemoryRecordStore`] - in-process, with a switchable failure mode
//! - [`JsonLinesStore`] - append-only file, one JSON document per line

mod jsonl;
mod memory;

pub use jsonl::JsonLinesStore;
pub use memory::MemoryRecordStore;
