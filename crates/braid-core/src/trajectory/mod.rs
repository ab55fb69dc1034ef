//! Trajectory export
//!
//! Walks a version chain and produces every distinct `(context, response)`
//! pair the model genuinely observed, in the chronological order the
//! responses were produced. Pairs are deduplicated by content across chains
//! through an explicit, caller-owned [`DedupRegistry`].

pub mod dedup;
pub mod exporter;
pub mod sink;

pub use dedup::{transcript_digest, DedupRegistry, TranscriptDigest};
pub use exporter::{export_trajectories, TrainingPair};
pub use sink::TrajectorySink;
