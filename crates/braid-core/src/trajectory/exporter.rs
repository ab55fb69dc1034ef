//! On-policy training pair extraction
//!
//! Every assistant turn in every snapshot of a version chain marks a point
//! where the model produced a response to an exact context. The exporter
//! re-emits those `(context, response)` pairs: snapshots are visited from
//! root to live head, positions within a snapshot in ascending order, which
//! yields the chronological order the responses were actually produced.
//! Traversal never mutates a snapshot.

use crate::chain::snapshots_root_to_head;
use crate::history::TurnSequence;
use crate::trajectory::dedup::{transcript_digest, DedupRegistry};
use crate::turn::{Role, Turn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One on-policy training example: the exact context the model saw and the
/// assistant response it produced
#[derive(Debug, Clone)]
pub struct TrainingPair {
    /// Turns at positions `[0, k)` when the response was produced
    pub context: Vec<Arc<Turn>>,
    /// The assistant turn at position `k`
    pub response: Arc<Turn>,
}

impl Serialize for TrainingPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let context: Vec<&Turn> = self.context.iter().map(|t| t.as_ref()).collect();
        let mut state = serializer.serialize_struct("TrainingPair", 2)?;
        state.serialize_field("context", &context)?;
        state.serialize_field("response", self.response.as_ref())?;
        state.end()
    }
}

/// Extract every distinct `(context, response)` pair from a version chain
///
/// Pairs are deduplicated by content digest against the caller's registry,
/// which also collapses duplicates across independently stored chains.
pub fn export_trajectories(
    head: &TurnSequence,
    registry: &mut DedupRegistry,
) -> Vec<TrainingPair> {
    let mut pairs = Vec::new();

    for snapshot in snapshots_root_to_head(head) {
        for (k, turn) in snapshot.iter().enumerate() {
            if turn.role != Role::Assistant {
                continue;
            }
            // Digest covers the context and the response together, i.e.
            // positions [0, k].
            let digest = transcript_digest(&snapshot.turns()[..=k]);
            if !registry.observe(digest) {
                continue;
            }
            pairs.push(TrainingPair {
                context: snapshot.turns()[..k].to_vec(),
                response: Arc::clone(turn),
            });
        }
    }

    tracing::debug!(
        pairs = pairs.len(),
        chain_len = head.chain().count(),
        "exported training pairs"
    );
    pairs
}
