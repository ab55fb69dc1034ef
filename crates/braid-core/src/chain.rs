//! Version-chain traversal
//!
//! The version chain is the linked list of snapshots reachable from a live
//! head through `predecessor`. Traversal is read-only: every non-head
//! snapshot is frozen, so walking the chain never needs a lock.

use crate::history::TurnSequence;

/// Iterator over a version chain, from the live head back to the root
pub struct Chain<'a> {
    next: Option<&'a TurnSequence>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(head: &'a TurnSequence) -> Self {
        Self { next: Some(head) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a TurnSequence;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.predecessor().map(|p| p.as_ref());
        Some(current)
    }
}

/// Collect the chain's snapshots oldest-first
///
/// Root-to-head order is the chronological order in which the snapshots
/// were frozen, which is what trajectory emission follows.
pub fn snapshots_root_to_head(head: &TurnSequence) -> Vec<&TurnSequence> {
    let mut snapshots: Vec<&TurnSequence> = head.chain().collect();
    snapshots.reverse();
    snapshots
}
