//! Versioned turn sequence
//!
//! [`TurnSequence`] is the unit of "current conversation state": an ordered
//! list of turns that behaves like a plain mutable sequence to its caller,
//! while guaranteeing that any context already observed by the model stays
//! retrievable unmodified through the version chain.
//!
//! Exactly one sequence per conversation is the live head. Every snapshot
//! reachable through `predecessor` is frozen the instant it is linked: its
//! turns never change again, so frozen snapshots can be read concurrently
//! without synchronization. "Live" vs "frozen" is never a stored flag, only
//! membership in some other sequence's `predecessor` slot.
//!
//! Mutation rules:
//! - `append` extends the head and never forks.
//! - `set(i, turn)` updates in place when no assistant turn exists at or
//!   after `i`. Otherwise the pre-edit state is first cloned into a frozen
//!   predecessor snapshot, and the write lands on the head. Writing an
//!   assistant turn whose content already matches the slot is a no-op.
//!
//! Turns are shared between snapshots by reference (`Arc`), so a fork is a
//! shallow copy of the position list, not a deep copy of turn contents.

use crate::chain::Chain;
use crate::error::{BraidError, BraidResult};
use crate::turn::{Role, Turn};
use std::sync::Arc;

/// An ordered, mutable-until-forked sequence of turns with a back-reference
/// to the snapshot it superseded
#[derive(Debug, Clone, Default)]
pub struct TurnSequence {
    turns: Vec<Arc<Turn>>,
    predecessor: Option<Arc<TurnSequence>>,
}

impl TurnSequence {
    /// Create an empty root sequence
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            predecessor: None,
        }
    }

    /// Build a sequence from turns, as a root (no predecessor)
    pub fn from_turns<I>(turns: I) -> Self
    where
        I: IntoIterator<Item = Turn>,
    {
        Self {
            turns: turns.into_iter().map(Arc::new).collect(),
            predecessor: None,
        }
    }

    /// Number of turns in the live snapshot (predecessors not counted)
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the live snapshot holds no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Push a turn to the end. Never forks.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(Arc::new(turn));
    }

    /// Push an already-shared turn to the end. Never forks.
    pub fn append_shared(&mut self, turn: Arc<Turn>) {
        self.turns.push(turn);
    }

    /// Bounds-checked read
    pub fn get(&self, index: usize) -> BraidResult<&Turn> {
        self.turns
            .get(index)
            .map(|t| t.as_ref())
            .ok_or_else(|| BraidError::out_of_range(index, self.turns.len()))
    }

    /// Bounds-checked read of the shared handle, for callers that need
    /// pointer identity or want to hold the turn past this borrow
    pub fn get_shared(&self, index: usize) -> BraidResult<Arc<Turn>> {
        self.turns
            .get(index)
            .cloned()
            .ok_or_else(|| BraidError::out_of_range(index, self.turns.len()))
    }

    /// Overwrite the turn at `index`, forking first when the edited range
    /// contains an assistant turn
    ///
    /// The three outcomes a caller can observe:
    /// - an elided no-op (assistant turn with identical content),
    /// - an in-place update (no assistant turn at or after `index`),
    /// - a transparent fork: the pre-edit state becomes this sequence's
    ///   predecessor and the write lands on the live head.
    pub fn set(&mut self, index: usize, turn: Turn) -> BraidResult<()> {
        let current = self
            .turns
            .get(index)
            .ok_or_else(|| BraidError::out_of_range(index, self.turns.len()))?;

        // Re-assigning an assistant turn with identical content changes
        // nothing: no mutation, no fork, head identity unchanged.
        if turn.role == Role::Assistant && turn.content == current.content {
            return Ok(());
        }

        // Any position at or after an existing assistant turn was part of
        // the context that produced it; overwriting it must preserve the
        // pre-edit state. This includes the assistant turn's own slot.
        if self.turns[index..].iter().any(|t| t.role == Role::Assistant) {
            self.fork();
        }

        self.turns[index] = Arc::new(turn);
        Ok(())
    }

    /// Freeze the current state into a predecessor snapshot
    ///
    /// The snapshot takes over this sequence's old predecessor, so it is an
    /// exact copy of the pre-edit state inserted into the chain. Turns are
    /// shared by reference; only the position list is copied.
    fn fork(&mut self) {
        let frozen = TurnSequence {
            turns: self.turns.clone(),
            predecessor: self.predecessor.take(),
        };
        self.predecessor = Some(Arc::new(frozen));
        tracing::debug!(len = self.turns.len(), depth = self.depth(), "forked turn sequence");
    }

    /// The snapshot this sequence superseded, if any
    pub fn predecessor(&self) -> Option<&Arc<TurnSequence>> {
        self.predecessor.as_ref()
    }

    /// Iterate the live snapshot's turns in order
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Turn>> {
        self.turns.iter()
    }

    /// The live snapshot's turns as a slice
    pub fn turns(&self) -> &[Arc<Turn>] {
        &self.turns
    }

    /// Walk the version chain from this sequence back to the root
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Number of predecessor links reachable from this sequence
    ///
    /// Equals the number of fork-triggering edits applied to this lineage.
    pub fn depth(&self) -> usize {
        self.chain().count() - 1
    }

    /// The last turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last().map(|t| t.as_ref())
    }

    /// The last assistant turn, if any
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .map(|t| t.as_ref())
            .find(|t| t.role == Role::Assistant)
    }
}

/// Equality is content-level: the ordered `(role, content)` transcripts
/// must match exactly. Metadata and version-chain shape are irrelevant.
impl PartialEq for TurnSequence {
    fn eq(&self, other: &Self) -> bool {
        self.turns.len() == other.turns.len()
            && self
                .turns
                .iter()
                .zip(other.turns.iter())
                .all(|(a, b)| a.content_eq(b))
    }
}

impl Eq for TurnSequence {}
