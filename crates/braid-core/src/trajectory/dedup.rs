//! Content-equality digests and the dedup registry
//!
//! Two transcripts with identical `(role, content)` pairs count as one,
//! whatever their metadata or object identity. The registry is an explicit
//! passed-in store with a defined lifecycle, never an implicit singleton.
//! The model client keeps one instance for the chains it has sent; the
//! exporter takes its own instance for the pairs it has emitted.

use crate::turn::Turn;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

/// SHA-256 digest of a transcript's `(role, content)` pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscriptDigest([u8; 32]);

impl std::fmt::Display for TranscriptDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Digest a slice of turns by content
///
/// Only `(role, content)` feed the hash; metadata does not. The encoding is
/// the canonical wire shape of each pair, so any two turns that compare
/// equal under content equality digest identically.
pub fn transcript_digest(turns: &[Arc<Turn>]) -> TranscriptDigest {
    let mut hasher = Sha256::new();
    for turn in turns {
        let pair = json!({
            "role": turn.role,
            "content": turn.content,
        });
        // Serialization of a role/content pair cannot fail.
        let encoded = serde_json::to_vec(&pair).unwrap_or_default();
        hasher.update((encoded.len() as u64).to_be_bytes());
        hasher.update(&encoded);
    }
    TranscriptDigest(hasher.finalize().into())
}

/// Process-wide store of transcripts already seen, keyed by content digest
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: HashSet<TranscriptDigest>,
}

impl DedupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a digest. Returns `true` if it was not seen before.
    pub fn observe(&mut self, digest: TranscriptDigest) -> bool {
        self.seen.insert(digest)
    }

    /// Whether a digest has been recorded
    pub fn contains(&self, digest: &TranscriptDigest) -> bool {
        self.seen.contains(digest)
    }

    /// Number of distinct transcripts recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Turn;

    fn arcs(turns: Vec<Turn>) -> Vec<Arc<Turn>> {
        turns.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn test_digest_ignores_metadata() {
        let a = arcs(vec![
            Turn::system("hi").with_metadata("temperature", 0.7),
            Turn::user("hello"),
        ]);
        let b = arcs(vec![
            Turn::system("hi"),
            Turn::user("hello").with_metadata("tokens", 3),
        ]);
        assert_eq!(transcript_digest(&a), transcript_digest(&b));
    }

    #[test]
    fn test_digest_sensitive_to_role_and_order() {
        let a = arcs(vec![Turn::user("x"), Turn::assistant("y")]);
        let b = arcs(vec![Turn::assistant("y"), Turn::user("x")]);
        let c = arcs(vec![Turn::assistant("x"), Turn::assistant("y")]);
        assert_ne!(transcript_digest(&a), transcript_digest(&b));
        assert_ne!(transcript_digest(&a), transcript_digest(&c));
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut registry = DedupRegistry::new();
        let digest = transcript_digest(&arcs(vec![Turn::user("hi")]));

        assert!(registry.observe(digest));
        assert!(!registry.observe(digest));
        assert!(registry.contains(&digest));
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.observe(digest));
    }
}
