//! Braid Core Library
//!
//! Braid tracks the conversation state of an LLM-driven agent as a
//! versioned sequence of role-tagged turns. The sequence is editable like
//! a plain list, but any context the model has already observed is frozen
//! into a version chain the moment an edit would touch it, so recorded
//! responses stay on-policy and every `(context, response)` pair can be
//! re-extracted later as training data.

pub mod agent;
pub mod chain;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod tools;
pub mod trajectory;
pub mod turn;

#[cfg(test)]
mod history_tests;

// Re-export commonly used types
pub use agent::{final_response, merged_toolset, run_completed, Agent, AgentPrimitive};
pub use chain::{snapshots_root_to_head, Chain};
pub use config::AgentConfig;
pub use error::{BraidError, BraidResult};
pub use history::TurnSequence;
pub use llm::{ChatOutcome, ModelClient, TokenUsage};
pub use tools::{Tool, ToolCall, ToolError, ToolRegistry, ToolSchema};
pub use trajectory::{export_trajectories, DedupRegistry, TrainingPair, TrajectorySink};
pub use turn::{Role, ToolPayload, Turn, TurnContent};
