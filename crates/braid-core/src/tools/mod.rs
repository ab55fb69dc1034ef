//! Tool system for Braid
//!
//! Tools are stateful callables with a schema. The model requests them by
//! name with structured arguments; their results come back as tool-result
//! payloads appendable directly as turns.

pub mod base;
pub mod registry;
pub mod types;

pub use base::{Tool, ToolError};
pub use registry::ToolRegistry;
pub use types::{ToolCall, ToolParameter, ToolSchema};
