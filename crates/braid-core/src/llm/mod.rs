//! Model-client boundary
//!
//! Request/response translation between turn sequences and the
//! chat-completions wire format, plus the HTTP client with retry and
//! prefix deduplication.

pub mod client;
pub mod wire;

pub use client::{ChatOutcome, ModelClient};
pub use wire::{parse_response, request_messages, tool_definitions, turn_from_wire, TokenUsage};
