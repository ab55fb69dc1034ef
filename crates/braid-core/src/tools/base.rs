//! Base trait and error type for tools

use crate::error::BraidError;
use crate::tools::types::{ToolCall, ToolSchema};
use crate::turn::ToolPayload;
use async_trait::async_trait;

/// Error type for tool operations
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid arguments provided to the tool
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool execution failed
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool not found
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Tool timeout
    #[error("tool execution timeout")]
    Timeout,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ToolError> for BraidError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => BraidError::tool(name, "tool not found"),
            other => BraidError::tool("unknown", other.to_string()),
        }
    }
}

/// Base trait for all tools
///
/// A tool is a stateful callable with a schema. Its result is a tool
/// payload carrying at least `role` and `content`, appendable directly as
/// a turn in the conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name, lowercase with underscores
    fn name(&self) -> &str;

    /// Description included in the model's tool definitions
    fn description(&self) -> &str;

    /// JSON schema for the tool's input parameters
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolPayload, ToolError>;
}
