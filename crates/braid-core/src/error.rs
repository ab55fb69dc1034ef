//! Error types for Braid
//!
//! All failures in the core are local validation errors detected at the
//! point of construction or indexed access; nothing here is retried
//! internally. The boundary adapters (model client, trajectory sink) add
//! their own variants for HTTP and storage failures.

use thiserror::Error;

/// Result type alias for Braid operations
pub type BraidResult<T> = Result<T, BraidError>;

/// Main error type for Braid
#[derive(Error, Debug, Clone)]
pub enum BraidError {
    /// Index read/write outside `[0, len)`
    #[error("index {index} out of range for sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Turn constructed or decoded with an unrecognized role
    #[error("invalid role: {role}")]
    InvalidRole { role: String },

    /// Malformed tool-result content missing required sub-fields
    #[error("schema error: {message}")]
    Schema { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Model client errors
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status: Option<u16>,
    },

    /// Tool execution errors
    #[error("tool error: {tool_name}: {message}")]
    Tool { tool_name: String, message: String },

    /// Agent run loop errors
    #[error("agent error: {message}")]
    Agent { message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Trajectory storage errors
    #[error("storage error: {message}")]
    Storage {
        message: String,
        path: Option<String>,
    },
}

impl BraidError {
    /// Create an out-of-range error
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create an invalid-role error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            status: None,
        }
    }

    /// Create an LLM error carrying the HTTP status
    pub fn llm_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Llm {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a tool error
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create an agent error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path,
        }
    }

    /// Whether a model-client error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Llm { status, message } => match status {
                Some(429) => true,
                Some(s) if *s >= 500 => true,
                Some(_) => false,
                None => {
                    let msg = message.to_lowercase();
                    msg.contains("timeout") || msg.contains("connection")
                }
            },
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BraidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = BraidError::out_of_range(10, 3);
        assert_eq!(
            err.to_string(),
            "index 10 out of range for sequence of length 3"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(BraidError::llm_with_status("rate limited", 429).is_retryable());
        assert!(BraidError::llm_with_status("bad gateway", 502).is_retryable());
        assert!(!BraidError::llm_with_status("unauthorized", 401).is_retryable());
        assert!(BraidError::llm("connection reset by peer").is_retryable());
        assert!(!BraidError::schema("missing content").is_retryable());
    }
}
