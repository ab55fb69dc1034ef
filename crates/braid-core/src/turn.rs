//! Conversation turn types
//!
//! A [`Turn`] is one immutable role-tagged message in a conversation. Turns
//! are value objects: once constructed no field is mutated, and an "edit"
//! at the sequence level always means replacing a turn, never changing one
//! in place. Structural sharing in the version chain relies on this.

use crate::error::{BraidError, BraidResult};
use crate::tools::types::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Metadata key under which assistant tool calls are stored.
pub const TOOL_CALLS_KEY: &str = "tool_calls";

/// Role of a turn in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message (human input)
    User,
    /// Assistant message (model response)
    Assistant,
    /// Tool message (tool execution result)
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

impl FromStr for Role {
    type Err = BraidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(BraidError::invalid_role(other)),
        }
    }
}

/// Structured content of a tool-result turn
///
/// The payload carries its own `role` and `content` sub-fields as required
/// by the chat wire format, and may embed a full sub-trajectory when the
/// tool ran a nested agent of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPayload {
    /// Role of the payload, pinned to `tool`
    pub role: Role,
    /// Tool output text
    pub content: String,
    /// Tool call this result answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Nested turns from a subagent run, if the tool spawned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Vec<Turn>>,
}

impl ToolPayload {
    /// Create a tool payload
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: None,
            tool_name: None,
            trajectory: None,
        }
    }

    /// Attach the tool call id this result answers
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(call_id.into());
        self
    }

    /// Attach the producing tool's name
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    /// Embed a subagent's turns
    pub fn with_trajectory(mut self, turns: Vec<Turn>) -> Self {
        self.trajectory = Some(turns);
        self
    }

    /// Check the required sub-fields
    pub fn validate(&self) -> BraidResult<()> {
        if self.role != Role::Tool {
            return Err(BraidError::schema(format!(
                "tool payload role must be 'tool', got '{}'",
                self.role
            )));
        }
        Ok(())
    }
}

/// Content of a turn: plain text or a structured tool result
///
/// Modeled as a tagged union so the recursive tool-result case stays
/// explicit and exhaustively matchable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    /// Plain text content
    Text(String),
    /// Structured tool-result payload
    ToolResult(ToolPayload),
}

impl TurnContent {
    /// The text carried by this content, whichever variant it is
    pub fn as_text(&self) -> &str {
        match self {
            TurnContent::Text(text) => text,
            TurnContent::ToolResult(payload) => &payload.content,
        }
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        TurnContent::Text(text)
    }
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        TurnContent::Text(text.to_string())
    }
}

/// One immutable role-tagged message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the sender
    pub role: Role,
    /// Content of the turn
    pub content: TurnContent,
    /// Additional metadata (sampling temperature, token counts, ...)
    ///
    /// Metadata never participates in content equality.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Turn {
    /// Create a new system turn
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: TurnContent::Text(content.into()),
            metadata: HashMap::new(),
        }
    }

    /// Create a new user turn
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(content.into()),
            metadata: HashMap::new(),
        }
    }

    /// Create a new assistant turn
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(content.into()),
            metadata: HashMap::new(),
        }
    }

    /// Create a new tool turn from output text and call bookkeeping
    pub fn tool<S: Into<String>>(content: S, tool_call_id: S, tool_name: Option<S>) -> Self {
        let mut payload = ToolPayload::new(content).with_call_id(tool_call_id);
        if let Some(name) = tool_name {
            payload = payload.with_tool_name(name);
        }
        Self {
            role: Role::Tool,
            content: TurnContent::ToolResult(payload),
            metadata: HashMap::new(),
        }
    }

    /// Create a tool turn from an already-built payload
    ///
    /// Fails with a schema error when the payload's sub-fields are invalid.
    pub fn tool_result(payload: ToolPayload) -> BraidResult<Self> {
        payload.validate()?;
        Ok(Self {
            role: Role::Tool,
            content: TurnContent::ToolResult(payload),
            metadata: HashMap::new(),
        })
    }

    /// Add metadata to the turn (builder style; turns stay immutable once
    /// handed to a sequence)
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach the tool calls an assistant turn requested
    pub fn with_tool_calls(mut self, calls: &[ToolCall]) -> BraidResult<Self> {
        let value = serde_json::to_value(calls)?;
        self.metadata.insert(TOOL_CALLS_KEY.to_string(), value);
        Ok(self)
    }

    /// Tool calls requested by this turn, empty for non-assistant turns
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.metadata
            .get(TOOL_CALLS_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Whether this turn requests any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    /// Content-level equality: `(role, content)` only, metadata excluded
    ///
    /// This is deliberately distinct from `PartialEq` (which also compares
    /// metadata) and from pointer identity on shared turns.
    pub fn content_eq(&self, other: &Turn) -> bool {
        self.role == other.role && self.content == other.content
    }

    /// The text carried by this turn
    pub fn text(&self) -> &str {
        self.content.as_text()
    }

    /// Validate the role/content pairing
    ///
    /// A tool turn must carry a structured payload with the required
    /// sub-fields; decoding wire data funnels through this.
    pub fn validate(&self) -> BraidResult<()> {
        match (&self.role, &self.content) {
            (Role::Tool, TurnContent::ToolResult(payload)) => payload.validate(),
            (Role::Tool, TurnContent::Text(_)) => Err(BraidError::schema(
                "tool turn content must be a structured payload with 'role' and 'content'",
            )),
            _ => Ok(()),
        }
    }
}
