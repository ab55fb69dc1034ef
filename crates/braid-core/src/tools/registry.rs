//! Tool registry
//!
//! Ordered, name-keyed collection of tools. Registration order is the
//! order definitions are sent to the model; duplicate names are dropped,
//! which is also the dedup rule when nested agents contribute toolsets.

use crate::tools::base::{Tool, ToolError};
use crate::tools::types::{ToolCall, ToolSchema};
use crate::turn::{ToolPayload, Turn};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of the tools available to one running agent
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, keeping the first registration on duplicate names
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.by_name.contains_key(&name) {
            tracing::debug!(tool = %name, "skipping duplicate tool definition");
            return;
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
    }

    /// Register many tools at once
    pub fn register_all<I>(&mut self, tools: I)
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry holds no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The registered tools, in registration order
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Schema descriptors for every registered tool, in the shape the
    /// model client's tool-calling request field accepts
    pub fn definitions(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Execute a tool call, turning any failure into a tool-result turn
    ///
    /// The agent loop never aborts on a failed tool; the error text goes
    /// back to the model as the tool's output.
    pub async fn dispatch(&self, call: &ToolCall) -> Turn {
        let payload = match self.get(&call.name) {
            Some(tool) => match tool.execute(call).await {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(tool = %call.name, error = %err, "tool execution failed");
                    error_payload(&err)
                }
            },
            None => {
                tracing::warn!(tool = %call.name, "unknown tool requested");
                error_payload(&ToolError::NotFound(call.name.clone()))
            }
        };

        let payload = payload
            .with_call_id(call.id.clone())
            .with_tool_name(call.name.clone());
        Turn {
            role: crate::turn::Role::Tool,
            content: crate::turn::TurnContent::ToolResult(payload),
            metadata: HashMap::new(),
        }
    }
}

fn error_payload(err: &ToolError) -> ToolPayload {
    let body = json!({
        "output": "",
        "exit_code": -1,
        "error": err.to_string(),
    });
    ToolPayload::new(body.to_string())
}
