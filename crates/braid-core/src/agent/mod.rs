//! Agent run loop
//!
//! The agent repeatedly calls the model and appends the results to the
//! conversation: assistant turn, then one tool turn per requested call,
//! until the model answers without tool calls, marks the task done, or the
//! step budget runs out. Callers only ever observe the conversation through
//! the returned [`TurnSequence`].

use crate::config::AgentConfig;
use crate::error::BraidResult;
use crate::history::TurnSequence;
use crate::llm::client::ModelClient;
use crate::tools::base::Tool;
use crate::tools::registry::ToolRegistry;
use crate::turn::{Role, Turn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

/// Tool name the model calls to mark a task complete
pub const TASK_DONE_TOOL: &str = "task_done";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Use the available tools to complete the user's task, then reply with your answer. \
Call task_done when the task is fully complete.";

/// A source of tools, possibly composed of nested agents
///
/// An agent's effective toolset is its own tools plus the tools of every
/// nested primitive, recursively, with duplicate definitions removed.
pub trait AgentPrimitive: Send + Sync {
    /// Tools this primitive contributes
    fn tools(&self) -> Vec<Arc<dyn Tool>>;

    /// Nested agents whose tools are merged into the running agent's set
    fn agent_primitives(&self) -> Vec<Arc<dyn AgentPrimitive>> {
        Vec::new()
    }
}

/// Merge a primitive's toolset with its nested primitives', dropping
/// duplicate tool definitions by name
pub fn merged_toolset(primitive: &dyn AgentPrimitive) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    collect_tools(primitive, &mut registry);
    registry
}

fn collect_tools(primitive: &dyn AgentPrimitive, registry: &mut ToolRegistry) {
    registry.register_all(primitive.tools());
    for nested in primitive.agent_primitives() {
        collect_tools(nested.as_ref(), registry);
    }
}

/// An LLM-driven agent with tool calling
pub struct Agent {
    config: AgentConfig,
    client: ModelClient,
    tools: Vec<Arc<dyn Tool>>,
    primitives: Vec<Arc<dyn AgentPrimitive>>,
}

impl Agent {
    /// Create a new agent
    pub fn new(config: AgentConfig, client: ModelClient) -> Self {
        Self {
            config,
            client,
            tools: Vec::new(),
            primitives: Vec::new(),
        }
    }

    /// Add a tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add many tools
    pub fn with_tools<I>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        self.tools.extend(tools);
        self
    }

    /// Add a nested agent whose tools merge into this agent's set
    pub fn with_primitive(mut self, primitive: Arc<dyn AgentPrimitive>) -> Self {
        self.primitives.push(primitive);
        self
    }

    /// The model client
    pub fn client(&self) -> &ModelClient {
        &self.client
    }

    /// Run a task to completion
    ///
    /// The returned sequence is the live head of the conversation; edits
    /// and trajectory export happen on it afterwards.
    pub async fn run(&self, task: &str) -> BraidResult<TurnSequence> {
        let registry = merged_toolset(self);
        let definitions = registry.definitions();
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, tools = registry.len(), "starting agent run");

        let mut history = TurnSequence::new();
        let prompt = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        history.append(Turn::system(prompt).with_metadata("run_id", run_id.to_string()));
        history.append(Turn::user(task));

        for step in 1..=self.config.max_steps {
            let outcome = self.client.chat(&history, &definitions).await?;
            let mut assistant = outcome.turn;
            if let Some(usage) = outcome.usage {
                assistant = assistant.with_metadata("usage", serde_json::to_value(usage)?);
            }

            let calls = assistant.tool_calls();
            tracing::info!(step, tool_calls = calls.len(), "model responded");
            history.append(assistant);

            if calls.is_empty() {
                return Ok(history);
            }

            let mut task_done = false;
            for (i, call) in calls.iter().enumerate() {
                if call.name == TASK_DONE_TOOL {
                    task_done = true;
                }
                let tool_turn = registry.dispatch(call).await;
                history.append(tool_turn);

                if self.config.tool_delay_ms > 0 && i + 1 < calls.len() {
                    sleep(Duration::from_millis(self.config.tool_delay_ms)).await;
                }
            }

            if task_done {
                return Ok(history);
            }
        }

        tracing::warn!(
            max_steps = self.config.max_steps,
            "maximum steps reached, stopping run"
        );
        Ok(history)
    }
}

impl AgentPrimitive for Agent {
    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    fn agent_primitives(&self) -> Vec<Arc<dyn AgentPrimitive>> {
        self.primitives.clone()
    }
}

/// Whether a run ended on its own terms rather than by exhausting the
/// step budget: the final assistant turn either answered without tool
/// calls or called `task_done`
pub fn run_completed(history: &TurnSequence) -> bool {
    match history.last_assistant() {
        Some(turn) => {
            let calls = turn.tool_calls();
            calls.is_empty() || calls.iter().any(|c| c.name == TASK_DONE_TOOL)
        }
        None => false,
    }
}

/// The final assistant reply in a finished conversation, if any
pub fn final_response(history: &TurnSequence) -> Option<&str> {
    history
        .iter()
        .rev()
        .map(|t| t.as_ref())
        .find(|t| t.role == Role::Assistant && !t.text().is_empty())
        .map(|t| t.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::ToolError;
    use crate::tools::types::{ToolCall, ToolParameter, ToolSchema};
    use crate::turn::ToolPayload;
    use async_trait::async_trait;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "A named tool"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(
                self.0,
                "A named tool",
                vec![ToolParameter::string("input", "Input value")],
            )
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolPayload, ToolError> {
            Ok(ToolPayload::new("ok"))
        }
    }

    struct Helper;

    impl AgentPrimitive for Helper {
        fn tools(&self) -> Vec<Arc<dyn Tool>> {
            vec![Arc::new(NamedTool("search")), Arc::new(NamedTool("shared"))]
        }
    }

    struct Outer;

    impl AgentPrimitive for Outer {
        fn tools(&self) -> Vec<Arc<dyn Tool>> {
            vec![Arc::new(NamedTool("shared")), Arc::new(NamedTool("write"))]
        }

        fn agent_primitives(&self) -> Vec<Arc<dyn AgentPrimitive>> {
            vec![Arc::new(Helper)]
        }
    }

    #[test]
    fn test_merged_toolset_dedups_nested_tools() {
        let registry = merged_toolset(&Outer);
        let definitions = registry.definitions();
        let names: Vec<&str> = definitions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["shared", "write", "search"]);
    }

    #[test]
    fn test_run_completed_by_reply_or_task_done() {
        let mut plain = TurnSequence::new();
        plain.append(Turn::user("task"));
        plain.append(Turn::assistant("done, here is the answer"));
        assert!(run_completed(&plain));

        let call = crate::tools::types::ToolCall::new(
            "call-1".to_string(),
            TASK_DONE_TOOL.to_string(),
            std::collections::HashMap::new(),
        );
        let mut marked = TurnSequence::new();
        marked.append(Turn::user("task"));
        marked.append(Turn::assistant("").with_tool_calls(&[call]).unwrap());
        marked.append(Turn::tool("Task completed.", "call-1", None));
        assert!(run_completed(&marked));

        let other_call = crate::tools::types::ToolCall::new(
            "call-2".to_string(),
            "terminal".to_string(),
            std::collections::HashMap::new(),
        );
        let mut truncated = TurnSequence::new();
        truncated.append(Turn::user("task"));
        truncated.append(Turn::assistant("").with_tool_calls(&[other_call]).unwrap());
        truncated.append(Turn::tool("out", "call-2", None));
        assert!(!run_completed(&truncated));

        assert!(!run_completed(&TurnSequence::new()));
    }

    #[test]
    fn test_final_response_skips_tool_turns() {
        let mut history = TurnSequence::new();
        history.append(Turn::user("task"));
        history.append(Turn::assistant("thinking"));
        history.append(Turn::tool("output", "call-1", None));
        assert_eq!(final_response(&history), Some("thinking"));

        let empty = TurnSequence::new();
        assert!(final_response(&empty).is_none());
    }
}
