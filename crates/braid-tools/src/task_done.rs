//! Task completion marker tool

use async_trait::async_trait;
use braid_core::tools::base::{Tool, ToolError};
use braid_core::tools::types::{ToolCall, ToolParameter, ToolSchema};
use braid_core::turn::ToolPayload;

/// Tool the model calls to signal the task is complete
///
/// The agent loop treats a call to this tool as terminal.
pub struct TaskDoneTool;

#[async_trait]
impl Tool for TaskDoneTool {
    fn name(&self) -> &str {
        "task_done"
    }

    fn description(&self) -> &str {
        "Mark the current task as fully complete. Call this once the user's request is satisfied."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "task_done",
            "Mark the current task as fully complete. Call this once the user's request is satisfied.",
            vec![ToolParameter::string("summary", "One-line summary of what was accomplished")
                .optional()],
        )
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolPayload, ToolError> {
        let summary = call.get_string("summary").unwrap_or_default();
        tracing::info!(summary = %summary, "task marked done");
        Ok(ToolPayload::new(if summary.is_empty() {
            "Task completed.".to_string()
        } else {
            format!("Task completed: {}", summary)
        }))
    }
}
