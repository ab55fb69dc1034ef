//! Terminal command execution tool
//!
//! Runs a shell command and returns `{output, exit_code, error}` as a JSON
//! string, which is what the model sees as the tool result. Execution
//! failures never propagate as errors; they come back in the `error` field
//! so the model can react to them.

use async_trait::async_trait;
use braid_core::tools::base::{Tool, ToolError};
use braid_core::tools::types::{ToolCall, ToolParameter, ToolSchema};
use braid_core::turn::ToolPayload;
use serde_json::json;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Tool that executes a single shell command
pub struct TerminalTool {
    default_timeout: Duration,
}

impl TerminalTool {
    /// Create a terminal tool with the default timeout
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the default command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    async fn run(&self, command: &str, timeout: Duration) -> serde_json::Value {
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }
                json!({
                    "output": text,
                    "exit_code": output.status.code().unwrap_or(-1),
                    "error": null,
                })
            }
            Ok(Err(e)) => json!({
                "output": "",
                "exit_code": -1,
                "error": format!("failed to execute command: {}", e),
            }),
            Err(_) => json!({
                "output": "",
                "exit_code": -1,
                "error": format!("command timed out after {}s", timeout.as_secs()),
            }),
        }
    }
}

impl Default for TerminalTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TerminalTool {
    fn name(&self) -> &str {
        "terminal"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output, exit code, and any error"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "terminal",
            "Execute a shell command and return its output, exit code, and any error",
            vec![
                ToolParameter::string("command", "The command to execute"),
                ToolParameter::number("timeout", "Command timeout in seconds").optional(),
            ],
        )
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolPayload, ToolError> {
        let command = call
            .get_string("command")
            .ok_or_else(|| ToolError::InvalidArguments("missing 'command'".to_string()))?;
        let timeout = match call.get_number("timeout") {
            // Rejects NaN, negative, and out-of-range values the model may
            // produce; a bad timeout must not take down the run.
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| {
                ToolError::InvalidArguments(format!("invalid timeout: {}", secs))
            })?,
            None => self.default_timeout,
        };

        tracing::debug!(command = %command, timeout_secs = timeout.as_secs(), "executing command");
        let result = self.run(&command, timeout).await;
        Ok(ToolPayload::new(result.to_string()))
    }
}
