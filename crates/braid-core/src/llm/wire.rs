//! Chat-completion wire translation
//!
//! Turns a sequence's live turns into the ordered message array a
//! chat-completions request takes, and decodes response messages back into
//! turns. Unknown role strings and malformed tool messages are rejected
//! with the typed validation errors; nothing is silently coerced.

use crate::error::{BraidError, BraidResult};
use crate::tools::types::{ToolCall, ToolSchema};
use crate::turn::{Role, Turn, TurnContent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Convert live turns into the ordered request message array
pub fn request_messages(turns: &[Arc<Turn>]) -> BraidResult<Vec<Value>> {
    let mut converted = Vec::with_capacity(turns.len());

    for turn in turns {
        turn.validate()?;
        let mut msg = json!({
            "role": turn.role.to_string(),
            "content": turn.text(),
        });

        if let TurnContent::ToolResult(payload) = &turn.content {
            if let Some(call_id) = &payload.tool_call_id {
                msg["tool_call_id"] = json!(call_id);
            }
            if let Some(name) = &payload.tool_name {
                msg["name"] = json!(name);
            }
        }

        let calls = turn.tool_calls();
        if !calls.is_empty() {
            let wire_calls: Vec<Value> = calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": serde_json::to_string(&tc.arguments)
                                .unwrap_or_default(),
                        }
                    })
                })
                .collect();
            msg["tool_calls"] = json!(wire_calls);
        }

        converted.push(msg);
    }

    Ok(converted)
}

/// Convert tool schemas into the request's `tools` field
pub fn tool_definitions(schemas: &[ToolSchema]) -> Vec<Value> {
    schemas
        .iter()
        .map(|schema| {
            json!({
                "type": "function",
                "function": {
                    "name": schema.name,
                    "description": schema.description,
                    "parameters": schema.parameters,
                }
            })
        })
        .collect()
}

/// Decode one wire message object into a turn
pub fn turn_from_wire(value: &Value) -> BraidResult<Turn> {
    let role_str = value
        .get("role")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BraidError::schema("wire message missing 'role'"))?;
    let role = Role::from_str(role_str)?;

    let content = value
        .get("content")
        .ok_or_else(|| BraidError::schema("wire message missing 'content'"))?;

    let turn = match role {
        Role::Tool => {
            let payload = serde_json::from_value(content.clone()).map_err(|e| {
                BraidError::schema(format!("malformed tool payload: {}", e))
            })?;
            Turn::tool_result(payload)?
        }
        _ => {
            let text = content.as_str().ok_or_else(|| {
                BraidError::schema(format!("'{}' turn content must be a string", role))
            })?;
            Turn {
                role,
                content: TurnContent::Text(text.to_string()),
                metadata: HashMap::new(),
            }
        }
    };
    Ok(turn)
}

/// Decode a chat-completions response body into the assistant turn it
/// carries, plus reported token usage
pub fn parse_response(body: &Value) -> BraidResult<(Turn, Option<TokenUsage>)> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| BraidError::llm("response has no choices"))?;

    let role_str = message
        .get("role")
        .and_then(|v| v.as_str())
        .unwrap_or("assistant");
    let role = Role::from_str(role_str)?;
    if role != Role::Assistant {
        return Err(BraidError::llm(format!(
            "expected assistant response, got role '{}'",
            role
        )));
    }

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut turn = Turn::assistant(content);

    if let Some(wire_calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        let mut calls = Vec::with_capacity(wire_calls.len());
        for wire_call in wire_calls {
            let id = wire_call
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let function = wire_call
                .get("function")
                .ok_or_else(|| BraidError::schema("tool call missing 'function'"))?;
            let name = function
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| BraidError::schema("tool call missing 'name'"))?
                .to_string();
            let arguments = match function.get("arguments") {
                Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_else(|e| {
                    tracing::warn!(tool = %name, error = %e, "invalid JSON in tool arguments");
                    HashMap::new()
                }),
                Some(Value::Object(map)) => map.clone().into_iter().collect(),
                _ => HashMap::new(),
            };
            calls.push(ToolCall::new(id, name, arguments));
        }
        turn = turn.with_tool_calls(&calls)?;
    }

    if let Some(finish) = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("finish_reason"))
        .and_then(|v| v.as_str())
    {
        turn = turn.with_metadata("finish_reason", finish);
    }

    let usage = body
        .get("usage")
        .and_then(|u| serde_json::from_value::<TokenUsage>(u.clone()).ok());

    Ok((turn, usage))
}
