//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(
        id: S,
        name: S,
        arguments: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get a typed argument value
    pub fn get_argument<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.arguments
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_argument::<String>(key)
    }

    /// Get a boolean argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_argument::<bool>(key)
    }

    /// Get a number argument
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get_argument::<f64>(key)
    }
}

/// Parameter definition for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Parameter type (string, number, boolean, object, array)
    pub param_type: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Default value (if any)
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    /// Create a required string parameter
    pub fn string<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "string".to_string(),
            required: true,
            default: None,
        }
    }

    /// Create a number parameter
    pub fn number<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "number".to_string(),
            required: true,
            default: None,
        }
    }

    /// Create a boolean parameter
    pub fn boolean<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "boolean".to_string(),
            required: true,
            default: None,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set default value
    pub fn with_default<V: Into<serde_json::Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// JSON schema descriptor for a tool, in the shape the chat API's
/// function-calling request field accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input parameters schema
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a new tool schema from parameter definitions
    pub fn new<S: Into<String>>(name: S, description: S, parameters: Vec<ToolParameter>) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in parameters {
            if param.required {
                required.push(param.name.clone());
            }

            let mut param_schema = serde_json::Map::new();
            param_schema.insert("type".to_string(), param.param_type.into());
            param_schema.insert("description".to_string(), param.description.into());

            if let Some(default) = param.default {
                param_schema.insert("default".to_string(), default);
            }

            properties.insert(param.name, param_schema.into());
        }

        let parameters_schema = serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_argument_getters() {
        let mut args = HashMap::new();
        args.insert("command".to_string(), serde_json::json!("ls -la"));
        args.insert("timeout".to_string(), serde_json::json!(30));
        args.insert("background".to_string(), serde_json::json!(false));
        let call = ToolCall::new("call-1", "terminal", args);

        assert_eq!(call.get_string("command").unwrap(), "ls -la");
        assert_eq!(call.get_number("timeout").unwrap(), 30.0);
        assert!(!call.get_bool("background").unwrap());
        assert!(call.get_string("missing").is_none());
    }

    #[test]
    fn test_schema_builds_required_list() {
        let schema = ToolSchema::new(
            "terminal",
            "Run a shell command",
            vec![
                ToolParameter::string("command", "The command to execute"),
                ToolParameter::number("timeout", "Timeout in seconds").optional(),
            ],
        );

        assert_eq!(schema.parameters["required"], serde_json::json!(["command"]));
        assert_eq!(
            schema.parameters["properties"]["command"]["type"],
            "string"
        );
    }
}
