//! Agent configuration

use crate::error::{BraidError, BraidResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default chat-completions endpoint base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model name to request
    pub model: String,
    /// Base URL of the chat-completions API
    pub base_url: String,
    /// API key; falls back to `BRAID_API_KEY` then `OPENAI_API_KEY`
    pub api_key: Option<String>,
    /// Maximum model-call iterations per run
    pub max_steps: u32,
    /// Delay between tool calls, in milliseconds
    pub tool_delay_ms: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens per response
    pub max_tokens: Option<u32>,
    /// Nucleus sampling parameter
    pub top_p: Option<f32>,
    /// System prompt; a default is used when unset
    pub system_prompt: Option<String>,
    /// JSONL file to append exported training pairs to
    pub trajectory_path: Option<PathBuf>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum retries for transient model-client failures
    pub max_retries: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            max_steps: 10,
            tool_delay_ms: 0,
            temperature: None,
            max_tokens: None,
            top_p: None,
            system_prompt: None,
            trajectory_path: None,
            request_timeout_secs: 120,
            max_retries: 3,
        }
    }
}

impl AgentConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BraidResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BraidError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| BraidError::config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Basic sanity checks
    pub fn validate(&self) -> BraidResult<()> {
        if self.model.is_empty() {
            return Err(BraidError::config("model must not be empty"));
        }
        if self.max_steps == 0 {
            return Err(BraidError::config("max_steps must be at least 1"));
        }
        Ok(())
    }

    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("BRAID_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model": "gpt-4o-mini", "max_steps": 3}"#).unwrap();

        let config = AgentConfig::from_file(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = AgentConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BraidError::Config { .. })
        ));
    }
}
