//! Model client
//!
//! Translates a live turn sequence into a chat-completions request and the
//! response back into an assistant turn. Keeps a caller-supplied dedup
//! registry so that re-sending an already-recorded prefix does not create
//! a duplicate stored chain. Transient HTTP failures are retried with
//! exponential backoff and jitter.

use crate::config::AgentConfig;
use crate::error::{BraidError, BraidResult};
use crate::history::TurnSequence;
use crate::llm::wire::{parse_response, request_messages, tool_definitions, TokenUsage};
use crate::tools::types::ToolSchema;
use crate::trajectory::dedup::{transcript_digest, DedupRegistry};
use crate::turn::Turn;
use parking_lot::Mutex;
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Result of one model call
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The assistant turn the model produced
    pub turn: Turn,
    /// Token usage reported by the provider
    pub usage: Option<TokenUsage>,
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct ModelClient {
    http: reqwest::Client,
    config: AgentConfig,
    api_key: Option<String>,
    registry: Arc<Mutex<DedupRegistry>>,
}

impl ModelClient {
    /// Create a new model client
    ///
    /// The registry is an explicit, caller-owned store recording every
    /// chain this client has sent, keyed by content digest. Re-sending a
    /// transcript that is already recorded does not store a new chain.
    pub fn new(config: AgentConfig, registry: Arc<Mutex<DedupRegistry>>) -> BraidResult<Self> {
        config.validate()?;
        let api_key = config.resolve_api_key();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BraidError::llm(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config,
            api_key,
            registry,
        })
    }

    /// The model this client requests
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// The shared dedup registry
    pub fn registry(&self) -> &Arc<Mutex<DedupRegistry>> {
        &self.registry
    }

    /// Send the sequence's live turns and decode the assistant response
    #[instrument(skip(self, history, tools), fields(model = %self.config.model, turns = history.len()))]
    pub async fn chat(
        &self,
        history: &TurnSequence,
        tools: &[ToolSchema],
    ) -> BraidResult<ChatOutcome> {
        // Record the prefix we are about to send. A repeat by content means
        // this exact context is already stored; nothing new to keep.
        let digest = transcript_digest(history.turns());
        if !self.registry.lock().observe(digest) {
            debug!(%digest, "prefix already recorded, skipping duplicate chain");
        }

        let body = self.request_body(history, tools)?;

        let mut attempt = 0;
        loop {
            match self.send(&body).await {
                Ok(response) => {
                    let (turn, usage) = parse_response(&response)?;
                    return Ok(ChatOutcome { turn, usage });
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let backoff = Duration::from_millis(
                        500u64.saturating_mul(1 << attempt)
                            + rand::thread_rng().gen_range(0..250),
                    );
                    warn!(
                        attempt = attempt + 1,
                        max = self.config.max_retries,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "model call failed, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn request_body(&self, history: &TurnSequence, tools: &[ToolSchema]) -> BraidResult<Value> {
        let mut body = json!({
            "model": self.config.model,
            "messages": request_messages(history.turns())?,
        });
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(top_p) = self.config.top_p {
            body["top_p"] = json!(top_p);
        }
        if !tools.is_empty() {
            body["tools"] = json!(tool_definitions(tools));
        }
        Ok(body)
    }

    async fn send(&self, body: &Value) -> BraidResult<Value> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BraidError::llm("request timeout")
            } else {
                BraidError::llm(format!("connection failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BraidError::llm_with_status(
                format!("API error: {}", text),
                status.as_u16(),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| BraidError::llm(format!("failed to decode response body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Turn;

    fn client(config: AgentConfig) -> ModelClient {
        ModelClient::new(config, Arc::new(Mutex::new(DedupRegistry::new()))).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let config = AgentConfig {
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.2),
            max_tokens: Some(256),
            ..Default::default()
        };
        let c = client(config);

        let mut history = TurnSequence::new();
        history.append(Turn::system("S"));
        history.append(Turn::user("U"));

        let schema = crate::tools::types::ToolSchema::new(
            "terminal",
            "Run a command",
            vec![crate::tools::types::ToolParameter::string(
                "command",
                "Command to run",
            )],
        );
        let body = c.request_body(&history, &[schema]).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["tools"][0]["function"]["name"], "terminal");
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_chat_records_prefix_once_per_content() {
        let registry = Arc::new(Mutex::new(DedupRegistry::new()));
        let c = ModelClient::new(AgentConfig::default(), Arc::clone(&registry)).unwrap();

        let history = TurnSequence::from_turns(vec![Turn::user("hi")]);
        let digest = transcript_digest(history.turns());

        // Same bookkeeping chat() performs before sending.
        assert!(c.registry().lock().observe(digest));
        assert!(!c.registry().lock().observe(digest));
        assert_eq!(registry.lock().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AgentConfig {
            model: String::new(),
            ..Default::default()
        };
        assert!(ModelClient::new(config, Arc::new(Mutex::new(DedupRegistry::new()))).is_err());
    }
}
