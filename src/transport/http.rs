//! Agent session backed by a remote chat endpoint
//!
//! Each turn is one authenticated `POST {endpoint}/chat` carrying the whole
//! conversation; the endpoint answers with `{"response": "..."}`.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::transport::{AgentOutput, AgentSession};

/// Environment variable holding the API key
pub const ENV_AGENT_API_KEY: &str = "CHATBOT_AGENT_API_KEY";

/// Environment variable holding the endpoint base URL
pub const ENV_AGENT_ENDPOINT: &str = "CHATBOT_AGENT_ENDPOINT";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`HttpAgent`]
#[derive(Clone)]
pub struct HttpAgentConfig {
    /// Base URL; `/chat` is appended
    pub endpoint: String,
    /// Bearer token
    pub api_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for HttpAgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAgentConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl HttpAgentConfig {
    /// Settings for `endpoint` authenticated with `api_key`
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read endpoint and API key from the environment
    ///
    /// # Errors
    /// Returns `InvalidConfig` if either variable is missing or empty
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read endpoint and API key through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns `InvalidConfig` if either variable is missing or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ChatError::invalid_config(format!("{name} is not set in environment variables"))
                })
        };
        Ok(Self::new(read(ENV_AGENT_ENDPOINT)?, read(ENV_AGENT_API_KEY)?))
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.endpoint.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestBody<'a> {
    messages: [ChatMessageBody<'a>; 1],
    input_type: &'static str,
}

#[derive(Serialize)]
struct ChatMessageBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Agent session talking to a remote chat endpoint over HTTPS
pub struct HttpAgent {
    config: HttpAgentConfig,
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpAgent {
    /// Create an unconnected agent
    #[must_use]
    pub fn new(config: HttpAgentConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }
}

impl AgentSession for HttpAgent {
    async fn connect(&self) -> Result<()> {
        let client = reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| ChatError::connection(format!("Failed to build HTTP client: {e}")))?;
        *self.client.lock() = Some(client);
        log::debug!("HTTP agent ready for {}", self.config.endpoint);
        Ok(())
    }

    async fn send(&self, conversation: &str) -> Result<AgentOutput> {
        let client = self
            .client
            .lock()
            .clone()
            .ok_or_else(|| ChatError::connection("HTTP agent is not connected"))?;

        let body = ChatRequestBody {
            messages: [ChatMessageBody {
                kind: "text",
                content: conversation,
            }],
            input_type: "text",
        };

        let response = client
            .post(self.config.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::transport(format!(
                "API request failed with status {status}"
            )));
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ChatError::transport(format!("Invalid response body: {e}")))?;

        match (body.response, body.error) {
            (_, Some(error)) => Err(ChatError::transport(format!("agent error: {error}"))),
            (Some(response), None) => Ok(AgentOutput::new(response)),
            (None, None) => Err(ChatError::transport("response body has no response field")),
        }
    }

    async fn close(&self) -> Result<()> {
        self.client.lock().take();
        Ok(())
    }
}
