//! Anthropic Messages API provider over plain reqwest.

use super::{CompletionOptions, CompletionProvider, ConversationTurn, Role};
use crate::error::{truncate_chars, Result, SegueError, MAX_DIAGNOSTIC_CHARS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Join the text of every content block; non-text blocks contribute nothing.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

/// Anthropic-backed completion provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SegueError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base = base_url.unwrap_or(ANTHROPIC_API_BASE).trim_end_matches('/');

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}/v1/messages", base),
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    #[instrument(skip(self, turns), fields(model = %options.model, turns = turns.len()))]
    async fn complete(&self, turns: &[ConversationTurn], options: &CompletionOptions) -> Result<String> {
        let request = MessagesRequest {
            model: &options.model,
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
            messages: turns
                .iter()
                .map(|t| Message {
                    role: t.role,
                    content: &t.content,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Anthropic API");
                SegueError::Provider(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Anthropic API returned error");
            return Err(SegueError::Provider(format!(
                "Anthropic API returned {}: {}",
                status,
                truncate_chars(&body, MAX_DIAGNOSTIC_CHARS)
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SegueError::Provider(format!("Failed to parse response: {}", e)))?;

        let text = body.text();
        debug!("Received {} characters from Anthropic", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
