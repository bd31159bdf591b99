//! OpenAI chat-completions provider.

use super::{CompletionOptions, CompletionProvider, ConversationTurn, Role};
use crate::error::{Result, SegueError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-backed completion provider.
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Create a provider whose HTTP client gives up after `timeout`.
    pub fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SegueError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            config = config.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
        })
    }

    fn to_message(turn: &ConversationTurn) -> Result<ChatCompletionRequestMessage> {
        let message = match turn.role {
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(turn.content.clone())
                .build()
                .map_err(|e| SegueError::Provider(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.content.clone())
                .build()
                .map_err(|e| SegueError::Provider(e.to_string()))?
                .into(),
        };
        Ok(message)
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    #[instrument(skip(self, turns), fields(model = %options.model, turns = turns.len()))]
    async fn complete(&self, turns: &[ConversationTurn], options: &CompletionOptions) -> Result<String> {
        let messages = turns
            .iter()
            .map(Self::to_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&options.model)
            .messages(messages)
            .max_completion_tokens(options.max_output_tokens)
            .temperature(options.temperature)
            .build()
            .map_err(|e| SegueError::Provider(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            SegueError::Provider(format!("Failed to generate completion: {}", e))
        })?;

        let text: String = response
            .choices
            .iter()
            .filter_map(|c| c.message.content.as_deref())
            .collect();

        debug!("Received {} characters from OpenAI", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider =
            OpenAIProvider::new("sk-test", Some("http://localhost:9"), Duration::from_secs(5)).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_turns_map_to_messages() {
        let user = OpenAIProvider::to_message(&ConversationTurn::user("hi")).unwrap();
        let assistant = OpenAIProvider::to_message(&ConversationTurn::assistant("{}")).unwrap();
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));
    }
}
