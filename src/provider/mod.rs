//! Text-completion providers.
//!
//! The structured completion engine only needs a function from an ordered
//! conversation to response text; each backend implements [`CompletionProvider`].

mod anthropic;
#[cfg(test)]
pub(crate) mod mock;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{Result, SegueError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation owned by a single in-flight completion.
///
/// Extending returns a new value; the original is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Start a conversation with a single user turn.
    pub fn opening(content: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::user(content)],
        }
    }

    /// A new conversation with `extra` appended after the existing turns.
    pub fn extended<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = ConversationTurn>,
    {
        let mut turns = self.turns.clone();
        turns.extend(extra);
        Self { turns }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Trait for text-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the conversation and return all response text concatenated.
    ///
    /// Transport and auth failures are reported as [`SegueError::Provider`].
    async fn complete(&self, turns: &[ConversationTurn], options: &CompletionOptions) -> Result<String>;

    /// Human-readable backend name.
    fn name(&self) -> &str;
}

/// Build the provider configured in settings.
pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn CompletionProvider>> {
    let api_key = std::env::var(settings.api_key_env()).map_err(|_| {
        SegueError::Config(format!("{} not set", settings.api_key_env()))
    })?;
    let timeout = std::time::Duration::from_secs(settings.timeout_secs);

    let provider: Arc<dyn CompletionProvider> = match settings.kind {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(
            &api_key,
            settings.base_url.as_deref(),
            timeout,
        )?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            &api_key,
            settings.base_url.as_deref(),
            timeout,
        )?),
    };
    Ok(provider)
}
