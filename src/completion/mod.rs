//! Structured completion: forcing free-text model output into a validated shape.
//!
//! The engine opens a conversation with a JSON guard plus the instruction,
//! then parses and validates each reply. Failed replies are fed back with the
//! validation diagnostic until the output conforms or the retry budget runs out.

mod engine;
mod parse;

pub use engine::StructuredCompleter;
pub use parse::{parse_structured, strip_fences};

use crate::schema::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parameters of one structured completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub instruction: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Retries after the first attempt; total attempts are `retry_budget + 1`.
    pub retry_budget: u32,
}

impl CompletionRequest {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            max_output_tokens: 1400,
            temperature: 0.7,
            retry_budget: 2,
        }
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_retry_budget(mut self, retries: u32) -> Self {
        self.retry_budget = retries;
        self
    }

    pub fn with_tuning(self, tuning: &crate::config::CompletionTuning) -> Self {
        self.with_max_output_tokens(tuning.max_output_tokens)
            .with_temperature(tuning.temperature)
            .with_retry_budget(tuning.retries)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry_budget.saturating_add(1)
    }
}

/// A result type the engine can produce.
pub trait StructuredOutput: Serialize + DeserializeOwned + Send {
    /// Schema the parsed JSON must satisfy.
    fn schema() -> Schema;

    /// Literal example shown to the model.
    fn example_shape() -> serde_json::Value {
        Self::schema().example()
    }
}
