//! Retry/repair loop around a completion provider.

use super::{parse_structured, CompletionRequest, StructuredOutput};
use crate::config::GuardPrompts;
use crate::config::Prompts;
use crate::error::{truncate_chars, Result, SegueError, MAX_DIAGNOSTIC_CHARS};
use crate::provider::{CompletionOptions, CompletionProvider, Conversation, ConversationTurn};
use crate::schema::Schema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives a provider until its output parses and validates.
pub struct StructuredCompleter {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    guard: GuardPrompts,
}

impl StructuredCompleter {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
            guard: GuardPrompts::default(),
        }
    }

    /// Use custom guard/repair templates.
    pub fn with_guard(mut self, guard: GuardPrompts) -> Self {
        self.guard = guard;
        self
    }

    /// Complete into a typed result.
    pub async fn complete_structured<T: StructuredOutput>(&self, request: &CompletionRequest) -> Result<T> {
        let schema = T::schema();
        let example = T::example_shape();
        self.run(request, &example, |raw| {
            let value = parse_structured(raw, &schema)?;
            serde_json::from_value::<T>(value).map_err(|e| format!("Invalid structure: {}", e))
        })
        .await
    }

    /// Complete against an arbitrary schema, returning the validated JSON.
    pub async fn complete_with_schema(
        &self,
        request: &CompletionRequest,
        schema: &Schema,
        example_shape: &Value,
    ) -> Result<Value> {
        self.run(request, example_shape, |raw| parse_structured(raw, schema))
            .await
    }

    #[instrument(skip_all, fields(provider = self.provider.name(), max_attempts = request.max_attempts()))]
    async fn run<T, F>(&self, request: &CompletionRequest, example_shape: &Value, parse: F) -> Result<T>
    where
        F: Fn(&str) -> std::result::Result<T, String>,
    {
        let options = CompletionOptions {
            model: self.model.clone(),
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };

        let mut conversation = Conversation::opening(self.opening_turn(&request.instruction, example_shape)?);
        let max_attempts = request.max_attempts();
        let mut last_error = String::from("Validation failed");

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, turns = conversation.len(), "Requesting structured completion");

            // Provider failures are not retried here.
            let text = self.provider.complete(conversation.turns(), &options).await?;

            match parse(&text) {
                Ok(value) => {
                    info!(attempt, "Structured completion validated");
                    return Ok(value);
                }
                Err(diagnostic) => {
                    let diagnostic = truncate_chars(&diagnostic, MAX_DIAGNOSTIC_CHARS);
                    warn!(attempt, max_attempts, error = %diagnostic, "Model output failed validation");

                    if attempt < max_attempts {
                        conversation = conversation.extended([
                            ConversationTurn::assistant(text),
                            ConversationTurn::user(self.repair_turn(&diagnostic)),
                        ]);
                    }
                    last_error = diagnostic;
                }
            }
        }

        Err(SegueError::SchemaValidation {
            attempts: max_attempts,
            message: last_error,
        })
    }

    fn opening_turn(&self, instruction: &str, example_shape: &Value) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("example_shape".to_string(), serde_json::to_string_pretty(example_shape)?);
        let guard = Prompts::render(&self.guard.json_guard, &vars);
        Ok(format!("{}\n\n{}", guard, instruction))
    }

    fn repair_turn(&self, diagnostic: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("error".to_string(), diagnostic.to_string());
        Prompts::render(&self.guard.repair, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::ScriptedProvider;
    use crate::provider::Role;
    use crate::script::ScriptResult;
    use serde_json::json;

    fn script_json(count: usize) -> String {
        let scripts: Vec<Value> = (0..count)
            .map(|i| json!({"script": format!("script {}", i), "deliveryNotes": "warm, unhurried"}))
            .collect();
        json!({
            "storyDetails": "A bakery gave away bread.",
            "songAnalysis": "Optimism after hardship.",
            "whyThisWorks": "Both are about new beginnings.",
            "scripts": scripts
        })
        .to_string()
    }

    fn completer(provider: Arc<ScriptedProvider>) -> StructuredCompleter {
        StructuredCompleter::new(provider, "test-model")
    }

    #[tokio::test]
    async fn test_valid_output_needs_one_attempt() {
        let provider = Arc::new(ScriptedProvider::new([script_json(3)]));
        let request = CompletionRequest::new("write scripts");

        let result: ScriptResult = completer(provider.clone())
            .complete_structured(&request)
            .await
            .unwrap();

        assert_eq!(result.scripts.len(), 3);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_fenced_output_is_accepted_first_time() {
        let fenced = format!("```json\n{}\n```", script_json(3));
        let provider = Arc::new(ScriptedProvider::new([fenced]));

        let result: ScriptResult = completer(provider.clone())
            .complete_structured(&CompletionRequest::new("write"))
            .await
            .unwrap();

        assert_eq!(result.story_details, "A bakery gave away bread.");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_opening_turn_carries_guard_and_example() {
        let provider = Arc::new(ScriptedProvider::new([script_json(3)]));
        let _: ScriptResult = completer(provider.clone())
            .complete_structured(&CompletionRequest::new("THE INSTRUCTION"))
            .await
            .unwrap();

        let turns = provider.conversation(0);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert!(turns[0].content.starts_with("You MUST return ONLY valid"));
        assert!(turns[0].content.contains("\"deliveryNotes\": \"string\""));
        assert!(turns[0].content.ends_with("THE INSTRUCTION"));
    }

    #[tokio::test]
    async fn test_missing_field_exhausts_budget() {
        let broken = json!({"storyDetails": "x", "songAnalysis": "y", "scripts": []}).to_string();
        let provider = Arc::new(ScriptedProvider::repeating(broken));
        let request = CompletionRequest::new("write").with_retry_budget(2);

        let err = completer(provider.clone())
            .complete_structured::<ScriptResult>(&request)
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 3);
        match err {
            SegueError::SchemaValidation { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("whyThisWorks: required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repair_turns_grow_conversation() {
        let provider = Arc::new(ScriptedProvider::new([
            "not json at all".to_string(),
            script_json(2),
            script_json(3),
        ]));

        let result: ScriptResult = completer(provider.clone())
            .complete_structured(&CompletionRequest::new("write"))
            .await
            .unwrap();
        assert_eq!(result.scripts.len(), 3);
        assert_eq!(provider.calls(), 3);

        let second = provider.conversation(1);
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Assistant);
        assert_eq!(second[1].content, "not json at all");
        assert!(second[2].content.starts_with("Your previous output failed JSON validation"));
        assert!(second[2].content.contains("Invalid JSON"));

        let third = provider.conversation(2);
        assert_eq!(third.len(), 5);
        assert!(third[4].content.contains("expected exactly 3 item(s), got 2"));
    }

    #[tokio::test]
    async fn test_script_count_must_be_exactly_three() {
        for count in [2, 4] {
            let provider = Arc::new(ScriptedProvider::repeating(script_json(count)));
            let request = CompletionRequest::new("write").with_retry_budget(0);

            let err = completer(provider.clone())
                .complete_structured::<ScriptResult>(&request)
                .await
                .unwrap_err();

            assert!(matches!(err, SegueError::SchemaValidation { attempts: 1, .. }));
            assert_eq!(provider.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_repair_diagnostic_is_truncated() {
        let long_key = "k".repeat(2000);
        let mut bad = serde_json::from_str::<Value>(&script_json(3)).unwrap();
        bad[long_key.as_str()] = json!(1);

        let provider = Arc::new(ScriptedProvider::new([bad.to_string(), script_json(3)]));
        let _: ScriptResult = completer(provider.clone())
            .complete_structured(&CompletionRequest::new("write"))
            .await
            .unwrap();

        let repair = &provider.conversation(1)[2].content;
        let template_len = GuardPrompts::default().repair.replace("{{error}}", "").chars().count();
        assert!(repair.chars().count() <= template_len + MAX_DIAGNOSTIC_CHARS);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::failing("401 unauthorized"));

        let err = completer(provider.clone())
            .complete_structured::<ScriptResult>(&CompletionRequest::new("write"))
            .await
            .unwrap_err();

        assert!(matches!(err, SegueError::Provider(_)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_options_are_forwarded() {
        let provider = Arc::new(ScriptedProvider::new([script_json(3)]));
        let request = CompletionRequest::new("write")
            .with_max_output_tokens(1600)
            .with_temperature(0.7);

        let _: ScriptResult = completer(provider.clone())
            .complete_structured(&request)
            .await
            .unwrap();

        let options = provider.options(0);
        assert_eq!(options.model, "test-model");
        assert_eq!(options.max_output_tokens, 1600);
        assert!((options.temperature - 0.7).abs() < f32::EPSILON);
    }
}
