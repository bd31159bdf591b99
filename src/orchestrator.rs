//! Request orchestration for Segue.
//!
//! Resolves story input, consults the generation cache, builds prompts and
//! hands them to the structured completion engine.

use crate::cache::{create_cache_store, CacheKey, CacheStore};
use crate::completion::{CompletionRequest, StructuredCompleter, StructuredOutput};
use crate::config::{CompletionTuning, Prompts, Settings};
use crate::error::{truncate_chars, Result, SegueError};
use crate::extract::{create_extractor, is_url, Extractor};
use crate::provider::{create_provider, CompletionProvider};
use crate::script::{timing_hint, ScriptResult};
use crate::style::{StyleProfile, StyleSelection};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Input to script generation.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    /// Story text, or a URL to extract it from.
    pub story: String,
    pub song_title: String,
    pub artist: String,
    pub style: StyleSelection,
    pub pg_safe: bool,
}

impl ScriptRequest {
    fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("story", &self.story),
            ("song title", &self.song_title),
            ("artist", &self.artist),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SegueError::Validation(format!("Missing {}", missing.join(", "))))
        }
    }
}

/// Input to personal style extraction.
#[derive(Debug, Clone)]
pub struct StyleRequest {
    pub description: String,
    pub samples: Vec<String>,
}

impl StyleRequest {
    /// The non-blank samples, or a validation error.
    fn validated_samples(&self) -> Result<Vec<&str>> {
        if self.description.trim().is_empty() {
            return Err(SegueError::Validation(
                "Please provide a description of your style".to_string(),
            ));
        }

        let samples: Vec<&str> = self
            .samples
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if samples.is_empty() {
            return Err(SegueError::Validation(
                "At least one non-empty script sample is required".to_string(),
            ));
        }
        Ok(samples)
    }
}

/// Scripts plus where they came from.
#[derive(Debug, Clone)]
pub struct GeneratedScripts {
    pub result: ScriptResult,
    pub cache_key: String,
    pub cached: bool,
}

/// Which structured shape a raw prompt should be completed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    Script,
    Style,
}

impl std::str::FromStr for RequestShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "script" => Ok(RequestShape::Script),
            "style" => Ok(RequestShape::Style),
            _ => Err("Invalid mode (use \"script\" or \"style\")".to_string()),
        }
    }
}

/// Coordinates extraction, caching and structured completion.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    completer: StructuredCompleter,
    extractor: Arc<dyn Extractor>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl Orchestrator {
    /// Create an orchestrator from settings, wiring the configured backends.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "Using {} provider with model {}",
            settings.provider.kind,
            settings.provider.model()
        );

        let provider = create_provider(&settings.provider)?;
        let extractor = create_extractor(&settings.extraction)?;
        let cache = create_cache_store(&settings).unwrap_or_else(|e| {
            warn!("Cache unavailable, continuing without caching: {}", e);
            None
        });

        Ok(Self::with_components(settings, prompts, provider, extractor, cache))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        provider: Arc<dyn CompletionProvider>,
        extractor: Arc<dyn Extractor>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        let completer = StructuredCompleter::new(provider, settings.provider.model())
            .with_guard(prompts.guard.clone());

        Self {
            settings,
            prompts,
            completer,
            extractor,
            cache,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Extract article text from a URL.
    pub async fn extract(&self, url: &str) -> Result<String> {
        if !is_url(url) {
            return Err(SegueError::Validation(format!("Invalid URL: {}", url)));
        }
        self.extractor.extract_text(url.trim()).await
    }

    /// Generate three transition scripts for a story and a song.
    #[instrument(skip(self, request), fields(song = %request.song_title, artist = %request.artist, style = request.style.id()))]
    pub async fn generate_scripts(&self, request: &ScriptRequest) -> Result<GeneratedScripts> {
        request.validate()?;

        let cleaned_story = self.resolve_story(&request.story).await?;
        let song_title = request.song_title.trim();
        let artist = request.artist.trim();
        let descriptor = request.style.descriptor()?;

        let cache_key = CacheKey {
            cleaned_story: &cleaned_story,
            song_title,
            artist,
            style_blob: &descriptor,
            pg_safe: request.pg_safe,
        }
        .storage_key(&self.settings.cache.key_prefix)?;

        if let Some(result) = self.cached_scripts(&cache_key).await {
            info!("Cache hit for {}", cache_key);
            return Ok(GeneratedScripts {
                result,
                cache_key,
                cached: true,
            });
        }
        info!("Cache miss for {}", cache_key);

        let instruction = self.script_prompt(&cleaned_story, song_title, artist, request);
        let completion = CompletionRequest::new(instruction).with_tuning(&self.settings.generation.script);
        let result: ScriptResult = self.completer.complete_structured(&completion).await?;

        self.store_scripts(&cache_key, &result).await;

        Ok(GeneratedScripts {
            result,
            cache_key,
            cached: false,
        })
    }

    /// Derive a personal style profile from writing samples.
    #[instrument(skip(self, request), fields(samples = request.samples.len()))]
    pub async fn create_style_profile(&self, request: &StyleRequest) -> Result<StyleProfile> {
        let samples = request.validated_samples()?;

        let mut vars = HashMap::new();
        vars.insert("description".to_string(), request.description.trim().to_string());
        vars.insert(
            "samples".to_string(),
            samples.join(&self.prompts.style.sample_separator),
        );
        let instruction = self.prompts.render_with_custom(&self.prompts.style.user, &vars);

        let completion = CompletionRequest::new(instruction).with_tuning(&self.settings.generation.style);
        let profile: StyleProfile = self.completer.complete_structured(&completion).await?;

        info!(
            "Created style profile with {} characteristics",
            profile.key_characteristics.len()
        );
        Ok(profile)
    }

    /// Complete a caller-built prompt into the given shape.
    pub async fn complete_prompt(&self, shape: RequestShape, prompt: &str) -> Result<Value> {
        if prompt.trim().is_empty() {
            return Err(SegueError::Validation("Missing prompt".to_string()));
        }

        match shape {
            RequestShape::Script => {
                self.complete_shape::<ScriptResult>(prompt, &self.settings.generation.script)
                    .await
            }
            RequestShape::Style => {
                self.complete_shape::<StyleProfile>(prompt, &self.settings.generation.style)
                    .await
            }
        }
    }

    async fn complete_shape<T: StructuredOutput>(&self, prompt: &str, tuning: &CompletionTuning) -> Result<Value> {
        let request = CompletionRequest::new(prompt).with_tuning(tuning);
        self.completer
            .complete_with_schema(&request, &T::schema(), &T::example_shape())
            .await
    }

    /// Story text to embed: extracted and capped when the input is a URL.
    async fn resolve_story(&self, story: &str) -> Result<String> {
        let story = story.trim();
        if !is_url(story) {
            return Ok(story.to_string());
        }

        let text = self.extractor.extract_text(story).await?;
        let text = truncate_chars(text.trim(), self.settings.extraction.max_chars);
        info!("Extracted {} characters from {}", text.chars().count(), story);

        if text.is_empty() {
            return Err(SegueError::Validation(format!(
                "No article text could be extracted from {}",
                story
            )));
        }
        Ok(text)
    }

    /// A usable cached result. Read failures and corrupt entries count as misses.
    async fn cached_scripts(&self, key: &str) -> Option<ScriptResult> {
        let cache = self.cache.as_ref()?;

        let raw = match cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed, treating as miss: {}", e);
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                return None;
            }
        };

        if let Some(issues) = ScriptResult::schema().validate(&value).describe() {
            warn!("Ignoring invalid cache entry {}: {}", key, issues);
            return None;
        }

        serde_json::from_value(value).ok()
    }

    async fn store_scripts(&self, key: &str, result: &ScriptResult) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let serialized = match serde_json::to_string(result) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize scripts for cache: {}", e);
                return;
            }
        };

        if let Err(e) = cache.set(key, &serialized).await {
            warn!("Cache write failed, continuing without caching: {}", e);
        }
    }

    fn script_prompt(&self, story: &str, song_title: &str, artist: &str, request: &ScriptRequest) -> String {
        let script = &self.prompts.script;

        let mut vars = HashMap::new();
        vars.insert("story".to_string(), story.to_string());
        vars.insert("song_title".to_string(), song_title.to_string());
        vars.insert("artist".to_string(), artist.to_string());
        vars.insert("style_id".to_string(), request.style.id().to_string());
        vars.insert("style_instructions".to_string(), request.style.instructions(&self.prompts));
        vars.insert(
            "safety".to_string(),
            if request.pg_safe { script.safety.clone() } else { String::new() },
        );
        vars.insert("timing".to_string(), timing_hint(&script.timing_header));

        self.prompts.render_with_custom(&script.user, &vars)
    }
}
