//! Configuration settings for Segue.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub generation: GenerationSettings,
    pub extraction: ExtractionSettings,
    pub cache: CacheSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (cache, personal style).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.segue".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Completion provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions.
    #[default]
    OpenAI,
    /// Anthropic Messages API.
    Anthropic,
}

impl ProviderKind {
    /// Environment variable holding the API key for this provider.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            _ => Err(format!("Unknown completion provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider backend (openai, anthropic).
    pub kind: ProviderKind,
    /// Model name. Empty means the provider's default.
    pub model: String,
    /// Timeout for a single provider call, in seconds.
    pub timeout_secs: u64,
    /// Environment variable holding the API key. Empty means the provider's default.
    pub api_key_env: String,
    /// Override for the API base URL.
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAI,
            model: String::new(),
            timeout_secs: 120,
            api_key_env: String::new(),
            base_url: None,
        }
    }
}

impl ProviderSettings {
    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.kind.default_model()
        } else {
            &self.model
        }
    }

    pub fn api_key_env(&self) -> &str {
        if self.api_key_env.is_empty() {
            self.kind.default_api_key_env()
        } else {
            &self.api_key_env
        }
    }
}

/// Sampling parameters and retry budget for one kind of structured request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompletionTuning {
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Number of repair retries after the first attempt.
    pub retries: u32,
}

/// Generation settings per request shape.
///
/// Keys missing from a `[generation.script]` or `[generation.style]` table
/// keep that shape's own default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PartialGeneration")]
pub struct GenerationSettings {
    pub script: CompletionTuning,
    pub style: CompletionTuning,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialTuning {
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
    retries: Option<u32>,
}

impl PartialTuning {
    fn or(self, base: CompletionTuning) -> CompletionTuning {
        CompletionTuning {
            max_output_tokens: self.max_output_tokens.unwrap_or(base.max_output_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
            retries: self.retries.unwrap_or(base.retries),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialGeneration {
    script: PartialTuning,
    style: PartialTuning,
}

impl From<PartialGeneration> for GenerationSettings {
    fn from(partial: PartialGeneration) -> Self {
        let defaults = GenerationSettings::default();
        Self {
            script: partial.script.or(defaults.script),
            style: partial.style.or(defaults.style),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            script: CompletionTuning {
                max_output_tokens: 1600,
                temperature: 0.7,
                retries: 2,
            },
            style: CompletionTuning {
                max_output_tokens: 1200,
                temperature: 0.5,
                retries: 2,
            },
        }
    }
}

/// How story URLs are turned into text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Fetch the page and extract readable text locally.
    #[default]
    Direct,
    /// Delegate to a remote extraction service.
    Service,
}

/// Article extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub mode: ExtractionMode,
    /// Endpoint accepting `{"url": ...}` and returning `{"text": ...}` (service mode).
    pub service_url: Option<String>,
    /// User agent sent when fetching pages directly.
    pub user_agent: String,
    /// Maximum characters of extracted text embedded in a prompt.
    pub max_chars: usize,
    pub timeout_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Direct,
            service_url: None,
            user_agent: "Mozilla/5.0".to_string(),
            max_chars: 8000,
            timeout_secs: 30,
        }
    }
}

/// Cache backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    #[default]
    Sqlite,
    Memory,
    Disabled,
}

/// Generation cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache provider (sqlite, memory, disabled).
    pub provider: CacheProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Prefix prepended to every stored key.
    pub key_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            provider: CacheProvider::Sqlite,
            sqlite_path: "~/.segue/cache.db".to_string(),
            key_prefix: "qs_".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SegueError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("segue")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite cache path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.cache.sqlite_path)
    }

    /// Location of the saved personal style.
    pub fn personal_style_path(&self) -> PathBuf {
        self.data_dir().join("personal_style.json")
    }
}
