//! Configuration module for Segue.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GuardPrompts, Prompts, ScriptPrompts, StylePrompts};
pub use settings::{
    CacheProvider, CacheSettings, CompletionTuning, ExtractionMode, ExtractionSettings,
    GeneralSettings, GenerationSettings, PromptSettings, ProviderKind, ProviderSettings, Settings,
};
