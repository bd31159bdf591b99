//! Script styles: predefined tones and personal style profiles.

use crate::completion::StructuredOutput;
use crate::config::ScriptPrompts;
use crate::config::Prompts;
use crate::error::{Result, SegueError};
use crate::schema::{FieldType, Length, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Identifier selecting the saved personal style.
pub const PERSONAL_STYLE_ID: &str = "personal";

/// Predefined script tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStyle {
    #[default]
    Conversational,
    Humorous,
    Touching,
    Inspiring,
    Dramatic,
    Reflective,
}

impl ScriptStyle {
    pub const ALL: [ScriptStyle; 6] = [
        ScriptStyle::Conversational,
        ScriptStyle::Humorous,
        ScriptStyle::Touching,
        ScriptStyle::Inspiring,
        ScriptStyle::Dramatic,
        ScriptStyle::Reflective,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ScriptStyle::Conversational => "conversational",
            ScriptStyle::Humorous => "humorous",
            ScriptStyle::Touching => "touching",
            ScriptStyle::Inspiring => "inspiring",
            ScriptStyle::Dramatic => "dramatic",
            ScriptStyle::Reflective => "reflective",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptStyle::Conversational => "Conversational",
            ScriptStyle::Humorous => "Humorous",
            ScriptStyle::Touching => "Touching",
            ScriptStyle::Inspiring => "Inspiring",
            ScriptStyle::Dramatic => "Dramatic",
            ScriptStyle::Reflective => "Reflective",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScriptStyle::Conversational => "Natural, friendly, relatable",
            ScriptStyle::Humorous => "Light, witty, entertaining",
            ScriptStyle::Touching => "Emotional, heartfelt, moving",
            ScriptStyle::Inspiring => "Uplifting, motivational",
            ScriptStyle::Dramatic => "Bold, impactful storytelling",
            ScriptStyle::Reflective => "Thoughtful, contemplative",
        }
    }
}

impl std::str::FromStr for ScriptStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        ScriptStyle::ALL
            .into_iter()
            .find(|style| style.id() == id)
            .ok_or_else(|| format!("Unknown script style: {}", s))
    }
}

impl std::fmt::Display for ScriptStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Structured analysis of a DJ's writing voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleProfile {
    pub style_profile: String,
    pub key_characteristics: Vec<String>,
    pub sample_phrases: Vec<String>,
    pub instructions: String,
}

impl StructuredOutput for StyleProfile {
    fn schema() -> Schema {
        Schema::object()
            .field("styleProfile", FieldType::non_empty_text())
            .field(
                "keyCharacteristics",
                FieldType::list(FieldType::text(), Length::AtLeast(1)),
            )
            .field(
                "samplePhrases",
                FieldType::list(FieldType::text(), Length::AtLeast(1)),
            )
            .field("instructions", FieldType::non_empty_text())
    }
}

/// A saved personal style: the user's own description plus the derived profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStyle {
    pub description: String,
    pub profile: StyleProfile,
    pub created_at: DateTime<Utc>,
}

impl PersonalStyle {
    pub fn new(description: impl Into<String>, profile: StyleProfile) -> Self {
        Self {
            description: description.into(),
            profile,
            created_at: Utc::now(),
        }
    }

    /// Load a saved personal style, if one exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved personal style to {:?}", path);
        Ok(())
    }

    /// Remove a saved personal style. Returns whether one existed.
    pub fn clear(path: &Path) -> Result<bool> {
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// The style a script request is written in.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleSelection {
    Preset(ScriptStyle),
    Personal(StyleProfile),
}

impl Default for StyleSelection {
    fn default() -> Self {
        StyleSelection::Preset(ScriptStyle::default())
    }
}

impl StyleSelection {
    /// Resolve a style id; `personal` requires an active profile.
    pub fn resolve(id: &str, personal: Option<&StyleProfile>) -> Result<Self> {
        if id.trim().eq_ignore_ascii_case(PERSONAL_STYLE_ID) {
            return personal
                .cloned()
                .map(StyleSelection::Personal)
                .ok_or_else(|| {
                    SegueError::Validation("No personal style has been created yet".to_string())
                });
        }
        id.parse::<ScriptStyle>()
            .map(StyleSelection::Preset)
            .map_err(SegueError::Validation)
    }

    /// Resolve a style id, reading the saved personal style at `saved` only
    /// when `personal` is requested and no inline profile was given.
    pub fn resolve_saved(id: &str, inline: Option<StyleProfile>, saved: &Path) -> Result<Self> {
        if id.trim().is_empty() {
            return Ok(StyleSelection::default());
        }
        if !id.trim().eq_ignore_ascii_case(PERSONAL_STYLE_ID) {
            return Self::resolve(id, None);
        }

        let profile = match inline {
            Some(profile) => Some(profile),
            None => PersonalStyle::load(saved)?.map(|p| p.profile),
        };
        Self::resolve(id, profile.as_ref())
    }

    pub fn id(&self) -> &str {
        match self {
            StyleSelection::Preset(style) => style.id(),
            StyleSelection::Personal(_) => PERSONAL_STYLE_ID,
        }
    }

    /// Cache-relevant representation: the preset id, or the serialized profile
    /// so that editing the profile invalidates earlier entries.
    pub fn descriptor(&self) -> Result<String> {
        match self {
            StyleSelection::Preset(style) => Ok(style.id().to_string()),
            StyleSelection::Personal(profile) => Ok(serde_json::to_string(profile)?),
        }
    }

    /// Style instruction text embedded in the script prompt.
    pub fn instructions(&self, prompts: &Prompts) -> String {
        let templates: &ScriptPrompts = &prompts.script;
        let mut vars = HashMap::new();
        match self {
            StyleSelection::Preset(style) => {
                vars.insert("style_id".to_string(), style.id().to_string());
                prompts.render_with_custom(&templates.preset_style, &vars)
            }
            StyleSelection::Personal(profile) => {
                vars.insert("style_profile".to_string(), profile.style_profile.clone());
                vars.insert(
                    "key_characteristics".to_string(),
                    profile.key_characteristics.join(", "),
                );
                vars.insert("sample_phrases".to_string(), profile.sample_phrases.join(", "));
                vars.insert("instructions".to_string(), profile.instructions.clone());
                prompts.render_with_custom(&templates.personal_style, &vars)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StyleProfile {
        StyleProfile {
            style_profile: "Warm and punchy".to_string(),
            key_characteristics: vec!["short sentences".to_string(), "puns".to_string()],
            sample_phrases: vec!["Let's roll".to_string()],
            instructions: "Keep it tight".to_string(),
        }
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("Touching".parse::<ScriptStyle>().unwrap(), ScriptStyle::Touching);
        assert!("jazzy".parse::<ScriptStyle>().is_err());
    }

    #[test]
    fn test_resolve_personal_requires_profile() {
        let err = StyleSelection::resolve("personal", None).unwrap_err();
        assert!(matches!(err, SegueError::Validation(_)));

        let selection = StyleSelection::resolve("personal", Some(&profile())).unwrap();
        assert_eq!(selection.id(), "personal");
    }

    #[test]
    fn test_presets_never_read_saved_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personal_style.json");
        std::fs::write(&path, "{ not json").unwrap();

        let selection = StyleSelection::resolve_saved("touching", None, &path).unwrap();
        assert_eq!(selection, StyleSelection::Preset(ScriptStyle::Touching));
        assert_eq!(
            StyleSelection::resolve_saved("  ", None, &path).unwrap(),
            StyleSelection::default()
        );

        assert!(StyleSelection::resolve_saved("personal", None, &path).is_err());
        let inline = StyleSelection::resolve_saved("Personal", Some(profile()), &path).unwrap();
        assert_eq!(inline, StyleSelection::Personal(profile()));
    }

    #[test]
    fn test_resolve_saved_personal_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personal_style.json");
        PersonalStyle::new("Chill", profile()).save(&path).unwrap();

        let selection = StyleSelection::resolve_saved("personal", None, &path).unwrap();
        assert_eq!(selection, StyleSelection::Personal(profile()));
    }

    #[test]
    fn test_descriptor() {
        let preset = StyleSelection::Preset(ScriptStyle::Dramatic);
        assert_eq!(preset.descriptor().unwrap(), "dramatic");

        let personal = StyleSelection::Personal(profile());
        let descriptor = personal.descriptor().unwrap();
        assert!(descriptor.starts_with("{\"styleProfile\":\"Warm and punchy\""));

        let mut edited = profile();
        edited.instructions = "Loosen up".to_string();
        assert_ne!(StyleSelection::Personal(edited).descriptor().unwrap(), descriptor);
    }

    #[test]
    fn test_instructions() {
        let prompts = Prompts::default();
        assert_eq!(
            StyleSelection::Preset(ScriptStyle::Humorous).instructions(&prompts),
            "Write in a humorous style."
        );

        let block = StyleSelection::Personal(profile()).instructions(&prompts);
        assert!(block.contains("PERSONAL STYLE PROFILE: Warm and punchy"));
        assert!(block.contains("KEY CHARACTERISTICS: short sentences, puns"));
        assert!(block.contains("SAMPLE PHRASES: Let's roll"));
        assert!(block.contains("REPLICATION INSTRUCTIONS: Keep it tight"));
        assert!(block.contains("voice, word choices, rhythm"));
    }

    #[test]
    fn test_personal_style_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("personal_style.json");

        assert!(PersonalStyle::load(&path).unwrap().is_none());

        let style = PersonalStyle::new("Morning drive energy", profile());
        style.save(&path).unwrap();

        let loaded = PersonalStyle::load(&path).unwrap().unwrap();
        assert_eq!(loaded, style);

        assert!(PersonalStyle::clear(&path).unwrap());
        assert!(!PersonalStyle::clear(&path).unwrap());
    }
}
