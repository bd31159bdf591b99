//! Prompt templates for Segue.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    /// Prompts wrapping every structured completion.
    pub guard: GuardPrompts,
    pub script: ScriptPrompts,
    pub style: StylePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// JSON guard and repair turn used by the structured completion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardPrompts {
    /// Prepended to the instruction text. Variables: `example_shape`.
    pub json_guard: String,
    /// Corrective user turn after a failed attempt. Variables: `error`.
    pub repair: String,
}

impl Default for GuardPrompts {
    fn default() -> Self {
        Self {
            json_guard: r#"You MUST return ONLY valid, parseable JSON with no surrounding text or markdown fences.
Match this shape exactly. Do not add extra keys. Do not include comments.

Example shape:
{{example_shape}}"#
                .to_string(),

            repair: r#"Your previous output failed JSON validation:
{{error}}

Return ONLY valid JSON that matches the required shape."#
                .to_string(),
        }
    }
}

/// Prompts for transition script generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPrompts {
    /// Main instruction. Variables: `story`, `song_title`, `artist`, `style_id`,
    /// `style_instructions`, `safety`, `timing`.
    pub user: String,
    /// Style line for a predefined style. Variables: `style_id`.
    pub preset_style: String,
    /// Style block for a personal style. Variables: `style_profile`,
    /// `key_characteristics`, `sample_phrases`, `instructions`.
    pub personal_style: String,
    /// Included only when PG-safe output is requested.
    pub safety: String,
    /// Header of the word-count target list.
    pub timing_header: String,
}

impl Default for ScriptPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are helping a radio DJ create compelling transition scripts that connect a story to a song.

STORY INPUT (CLEANED TEXT): "{{story}}"
SONG: "{{song_title}}" by {{artist}}
SCRIPT STYLE: {{style_id}}
{{style_instructions}}
{{safety}}

Do the following, in order:
1) Create a brief radio-friendly summary of the story (assume it's current/trending; <= 120 words).
2) Analyze the general themes and emotional core of "{{song_title}}" by {{artist}} without quoting lyrics beyond 10 words.
3) Propose the best single bridging angle that logically links the story to the song for mainstream radio.
4) Generate 3 different transition scripts that connect the story to the song, each matching the specified tone and the word-length targets below. End each with a clean handoff into the song without naming the DJ.
{{timing}}

Return ONLY strict JSON in this format:
{
  "storyDetails": "brief summary",
  "songAnalysis": "themes/emotions",
  "whyThisWorks": "one-sentence rationale PDs would appreciate",
  "scripts": [
    { "script": "first script (long)", "deliveryNotes": "timing/delivery guidance" },
    { "script": "second script (medium)", "deliveryNotes": "timing/delivery guidance" },
    { "script": "third script (short)", "deliveryNotes": "timing/delivery guidance" }
  ]
}"#
            .to_string(),

            preset_style: "Write in a {{style_id}} style.".to_string(),

            personal_style: r#"PERSONAL STYLE PROFILE: {{style_profile}}
KEY CHARACTERISTICS: {{key_characteristics}}
SAMPLE PHRASES: {{sample_phrases}}
REPLICATION INSTRUCTIONS: {{instructions}}
Use this personal style to match the DJ's unique voice, word choices, rhythm, and approach."#
                .to_string(),

            safety: "Content safety: Keep humor clean (PG-safe). Avoid profanity or sensitive topics unless directly provided in input.".to_string(),

            timing_header: "Timing & word-count targets (approx):".to_string(),
        }
    }
}

/// Prompts for personal style extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePrompts {
    /// Variables: `description`, `samples`.
    pub user: String,
    /// Placed between joined script samples.
    pub sample_separator: String,
}

impl Default for StylePrompts {
    fn default() -> Self {
        Self {
            user: r#"Analyze these script samples from a radio DJ to create a personalized style profile:

USER'S STYLE DESCRIPTION: "{{description}}"

SCRIPT SAMPLES:
{{samples}}

Respond with JSON:
{
  "styleProfile": "Detailed analysis of the DJ's writing style, voice, and approach",
  "keyCharacteristics": ["list", "of", "specific", "style", "traits"],
  "samplePhrases": ["example phrases", "that capture their voice"],
  "instructions": "Specific guidance for replicating this style in new scripts"
}"#
            .to_string(),

            sample_separator: "\n\n---\n\n".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let guard_path = custom_path.join("guard.toml");
            if guard_path.exists() {
                let content = std::fs::read_to_string(&guard_path)?;
                prompts.guard = toml::from_str(&content)?;
            }

            let script_path = custom_path.join("script.toml");
            if script_path.exists() {
                let content = std::fs::read_to_string(&script_path)?;
                prompts.script = toml::from_str(&content)?;
            }

            let style_path = custom_path.join("style.toml");
            if style_path.exists() {
                let content = std::fs::read_to_string(&style_path)?;
                prompts.style = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is single-pass, so values containing `{{...}}` are left as-is.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.guard.json_guard.contains("{{example_shape}}"));
        assert!(prompts.guard.repair.contains("{{error}}"));
        assert!(prompts.script.user.contains("{{timing}}"));
        assert!(!prompts.style.user.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("story".to_string(), "Use {{artist}} here".to_string());
        vars.insert("artist".to_string(), "The Beatles".to_string());

        let result = Prompts::render("{{story}} / {{missing}}", &vars);
        assert_eq!(result, "Use {{artist}} here / {{missing}}");
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_vars() {
        let mut custom = HashMap::new();
        custom.insert("station".to_string(), "KXRP".to_string());
        custom.insert("artist".to_string(), "nobody".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("artist".to_string(), "ABBA".to_string());

        let out = prompts.render_with_custom("{{station}} plays {{artist}}", &vars);
        assert_eq!(out, "KXRP plays ABBA");
    }

    #[test]
    fn test_load_custom_dir_overrides_script_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("script.toml"),
            "preset_style = \"Go {{style_id}}.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.script.preset_style, "Go {{style_id}}.");
        // Fields missing from the file keep their defaults
        assert!(prompts.script.user.contains("{{story}}"));
    }
}
