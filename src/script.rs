//! Transition script results and timing targets.

use crate::completion::StructuredOutput;
use crate::schema::{FieldType, Length, Schema};
use serde::{Deserialize, Serialize};

/// Number of scripts in every result.
pub const SCRIPT_COUNT: usize = 3;

/// One generated transition script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptEntry {
    pub script: String,
    pub delivery_notes: String,
}

/// Structured output of script generation.
///
/// `scripts` holds exactly three entries ordered long, medium, short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScriptResult {
    pub story_details: String,
    pub song_analysis: String,
    pub why_this_works: String,
    pub scripts: Vec<ScriptEntry>,
}

impl ScriptResult {
    /// Pair each script with its timing slot by position.
    pub fn labelled(&self) -> impl Iterator<Item = (ScriptSlot, &ScriptEntry)> {
        ScriptSlot::ALL.into_iter().zip(self.scripts.iter())
    }
}

impl StructuredOutput for ScriptResult {
    fn schema() -> Schema {
        let entry = Schema::object()
            .field("script", FieldType::non_empty_text())
            .field("deliveryNotes", FieldType::non_empty_text());

        Schema::object()
            .field("storyDetails", FieldType::non_empty_text())
            .field("songAnalysis", FieldType::non_empty_text())
            .field("whyThisWorks", FieldType::non_empty_text())
            .field(
                "scripts",
                FieldType::list(FieldType::Object(entry), Length::Exactly(SCRIPT_COUNT)),
            )
    }
}

/// Timing slot of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSlot {
    Long,
    Medium,
    Short,
}

/// Inclusive word-count range for a slot. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordTarget {
    pub min: u32,
    pub max: u32,
}

impl ScriptSlot {
    pub const ALL: [ScriptSlot; SCRIPT_COUNT] = [ScriptSlot::Long, ScriptSlot::Medium, ScriptSlot::Short];

    // Radio read speed is roughly 2.5-3 words per second.
    pub fn word_target(&self) -> WordTarget {
        match self {
            ScriptSlot::Long => WordTarget { min: 60, max: 75 },
            ScriptSlot::Medium => WordTarget { min: 30, max: 40 },
            ScriptSlot::Short => WordTarget { min: 18, max: 28 },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScriptSlot::Long => "long",
            ScriptSlot::Medium => "medium",
            ScriptSlot::Short => "short",
        }
    }
}

impl std::fmt::Display for ScriptSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Word-count hint block embedded in the script prompt.
pub fn timing_hint(header: &str) -> String {
    let mut hint = header.to_string();
    for (idx, slot) in ScriptSlot::ALL.iter().enumerate() {
        let target = slot.word_target();
        hint.push_str(&format!(
            "\n- Script {} ({}): {}-{} words",
            idx + 1,
            slot,
            target.min,
            target.max
        ));
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_example_shape_matches_wire_format() {
        let example = ScriptResult::example_shape();
        let keys: Vec<&String> = example.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["storyDetails", "songAnalysis", "whyThisWorks", "scripts"]);
        assert_eq!(example["scripts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_serde_round_trip_uses_camel_case() {
        let value = json!({
            "storyDetails": "a",
            "songAnalysis": "b",
            "whyThisWorks": "c",
            "scripts": [
                {"script": "1", "deliveryNotes": "n"},
                {"script": "2", "deliveryNotes": "n"},
                {"script": "3", "deliveryNotes": "n"}
            ]
        });
        let result: ScriptResult = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(result.why_this_works, "c");
        assert_eq!(serde_json::to_value(&result).unwrap(), value);
    }

    #[test]
    fn test_labels_follow_position() {
        let result = ScriptResult {
            story_details: "a".into(),
            song_analysis: "b".into(),
            why_this_works: "c".into(),
            scripts: (0..3)
                .map(|i| ScriptEntry {
                    script: format!("s{}", i),
                    delivery_notes: "n".into(),
                })
                .collect(),
        };

        let labels: Vec<_> = result.labelled().map(|(slot, e)| (slot, e.script.as_str())).collect();
        assert_eq!(
            labels,
            [(ScriptSlot::Long, "s0"), (ScriptSlot::Medium, "s1"), (ScriptSlot::Short, "s2")]
        );
    }

    #[test]
    fn test_timing_hint() {
        let hint = timing_hint("Targets:");
        assert_eq!(
            hint,
            "Targets:\n- Script 1 (long): 60-75 words\n- Script 2 (medium): 30-40 words\n- Script 3 (short): 18-28 words"
        );
    }
}
