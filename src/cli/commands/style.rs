//! Personal style commands.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, StyleAction};
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, StyleRequest};
use crate::style::{PersonalStyle, ScriptStyle, StyleProfile, PERSONAL_STYLE_ID};
use anyhow::{Context, Result};

/// Run a style subcommand.
pub async fn run_style(action: &StyleAction, settings: Settings) -> Result<()> {
    let path = settings.personal_style_path();

    match action {
        StyleAction::Create {
            description,
            samples,
        } => {
            preflight::check(Operation::StyleCreate, &settings.provider)?;

            let samples = samples
                .iter()
                .map(|file| {
                    let path = Settings::expand_path(file);
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read sample {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            let request = StyleRequest {
                description: description.clone(),
                samples,
            };

            let orchestrator = Orchestrator::new(settings)?;
            let spinner = Output::spinner("Analyzing your style...");
            let outcome = orchestrator.create_style_profile(&request).await;
            spinner.finish_and_clear();

            let profile = outcome.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let personal = PersonalStyle::new(description.trim(), profile);
            personal.save(&path)?;

            print_profile(&personal.profile);
            println!();
            Output::success(&format!("Personal style saved to {}", path.display()));
            Output::info("Use it with: segue generate --style personal ...");
        }

        StyleAction::List => {
            Output::header("Styles");
            for style in ScriptStyle::ALL {
                Output::list_item(&style_line(style));
            }
            let personal = if path.exists() { "saved" } else { "not created" };
            Output::list_item(&format!("{} - your own voice ({})", PERSONAL_STYLE_ID, personal));
        }

        StyleAction::Show => match PersonalStyle::load(&path)? {
            Some(personal) => {
                Output::kv("Description", &personal.description);
                Output::kv("Created", &personal.created_at.format("%Y-%m-%d %H:%M").to_string());
                print_profile(&personal.profile);
            }
            None => Output::info("No personal style yet. Create one with: segue style create"),
        },

        StyleAction::Clear => {
            if PersonalStyle::clear(&path)? {
                Output::success("Personal style removed.");
            } else {
                Output::info("No personal style to remove.");
            }
        }
    }

    Ok(())
}

fn print_profile(profile: &StyleProfile) {
    Output::header("Style profile");
    println!("  {}", profile.style_profile);

    Output::header("Key characteristics");
    for item in &profile.key_characteristics {
        Output::list_item(item);
    }

    Output::header("Sample phrases");
    for phrase in &profile.sample_phrases {
        Output::list_item(phrase);
    }

    Output::header("Instructions");
    println!("  {}", profile.instructions);
}

fn style_line(style: ScriptStyle) -> String {
    format!("{} - {}: {}", style.id(), style.name(), style.description())
}
