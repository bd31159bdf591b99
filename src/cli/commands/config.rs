//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::{CacheProvider, CompletionTuning, Settings};
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<PathBuf>, settings: Settings) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            let source = if config_path.exists() { "" } else { " (not found, defaults)" };
            println!("# {}{}\n", config_path.display(), source);
            println!("{}", toml_str);

            Output::header("Resolved");
            for (key, value) in resolved(&settings) {
                Output::kv(key, &value);
            }
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Values that are derived rather than written out in the file.
fn resolved(settings: &Settings) -> Vec<(&'static str, String)> {
    let tuning = |t: &CompletionTuning| {
        format!(
            "{} tokens, temperature {}, {} retries",
            t.max_output_tokens, t.temperature, t.retries
        )
    };
    let cache = match settings.cache.provider {
        CacheProvider::Sqlite => settings.sqlite_path().display().to_string(),
        CacheProvider::Memory => "in-memory".to_string(),
        CacheProvider::Disabled => "disabled".to_string(),
    };

    vec![
        ("Provider", format!("{} ({})", settings.provider.kind, settings.provider.model())),
        ("API key variable", settings.provider.api_key_env().to_string()),
        ("Scripts", tuning(&settings.generation.script)),
        ("Style analysis", tuning(&settings.generation.style)),
        ("Cache", cache),
        ("Personal style", settings.personal_style_path().display().to_string()),
    ]
}
