//! Doctor command - verify configuration, credentials and storage.

use crate::cache::create_cache_store;
use crate::cli::Output;
use crate::config::{CacheProvider, ExtractionMode, Settings};
use crate::extract::is_url;
use crate::style::PersonalStyle;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(config_path: &Path, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Segue Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section("Provider", vec![check_api_key(settings)]);
    section("Extraction", vec![check_extraction(settings)]);
    section("Storage", check_storage(settings).await);
    section("Configuration", vec![check_config_file(config_path)]);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Segue.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Segue is ready to use.");
    }

    Ok(())
}

/// Check that the configured provider has an API key.
fn check_api_key(settings: &Settings) -> CheckResult {
    let var = settings.provider.api_key_env();
    let label = format!("{} ({}, {})", var, settings.provider.kind, settings.provider.model());

    match std::env::var(var) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(
            &label,
            "empty",
            &format!("Set with: export {}='...'", var),
        ),
        Ok(key) => CheckResult::ok(&label, &format!("configured ({})", mask_key(&key))),
        Err(_) => CheckResult::error(
            &label,
            "not set",
            &format!("Set with: export {}='...'", var),
        ),
    }
}

fn check_extraction(settings: &Settings) -> CheckResult {
    match (settings.extraction.mode, settings.extraction.service_url.as_deref()) {
        (ExtractionMode::Direct, _) => CheckResult::ok("Extraction", "direct fetch"),
        (ExtractionMode::Service, Some(url)) if is_url(url) => {
            CheckResult::ok("Extraction", &format!("service at {}", url))
        }
        (ExtractionMode::Service, _) => CheckResult::error(
            "Extraction",
            "service mode without a valid service_url",
            "Set extraction.service_url or use mode = \"direct\"",
        ),
    }
}

async fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    match settings.cache.provider {
        CacheProvider::Disabled => results.push(CheckResult::warning(
            "Cache",
            "disabled",
            "Every request will call the provider",
        )),
        _ => {
            let store = create_cache_store(settings);
            let count = match store {
                Ok(Some(store)) => store.len().await.map(Some),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };
            match count {
                Ok(Some(n)) => results.push(CheckResult::ok("Cache", &format!("{} entries", n))),
                Ok(None) => {}
                Err(e) => results.push(CheckResult::error(
                    "Cache",
                    &e.to_string(),
                    "Check cache.sqlite_path or set cache.provider = \"memory\"",
                )),
            }
        }
    }

    match PersonalStyle::load(&settings.personal_style_path()) {
        Ok(Some(personal)) => results.push(CheckResult::ok(
            "Personal style",
            &format!("created {}", personal.created_at.format("%Y-%m-%d")),
        )),
        Ok(None) => results.push(CheckResult::ok("Personal style", "none")),
        Err(e) => results.push(CheckResult::warning(
            "Personal style",
            &format!("unreadable: {}", e),
            "Recreate with: segue style clear && segue style create",
        )),
    }

    results
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: segue config edit",
        )
    }
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdefghijklmnop"), "sk-a...mnop");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_service_mode_requires_url() {
        let mut settings = Settings::default();
        settings.extraction.mode = ExtractionMode::Service;
        assert_eq!(check_extraction(&settings).status, CheckStatus::Error);

        settings.extraction.service_url = Some("https://extract.example.com/api".to_string());
        assert_eq!(check_extraction(&settings).status, CheckStatus::Ok);
    }
}
