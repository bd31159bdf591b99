//! Cache command implementation.

use crate::cache::create_cache_store;
use crate::cli::{CacheAction, Output};
use crate::config::{CacheProvider, Settings};
use anyhow::Result;

/// Run a cache subcommand.
pub async fn run_cache(action: &CacheAction, settings: Settings) -> Result<()> {
    match action {
        CacheAction::Stats => {
            Output::header("Generation cache");
            Output::kv("Provider", &format!("{:?}", settings.cache.provider).to_lowercase());
            Output::kv("Key prefix", &settings.cache.key_prefix);

            match settings.cache.provider {
                CacheProvider::Sqlite => {
                    Output::kv("Location", &settings.sqlite_path().display().to_string());
                }
                CacheProvider::Memory => {
                    Output::kv("Location", "in-memory (cleared on exit)");
                }
                CacheProvider::Disabled => {
                    Output::info("Caching is disabled.");
                    return Ok(());
                }
            }

            if let Some(store) = create_cache_store(&settings)? {
                Output::kv("Entries", &store.len().await?.to_string());
            }
        }
    }

    Ok(())
}
