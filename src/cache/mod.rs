//! Generation cache abstraction for Segue.
//!
//! Results are keyed by a content hash of every input that affects the
//! prompt, so identical requests skip the provider entirely. Entries are
//! never evicted.

mod memory;
mod sqlite;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

use crate::config::{CacheProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Trait for key-value cache backends.
///
/// Writes for one key always carry equivalent content, so concurrent writers
/// are harmless.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a stored value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Number of stored entries.
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Inputs that determine a script generation, in hashing order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey<'a> {
    pub cleaned_story: &'a str,
    pub song_title: &'a str,
    pub artist: &'a str,
    pub style_blob: &'a str,
    pub pg_safe: bool,
}

impl CacheKey<'_> {
    /// Hex SHA-256 of the JSON serialization.
    pub fn digest(&self) -> Result<String> {
        let serialized = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Storage key: `prefix` followed by the digest.
    pub fn storage_key(&self, prefix: &str) -> Result<String> {
        Ok(format!("{}{}", prefix, self.digest()?))
    }
}

/// Build the cache configured in settings; `None` when caching is disabled.
pub fn create_cache_store(settings: &Settings) -> Result<Option<Arc<dyn CacheStore>>> {
    let store: Option<Arc<dyn CacheStore>> = match settings.cache.provider {
        CacheProvider::Sqlite => Some(Arc::new(SqliteCacheStore::new(&settings.sqlite_path())?)),
        CacheProvider::Memory => Some(Arc::new(MemoryCacheStore::new())),
        CacheProvider::Disabled => None,
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pg_safe: bool) -> CacheKey<'static> {
        CacheKey {
            cleaned_story: "Local bakery donates 1000 loaves",
            song_title: "Here Comes the Sun",
            artist: "The Beatles",
            style_blob: "touching",
            pg_safe,
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = key(true).digest().unwrap();
        let b = key(true).digest().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_pg_safe_changes_digest() {
        assert_ne!(key(true).digest().unwrap(), key(false).digest().unwrap());
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let a = CacheKey {
            song_title: "ab",
            artist: "c",
            ..key(true)
        };
        let b = CacheKey {
            song_title: "a",
            artist: "bc",
            ..key(true)
        };
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn test_storage_key_prefix() {
        let k = key(true).storage_key("qs_").unwrap();
        assert!(k.starts_with("qs_"));
        assert_eq!(k.len(), 67);
    }
}
