//! Article extraction: turning a story URL into plain text.

mod html;
mod service;

pub use html::{readable_text, HtmlExtractor};
pub use service::ServiceExtractor;

use crate::config::{ExtractionMode, ExtractionSettings};
use crate::error::{Result, SegueError};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").expect("Invalid regex"));

/// Whether story input should be fetched rather than used verbatim.
pub fn is_url(input: &str) -> bool {
    URL_PATTERN.is_match(input.trim())
}

/// Trait for URL-to-text extraction.
///
/// A successful empty string means the page had no readable text; fetch and
/// parse failures are [`SegueError::Extraction`].
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract_text(&self, url: &str) -> Result<String>;
}

/// Build the extractor configured in settings.
pub fn create_extractor(settings: &ExtractionSettings) -> Result<Arc<dyn Extractor>> {
    let timeout = std::time::Duration::from_secs(settings.timeout_secs);
    let extractor: Arc<dyn Extractor> = match settings.mode {
        ExtractionMode::Direct => Arc::new(HtmlExtractor::new(&settings.user_agent, timeout)?),
        ExtractionMode::Service => {
            let endpoint = settings.service_url.as_deref().ok_or_else(|| {
                SegueError::Config("extraction.service_url is required in service mode".to_string())
            })?;
            Arc::new(ServiceExtractor::new(endpoint, timeout)?)
        }
    };
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/news/bakery"));
        assert!(is_url("  HTTP://example.com  "));
        assert!(!is_url("Local bakery donates 1000 loaves"));
        assert!(!is_url("see https://example.com"));
        assert!(!is_url("https://example.com/a b"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("https://"));
    }

    #[test]
    fn test_service_mode_requires_url() {
        let settings = ExtractionSettings {
            mode: ExtractionMode::Service,
            ..Default::default()
        };
        assert!(matches!(create_extractor(&settings), Err(SegueError::Config(_))));
    }
}
