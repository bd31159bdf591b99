//! Remote extraction service client.
//!
//! Speaks the same wire shape as `POST /api/extract`: `{"url": ...}` in,
//! `{"text": ...}` or `{"error": ..., "detail": ...}` out.

use super::Extractor;
use crate::error::{truncate_chars, Result, SegueError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Delegates extraction to an HTTP endpoint.
pub struct ServiceExtractor {
    client: reqwest::Client,
    endpoint: String,
}

impl ServiceExtractor {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SegueError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Extractor for ServiceExtractor {
    #[instrument(skip(self))]
    async fn extract_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ExtractRequest { url })
            .send()
            .await
            .map_err(|e| SegueError::Extraction(format!("Extraction service unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SegueError::Extraction(format!("Failed to read response: {}", e)))?;

        let text = interpret(status, &body)?;
        debug!("Extraction service returned {} characters", text.len());
        Ok(text)
    }
}

/// Map a service reply to extracted text or an extraction error.
fn interpret(status: reqwest::StatusCode, body: &str) -> Result<String> {
    let parsed: Option<ExtractResponse> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let reason = parsed
            .and_then(|r| match (r.error, r.detail) {
                (Some(e), Some(d)) => Some(format!("{} ({})", e, d)),
                (Some(e), None) => Some(e),
                (None, d) => d,
            })
            .unwrap_or_else(|| truncate_chars(body, 200));
        return Err(SegueError::Extraction(format!("service returned {}: {}", status, reason)));
    }

    match parsed {
        Some(ExtractResponse { error: Some(e), .. }) => Err(SegueError::Extraction(e)),
        Some(r) => Ok(r.text.unwrap_or_default()),
        None => Err(SegueError::Extraction(
            "service returned a malformed response".to_string(),
        )),
    }
}
