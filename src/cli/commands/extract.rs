//! Extract command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SegueError;
use crate::extract::{create_extractor, is_url};
use anyhow::Result;

/// Print the readable text of an article.
pub async fn run_extract(url: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Extract, &settings.provider)?;

    if !is_url(url) {
        return Err(SegueError::Validation(format!("Invalid URL: {}", url)).into());
    }

    let extractor = create_extractor(&settings.extraction)?;

    let spinner = Output::spinner(&format!("Fetching {}...", url.trim()));
    let outcome = extractor.extract_text(url.trim()).await;
    spinner.finish_and_clear();

    let text = outcome.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if text.trim().is_empty() {
        Output::warning("No article text found on that page.");
    } else {
        println!("{}", text);
        Output::info(&format!("{} characters", text.chars().count()));
    }

    Ok(())
}
