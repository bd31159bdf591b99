//! Direct page fetch with readable-text extraction.

use super::Extractor;
use crate::error::{Result, SegueError};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Elements whose content is never article text.
const NOISE_TAGS: [&str; 10] = [
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer", "aside", "form",
];

/// Elements read as one paragraph each.
const BLOCK_TAGS: [&str; 9] = ["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote"];

/// Fetches a page and pulls out its readable text.
pub struct HtmlExtractor {
    client: reqwest::Client,
}

impl HtmlExtractor {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| SegueError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    #[instrument(skip(self))]
    async fn extract_text(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| SegueError::Extraction(format!("Invalid URL {}: {}", url, e)))?;

        info!("Fetching article from {}", parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SegueError::Extraction(format!("Fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SegueError::Extraction(format!("{} returned {}", url, status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SegueError::Extraction(format!("Failed to read body: {}", e)))?;

        let text = readable_text(&html);
        debug!("Extracted {} characters from {} bytes of HTML", text.len(), html.len());
        Ok(text)
    }
}

/// Extract readable text from an HTML document.
///
/// Reads the longest `<article>`, else `<main>`, else `<body>`. Block elements
/// become paragraphs separated by blank lines; a block nested in another block
/// is read once, as part of its outermost block. Returns an empty string when
/// nothing readable is found.
pub fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = content_root(&document);

    let Ok(block_sel) = Selector::parse(&BLOCK_TAGS.join(", ")) else {
        return String::new();
    };

    let blocks: Vec<String> = root
        .select(&block_sel)
        .filter(|elem| !inside(*elem, root, &NOISE_TAGS) && !inside(*elem, root, &BLOCK_TAGS))
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        visible_text(root)
    } else {
        blocks.join("\n\n")
    }
}

fn content_root(document: &Html) -> ElementRef<'_> {
    let longest_article = Selector::parse("article").ok().and_then(|sel| {
        document
            .select(&sel)
            .max_by_key(|article| visible_text(*article).len())
    });

    longest_article
        .or_else(|| first_match(document, "main"))
        .or_else(|| first_match(document, "body"))
        .unwrap_or_else(|| document.root_element())
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| document.select(&sel).next())
}

/// Whether any ancestor of `elem` below `root` is one of `tags`.
fn inside(elem: ElementRef<'_>, root: ElementRef<'_>, tags: &[&str]) -> bool {
    elem.ancestors()
        .take_while(|node| node.id() != root.id())
        .filter_map(|node| node.value().as_element())
        .any(|el| tags.contains(&el.name()))
}

/// Text of `elem` with noise subtrees skipped and whitespace collapsed.
fn visible_text(elem: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in elem.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != elem.id())
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| NOISE_TAGS.contains(&el.name()));
        if !hidden {
            parts.push(text);
        }
    }
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
