//! Segue - DJ transition scripts
//!
//! Turns a news story (pasted text or an article URL) and a song into three
//! ready-to-read radio transitions, optionally in the DJ's own voice.
//!
//! # Overview
//!
//! Segue allows you to:
//! - Generate long, medium and short transition scripts linking a story to a song
//! - Derive a personal style profile from your own script samples
//! - Extract readable article text from a URL
//! - Serve all of the above over a small JSON API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `provider` - Completion provider abstraction (OpenAI, Anthropic)
//! - `schema` - Declarative JSON shape validation
//! - `completion` - Structured completion with retry/repair
//! - `script` / `style` - Domain result types and styles
//! - `extract` - Article text extraction
//! - `cache` - Generation cache (SQLite, memory)
//! - `orchestrator` - Request coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use segue::config::Settings;
//! use segue::orchestrator::{Orchestrator, ScriptRequest};
//! use segue::style::StyleSelection;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let request = ScriptRequest {
//!         story: "Local bakery donates 1000 loaves".to_string(),
//!         song_title: "Here Comes the Sun".to_string(),
//!         artist: "The Beatles".to_string(),
//!         style: StyleSelection::default(),
//!         pg_safe: true,
//!     };
//!     let generated = orchestrator.generate_scripts(&request).await?;
//!     for entry in &generated.result.scripts {
//!         println!("{}", entry.script);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod provider;
pub mod schema;
pub mod script;
pub mod style;

pub use error::{Result, SegueError};
