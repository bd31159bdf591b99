//! CLI module for Segue.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Segue - DJ transition scripts
///
/// Connects a story (text or article URL) to a song with three ready-to-read
/// radio transitions.
#[derive(Parser, Debug)]
#[command(name = "segue")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate three transition scripts linking a story to a song
    Generate {
        /// Story text, or an article URL to extract it from
        #[arg(short, long)]
        story: String,

        /// Song title
        #[arg(long)]
        song: String,

        /// Artist name
        #[arg(short, long)]
        artist: String,

        /// Style id (see `segue style list`), or "personal"
        #[arg(long, default_value = "conversational")]
        style: String,

        /// Allow content that is not PG-safe
        #[arg(long)]
        no_pg_safe: bool,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Manage the personal writing style
    Style {
        #[command(subcommand)]
        action: StyleAction,
    },

    /// Extract readable article text from a URL
    Extract {
        /// Article URL
        url: String,
    },

    /// Inspect the generation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check configuration and API access
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum StyleAction {
    /// Derive a personal style profile from script samples
    Create {
        /// Short description of how you write
        #[arg(short, long)]
        description: String,

        /// File containing one script sample (repeatable)
        #[arg(short, long = "sample", required = true)]
        samples: Vec<String>,
    },

    /// List the predefined styles
    List,

    /// Show the active personal style
    Show,

    /// Remove the active personal style
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show entry count and location
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
