//! CLI output formatting utilities.

use crate::script::ScriptResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a generated script set, labelled by position.
    pub fn scripts(result: &ScriptResult, cached: bool) {
        Output::header("Story");
        println!("  {}", result.story_details);
        Output::header("Song");
        println!("  {}", result.song_analysis);
        Output::header("Why this works");
        println!("  {}", result.why_this_works);

        for (slot, entry) in result.labelled() {
            let target = slot.word_target();
            println!(
                "\n{} {} {}",
                style(">>").green(),
                style(slot.label()).bold(),
                style(format!(
                    "({} words, target {}-{})",
                    word_count(&entry.script),
                    target.min,
                    target.max
                ))
                .dim()
            );
            println!("   {}", entry.script);
            println!("   {} {}", style("delivery:").dim(), entry.delivery_notes);
        }

        if cached {
            println!();
            Output::info("Served from cache.");
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
