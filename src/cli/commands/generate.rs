//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, ScriptRequest};
use crate::style::StyleSelection;
use anyhow::Result;

/// Arguments of `segue generate`.
pub struct GenerateArgs<'a> {
    pub story: &'a str,
    pub song: &'a str,
    pub artist: &'a str,
    pub style: &'a str,
    pub pg_safe: bool,
    pub json: bool,
}

/// Run the generate command.
pub async fn run_generate(args: GenerateArgs<'_>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Generate, &settings.provider)?;

    let style = StyleSelection::resolve_saved(args.style, None, &settings.personal_style_path())?;

    let request = ScriptRequest {
        story: args.story.to_string(),
        song_title: args.song.to_string(),
        artist: args.artist.to_string(),
        style,
        pg_safe: args.pg_safe,
    };

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Writing transition scripts...");
    let outcome = orchestrator.generate_scripts(&request).await;
    spinner.finish_and_clear();

    let generated = outcome.map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated.result)?);
    } else {
        Output::scripts(&generated.result, generated.cached);
    }

    Ok(())
}
