//! Segue CLI entry point.

use anyhow::Result;
use clap::Parser;
use segue::cli::commands::{self, GenerateArgs};
use segue::cli::{Cli, Commands};
use segue::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 if settings.general.log_level.is_empty() => "warn",
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("segue={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Generate {
            story,
            song,
            artist,
            style,
            no_pg_safe,
            json,
        } => {
            let args = GenerateArgs {
                story,
                song,
                artist,
                style,
                pg_safe: !*no_pg_safe,
                json: *json,
            };
            commands::run_generate(args, settings).await?;
        }

        Commands::Style { action } => {
            commands::run_style(action, settings).await?;
        }

        Commands::Extract { url } => {
            commands::run_extract(url, settings).await?;
        }

        Commands::Cache { action } => {
            commands::run_cache(action, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&path, &settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
