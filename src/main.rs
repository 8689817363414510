//! readalong CLI entry point.

use anyhow::Result;
use clap::Parser;
use readalong::cli::{commands, Cli, Commands};
use readalong::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging; stderr keeps the session output clean
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("readalong={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Read {
            audio,
            chapter,
            no_audio,
            output,
        } => {
            commands::run_read(audio, chapter, no_audio, output, settings).await?;
        }

        Commands::Ask {
            question,
            chapter,
            model,
        } => {
            commands::run_ask(&question, chapter, model, settings).await?;
        }

        Commands::Show {
            format,
            output,
            chapter,
        } => {
            commands::run_show(&format, output, chapter, &settings)?;
        }

        Commands::At { time, chapter } => {
            commands::run_at(&time, chapter, &settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &settings, &config_path)?;
        }
    }

    Ok(())
}
