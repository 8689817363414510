//! Ask command implementation.

use super::{build_assistant, load_chapter};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    chapter: Option<String>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if question.trim().is_empty() {
        Output::warning("Nothing to ask.");
        return Ok(());
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings.assistant) {
        Output::error(&format!("{}", e));
        Output::info("Run 'readalong doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.assistant.model = model;
    }

    let chapter = load_chapter(chapter.as_deref(), &settings)?;
    let (client, _) = build_assistant(&settings, &chapter)?;

    let spinner = Output::spinner("Thinking...");
    let answer = client.ask(question, &[]).await;
    spinner.finish_and_clear();

    println!("\n{}\n", answer);

    Ok(())
}
