//! At command: which line is being read at a given time.

use super::load_chapter;
use crate::cli::Output;
use crate::config::Settings;
use crate::content::format_timestamp;
use crate::shell::input::parse_time;
use crate::sync::select_active;
use anyhow::Result;
use console::style;

/// Run the at command.
pub fn run_at(time: &str, chapter: Option<String>, settings: &Settings) -> Result<()> {
    let seconds = parse_time(time.trim())?;
    let chapter = load_chapter(chapter.as_deref(), settings)?;
    let tolerance = settings.playback.sync_tolerance_seconds;

    match select_active(&chapter.content, seconds, tolerance).and_then(|id| chapter.segment(id)) {
        Some(segment) => {
            println!(
                "{} {} {}",
                style(format!("#{}", segment.id)).cyan().bold(),
                style(format!("[{}]", format_timestamp(segment.start_time))).dim(),
                segment.text
            );
        }
        None => Output::info(&format!(
            "No line is active at {} (the first line starts at {}).",
            format_timestamp(seconds),
            chapter
                .content
                .first()
                .map(|s| format_timestamp(s.start_time))
                .unwrap_or_else(|| "0:00".to_string())
        )),
    }

    Ok(())
}
