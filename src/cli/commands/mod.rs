//! CLI command implementations.

mod ask;
mod at;
mod config;
mod doctor;
mod read;
mod show;

pub use ask::run_ask;
pub use at::run_at;
pub use config::run_config;
pub use doctor::run_doctor;
pub use read::run_read;
pub use show::run_show;

use crate::assistant::{AssistantClient, HistoryMode, OpenAIChatBackend};
use crate::config::{AssistantPrompts, Prompts, Settings};
use crate::content::ChapterData;
use crate::error::Result;
use std::sync::Arc;

/// Load the chapter named on the command line, the configured one, or the built-in one.
pub(crate) fn load_chapter(cli_path: Option<&str>, settings: &Settings) -> Result<ChapterData> {
    let path = cli_path
        .map(Settings::expand_path)
        .or_else(|| settings.chapter_path());
    ChapterData::load_or_builtin(path.as_deref())
}

/// Seconds covered by the chapter, used to bound the last line.
///
/// Never earlier than the start of the last line.
pub(crate) fn chapter_end(chapter: &ChapterData, settings: &Settings) -> f64 {
    let last_start = chapter.content.last().map_or(0.0, |s| s.start_time);
    settings
        .playback
        .clock_duration_seconds
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or_else(|| chapter.estimated_duration(settings.playback.trailing_seconds))
        .max(last_start)
}

/// Render prompts for the chapter and build an assistant client.
pub(crate) fn build_assistant(
    settings: &Settings,
    chapter: &ChapterData,
) -> Result<(AssistantClient, AssistantPrompts)> {
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?
    .assistant_for_chapter(&chapter.title, &chapter.subtitle);

    let backend = OpenAIChatBackend::new(&settings.assistant)?;
    let history = HistoryMode::from_settings(&settings.assistant);
    let client = AssistantClient::new(Arc::new(backend), &prompts, history);
    Ok((client, prompts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_end_prefers_configured_duration() {
        let chapter = crate::content::builtin_chapter();
        let mut settings = Settings::default();
        settings.playback.trailing_seconds = 10.0;
        let last_start = chapter.content.last().unwrap().start_time;
        assert_eq!(chapter_end(&chapter, &settings), last_start + 10.0);

        settings.playback.clock_duration_seconds = Some(300.0);
        assert_eq!(chapter_end(&chapter, &settings), 300.0);
    }

    #[test]
    fn test_chapter_end_not_before_last_line() {
        let chapter = crate::content::builtin_chapter();
        let mut settings = Settings::default();
        settings.playback.clock_duration_seconds = Some(1.0);
        let last_start = chapter.content.last().unwrap().start_time;
        assert_eq!(chapter_end(&chapter, &settings), last_start);
    }

    #[test]
    fn test_load_chapter_falls_back_to_builtin() {
        let chapter = load_chapter(None, &Settings::default()).unwrap();
        assert_eq!(chapter, crate::content::builtin_chapter());
    }
}
