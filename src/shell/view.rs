//! Terminal rendering for the reading session.

use super::input::HELP;
use crate::assistant::{Message, Role};
use crate::content::{format_timestamp, ChapterData, TextSegment};
use crate::playback::PlaybackState;
use console::style;

/// Chapter title block.
pub fn header(chapter: &ChapterData) -> String {
    format!(
        "\n{}\n{}\n",
        style(&chapter.title).bold().underlined(),
        style(&chapter.subtitle).italic().dim()
    )
}

/// Lines around the active segment, with the active one highlighted.
///
/// Without an active segment the window shows the opening of the chapter.
pub fn segment_window(chapter: &ChapterData, active: Option<u32>, radius: usize) -> Vec<String> {
    let len = chapter.content.len();
    if len == 0 {
        return Vec::new();
    }

    let center = active.and_then(|id| chapter.index_of(id)).unwrap_or(0);
    let first = if active.is_some() {
        center.saturating_sub(radius)
    } else {
        0
    };
    let last = (first.max(center) + radius + 1).min(len);

    chapter.content[first..last]
        .iter()
        .map(|segment| {
            let stamp = format!("{:>7}", format_timestamp(segment.start_time));
            if Some(segment.id) == active {
                format!(
                    "{} {} {}",
                    style("▶").yellow().bold(),
                    style(stamp).yellow(),
                    style(&segment.text).bold()
                )
            } else {
                format!("  {} {}", style(stamp).dim(), style(&segment.text).dim())
            }
        })
        .collect()
}

/// Message shown next to the player bar.
pub fn player_message(state: &PlaybackState, status: &str) -> String {
    let icon = if state.is_playing {
        style("▶").green()
    } else {
        style("⏸").dim()
    };

    let status = if state.last_issue.is_some() {
        style(status.to_string()).red()
    } else {
        style(status.to_string()).dim()
    };

    format!(
        "{} {} / {}  vol {:>3}%  {}",
        icon,
        format_timestamp(state.current_time),
        format_timestamp(state.duration),
        (state.volume * 100.0).round() as u32,
        status
    )
}

/// Reply to `status`: player status, bound source and the active line.
pub fn status_report(status: &str, source: &str, active: Option<&TextSegment>) -> String {
    let line = match active {
        Some(segment) => format!(
            "line #{} [{}]",
            segment.id,
            format_timestamp(segment.start_time)
        ),
        None => "no active line".to_string(),
    };
    format!("{} (source: {}, {})", status, source, line)
}

/// One conversation entry.
pub fn message(msg: &Message) -> String {
    match msg.role {
        Role::User => format!("{} {}", style("You:").green().bold(), msg.content),
        Role::Assistant => format!("{} {}", style("Guide:").cyan().bold(), msg.content),
    }
}

/// Panel banner shown when the assistant panel opens or closes.
pub fn panel_banner(open: bool) -> String {
    if open {
        format!(
            "{} {}",
            style("Reading guide open.").cyan().bold(),
            style("Type a question, or 'chat' to close.").dim()
        )
    } else {
        style("Reading guide closed.").dim().to_string()
    }
}

/// The command reference.
pub fn help() -> String {
    let mut out = format!("{}\n", style("Commands").bold());
    for (usage, description) in HELP {
        out.push_str(&format!("  {:<28} {}\n", style(usage).cyan(), description));
    }
    out
}
