//! Chapter output formatting (text, JSON, SRT, VTT).
//!
//! Segments only carry a start time; each cue ends where the next one starts,
//! and the last one ends at the chapter end.

use super::ChapterData;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChapterExport<'a> {
    title: &'a str,
    subtitle: &'a str,
    duration_seconds: f64,
    segments: Vec<SegmentExport<'a>>,
}

#[derive(Debug, Serialize)]
struct SegmentExport<'a> {
    id: u32,
    text: &'a str,
    start_seconds: f64,
    end_seconds: f64,
}

/// Format a chapter for output. `chapter_end` bounds the final cue.
pub fn format_chapter(chapter: &ChapterData, format: OutputFormat, chapter_end: f64) -> String {
    match format {
        OutputFormat::Text => format_text(chapter),
        OutputFormat::Json => format_json(chapter, chapter_end),
        OutputFormat::Srt => format_srt(chapter, chapter_end),
        OutputFormat::Vtt => format_vtt(chapter, chapter_end),
    }
}

fn format_text(chapter: &ChapterData) -> String {
    let mut output = format!("{}\n{}\n\n", chapter.title, chapter.subtitle);
    for segment in &chapter.content {
        output.push_str(&format!(
            "[{}] {}\n",
            format_timestamp(segment.start_time),
            segment.text
        ));
    }
    output
}

fn format_json(chapter: &ChapterData, chapter_end: f64) -> String {
    let export = ChapterExport {
        title: &chapter.title,
        subtitle: &chapter.subtitle,
        duration_seconds: chapter_end,
        segments: chapter
            .content
            .iter()
            .enumerate()
            .map(|(i, s)| SegmentExport {
                id: s.id,
                text: &s.text,
                start_seconds: s.start_time,
                end_seconds: chapter.end_time_of(i, chapter_end),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

fn format_srt(chapter: &ChapterData, chapter_end: f64) -> String {
    let mut output = String::new();

    for (i, segment) in chapter.content.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(segment.start_time, ','),
            format_cue_timestamp(chapter.end_time_of(i, chapter_end), ',')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn format_vtt(chapter: &ChapterData, chapter_end: f64) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in chapter.content.iter().enumerate() {
        output.push_str(&format!("{}\n", segment.id));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(segment.start_time, '.'),
            format_cue_timestamp(chapter.end_time_of(i, chapter_end), '.')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Cue timestamp, 00:00:00,000 for SRT or 00:00:00.000 for VTT.
fn format_cue_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, ms)
}

/// Format seconds as M:SS, or H:MM:SS past an hour. Non-finite input shows 0:00.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
