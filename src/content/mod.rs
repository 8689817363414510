//! Chapter content: the ordered, timestamped text segments shown while reading.
//!
//! A chapter is loaded once at startup and never mutated. The built-in chapter
//! can be replaced by a JSON or TOML file using the same field names.

mod builtin;
pub mod format;

pub use builtin::builtin_chapter;
pub use format::{format_chapter, format_timestamp, OutputFormat};

use crate::error::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One timestamped unit of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    /// Unique id; ordering follows position in the chapter.
    pub id: u32,
    /// Start time in seconds.
    pub start_time: f64,
    /// Text content.
    pub text: String,
}

impl TextSegment {
    /// Create a new text segment.
    pub fn new(id: u32, start_time: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start_time,
            text: text.into(),
        }
    }
}

/// A chapter: title, subtitle and its ordered segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterData {
    pub title: String,
    pub subtitle: String,
    pub content: Vec<TextSegment>,
}

impl ChapterData {
    /// Load a chapter from a `.json` or `.toml` file and validate it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;

        let chapter: ChapterData = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => toml::from_str(&raw)?,
            Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(&raw)?,
            _ => {
                return Err(ReaderError::Content(format!(
                    "Unsupported chapter file (expected .json or .toml): {}",
                    path.display()
                )))
            }
        };

        chapter.validate()?;
        info!(
            "Loaded chapter '{}' with {} segments from {}",
            chapter.title,
            chapter.content.len(),
            path.display()
        );
        Ok(chapter)
    }

    /// Load the configured chapter file, or the built-in chapter when none is set.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                debug!("Using built-in chapter");
                Ok(builtin_chapter())
            }
        }
    }

    /// Check the ordering and uniqueness rules for segments.
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(ReaderError::Content("Chapter has no segments".to_string()));
        }

        let mut seen = HashSet::new();
        let mut previous_start = f64::NEG_INFINITY;

        for segment in &self.content {
            if !seen.insert(segment.id) {
                return Err(ReaderError::Content(format!(
                    "Duplicate segment id {}",
                    segment.id
                )));
            }
            if !segment.start_time.is_finite() || segment.start_time < 0.0 {
                return Err(ReaderError::Content(format!(
                    "Segment {} has an invalid start time: {}",
                    segment.id, segment.start_time
                )));
            }
            if segment.start_time < previous_start {
                return Err(ReaderError::Content(format!(
                    "Segment {} starts at {}s, before the previous segment ({}s)",
                    segment.id, segment.start_time, previous_start
                )));
            }
            previous_start = segment.start_time;
        }

        Ok(())
    }

    /// Find a segment by id.
    pub fn segment(&self, id: u32) -> Option<&TextSegment> {
        self.content.iter().find(|s| s.id == id)
    }

    /// Position of a segment in the chapter.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.content.iter().position(|s| s.id == id)
    }

    /// Start time of the last segment plus some trailing seconds.
    pub fn estimated_duration(&self, trailing_seconds: f64) -> f64 {
        self.content
            .last()
            .map(|s| s.start_time + trailing_seconds.max(0.0))
            .unwrap_or(0.0)
    }

    /// End time for the segment at `index`: the next start, or the chapter end.
    pub fn end_time_of(&self, index: usize, chapter_end: f64) -> f64 {
        self.content
            .get(index + 1)
            .map(|next| next.start_time)
            .unwrap_or(chapter_end)
    }
}
