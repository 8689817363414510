//! readalong - Read along with an audio chapter
//!
//! A terminal companion that keeps a chapter's text in step with its audio
//! narration and answers literary questions about it.
//!
//! # Overview
//!
//! readalong allows you to:
//! - Follow the narration with the current line highlighted
//! - Play, pause, seek and pick a local audio file
//! - Ask a reading assistant about the displayed text
//! - Export the chapter as text, JSON, SRT or WebVTT
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `content` - Chapter data, validation and export formats
//! - `sync` - Mapping a playback position to the active segment
//! - `playback` - Audio outputs and the playback controller
//! - `assistant` - The reading assistant and its chat backends
//! - `shell` - Session state, rendering and commands
//!
//! # Example
//!
//! ```rust
//! use readalong::content::builtin_chapter;
//! use readalong::sync::{select_active, DEFAULT_TOLERANCE};
//!
//! let chapter = builtin_chapter();
//! let active = select_active(&chapter.content, 15.0, DEFAULT_TOLERANCE);
//! assert_eq!(active, Some(chapter.content[1].id));
//! ```

pub mod assistant;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod openai;
pub mod playback;
pub mod shell;
pub mod sync;

pub use error::{ReaderError, Result};
