//! Configuration module for readalong.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts};
pub use settings::{
    AssistantSettings, ContentSettings, GeneralSettings, OutputKind, PlaybackSettings,
    PromptSettings, Settings,
};
