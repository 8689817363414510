//! Error types for readalong.

use thiserror::Error;

/// Library-level error type for readalong operations.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chapter content error: {0}")]
    Content(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Audio output error: {0}")]
    Audio(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for readalong operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
