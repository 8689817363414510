//! Line commands for the reading session.

use crate::error::{ReaderError, Result};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderCommand {
    /// Play or pause.
    TogglePlay,
    /// Jump to a position in seconds.
    Seek(f64),
    /// Set the volume in [0, 1].
    Volume(f32),
    /// Pick a local audio file. Without a path the next line is read as one.
    Open(Option<String>),
    /// Show or hide the assistant panel.
    ToggleChat,
    /// Ask the assistant.
    Ask(String),
    /// Reprint the segment window.
    Text,
    Status,
    Help,
    Quit,
}

impl ReaderCommand {
    /// Parse a line.
    ///
    /// A leading `/` always marks a command. While the panel is open, only a
    /// bare command word (`chat`, `quit`, ...) is a command and any other text
    /// is a question.
    pub fn parse(line: &str, panel_open: bool) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::TogglePlay);
        }

        if let Some(command) = line.strip_prefix('/') {
            return Self::parse_command(command.trim());
        }

        if panel_open {
            return Ok(Self::bare_word(line).unwrap_or_else(|| Self::Ask(line.to_string())));
        }

        Self::parse_command(line)
    }

    /// Commands that take no argument, spelled out in full.
    fn bare_word(line: &str) -> Option<Self> {
        let command = match line.to_ascii_lowercase().as_str() {
            "play" | "pause" => Self::TogglePlay,
            "open" => Self::Open(None),
            "chat" => Self::ToggleChat,
            "text" => Self::Text,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }

    fn parse_command(line: &str) -> Result<Self> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" | "pause" | "p" => Self::TogglePlay,
            "seek" | "s" => Self::Seek(parse_time(rest)?),
            "vol" | "volume" => Self::Volume(parse_volume(rest)?),
            "open" | "o" => Self::Open((!rest.is_empty()).then(|| rest.to_string())),
            "chat" | "c" => Self::ToggleChat,
            "ask" | "?" => {
                if rest.is_empty() {
                    return Err(ReaderError::InvalidInput(
                        "Usage: ask <question>".to_string(),
                    ));
                }
                Self::Ask(rest.to_string())
            }
            "text" | "t" => Self::Text,
            "status" => Self::Status,
            "help" | "h" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => {
                return Err(ReaderError::InvalidInput(format!(
                    "Unknown command '{}'. Type 'help' for the list of commands.",
                    word
                )))
            }
        };

        Ok(command)
    }
}

/// Parse seconds (`75`, `75.5`), `m:ss` or `h:mm:ss`.
///
/// Minute and second fields after the first part must be below 60.
pub fn parse_time(input: &str) -> Result<f64> {
    let invalid = || {
        ReaderError::InvalidInput(format!(
            "Invalid time '{}'. Use seconds or m:ss.",
            input
        ))
    };

    let parts: Vec<&str> = input.split(':').map(str::trim).collect();
    if input.trim().is_empty() || parts.len() > 3 {
        return Err(invalid());
    }

    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let value: f64 = part.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 || (i > 0 && value >= 60.0) {
            return Err(invalid());
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

/// Parse a volume given as a fraction (`0.5`) or a percentage (`50`, `50%`).
pub fn parse_volume(input: &str) -> Result<f32> {
    let trimmed = input.trim().trim_end_matches('%');
    let value: f32 = trimmed.parse().map_err(|_| {
        ReaderError::InvalidInput(format!("Invalid volume '{}'. Use 0-1 or 0-100.", input))
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ReaderError::InvalidInput(format!(
            "Invalid volume '{}'. Use 0-1 or 0-100.",
            input
        )));
    }

    let fraction = if value > 1.0 || input.trim().ends_with('%') {
        value / 100.0
    } else {
        value
    };
    Ok(fraction.min(1.0))
}

/// Lines shown by `help`.
pub const HELP: &[(&str, &str)] = &[
    ("play | pause | p | <enter>", "Toggle playback"),
    ("seek <s | m:ss>", "Jump to a position"),
    ("vol <0-1 | 0-100>", "Set the volume"),
    ("open [path]", "Pick a local audio file"),
    ("chat", "Show or hide the assistant panel"),
    ("ask <question>", "Ask the reading assistant"),
    ("text", "Show the text around the current line"),
    ("status", "Show the player status"),
    ("quit", "Leave the session"),
    ("/<command>", "Run a command while the guide is open"),
];
