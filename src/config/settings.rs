//! Configuration settings for readalong.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub content: ContentSettings,
    pub playback: PlaybackSettings,
    pub assistant: AssistantSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Chapter content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ContentSettings {
    /// JSON or TOML chapter file replacing the built-in chapter.
    pub chapter_path: Option<String>,
}

/// Audio output backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Silent wall-clock playback; no decoding.
    #[default]
    Clock,
    /// Real sound through rodio (requires the `rodio` feature).
    Rodio,
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clock" | "silent" => Ok(OutputKind::Clock),
            "rodio" | "audio" => Ok(OutputKind::Rodio),
            _ => Err(format!("Unknown audio output: {}. Use clock or rodio.", s)),
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Clock => write!(f, "clock"),
            OutputKind::Rodio => write!(f, "rodio"),
        }
    }
}

/// Playback and synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Default audio source (URL or path). None starts with no source bound.
    pub audio_source: Option<String>,
    /// Audio output backend.
    pub output: OutputKind,
    /// Initial volume (0.0-1.0).
    pub volume: f32,
    /// Interval between position polls, in milliseconds.
    pub tick_interval_ms: u64,
    /// Delay between reloading a picked file and the autoplay attempt.
    pub autoplay_delay_ms: u64,
    /// Lead time subtracted from each segment start when selecting the active segment.
    pub sync_tolerance_seconds: f64,
    /// Duration reported by the clock output. None derives it from the chapter.
    pub clock_duration_seconds: Option<f64>,
    /// Seconds added after the last segment start when deriving a duration.
    pub trailing_seconds: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            audio_source: Some("audio.mp3".to_string()),
            output: OutputKind::Clock,
            volume: 0.8,
            tick_interval_ms: 250,
            autoplay_delay_ms: 200,
            sync_tolerance_seconds: crate::sync::DEFAULT_TOLERANCE,
            clock_duration_seconds: None,
            trailing_seconds: 30.0,
        }
    }
}

/// Assistant (hosted model) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Chat model name.
    pub model: String,
    /// Base URL of an OpenAI-compatible endpoint. None uses the OpenAI default.
    pub api_base: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP timeout for a single request.
    pub timeout_seconds: u64,
    /// Forward earlier conversation turns with each question.
    pub send_history: bool,
    /// Maximum number of earlier turns forwarded.
    pub max_history_messages: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            temperature: 0.7,
            timeout_seconds: 60,
            send_history: true,
            max_history_messages: 20,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReaderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readalong")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded chapter file path, if one is configured.
    pub fn chapter_path(&self) -> Option<PathBuf> {
        self.content
            .chapter_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.playback.volume, 0.8);
        assert_eq!(settings.playback.sync_tolerance_seconds, 0.2);
        assert!(settings.assistant.send_history);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[playback]\noutput = \"rodio\"\ntick_interval_ms = 100\n\n[assistant]\nsend_history = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.playback.output, OutputKind::Rodio);
        assert_eq!(settings.playback.tick_interval_ms, 100);
        assert_eq!(settings.playback.autoplay_delay_ms, 200);
        assert!(!settings.assistant.send_history);
        assert_eq!(settings.assistant.model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.content.chapter_path = Some("~/chapter.json".to_string());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.content.chapter_path.as_deref(), Some("~/chapter.json"));
        assert!(loaded.chapter_path().unwrap().ends_with("chapter.json"));
    }

    #[test]
    fn test_parse_output_kind() {
        assert_eq!("clock".parse::<OutputKind>().unwrap(), OutputKind::Clock);
        assert_eq!("RODIO".parse::<OutputKind>().unwrap(), OutputKind::Rodio);
        assert!("speaker".parse::<OutputKind>().is_err());
    }
}
