//! Audio playback: the output abstraction and the controller driving it.
//!
//! An [`AudioOutput`] plays the role of a native media element. It accepts
//! load/play/pause/seek/volume commands and reports what happened through
//! [`MediaEvent`]s that the [`PlaybackController`] drains on each tick.

mod clock;
mod controller;
#[cfg(feature = "rodio")]
mod rodio_output;

pub use clock::ClockOutput;
pub use controller::{PlaybackController, PlaybackState, ToggleOutcome};
#[cfg(feature = "rodio")]
pub use rodio_output::RodioOutput;

use crate::config::{OutputKind, PlaybackSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff", "alac",
];

/// Check if path is a supported audio file.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Where audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSourceRef {
    /// A remote http(s) URL.
    Url(String),
    /// A file on this machine, e.g. one picked by the user.
    LocalFile(PathBuf),
}

impl AudioSourceRef {
    /// Interpret user or config input as a source.
    ///
    /// http(s) URLs stay URLs, `file://` URLs and everything else become paths.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                AudioSourceRef::Url(input.to_string())
            }
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => AudioSourceRef::LocalFile(path),
                Err(()) => AudioSourceRef::Url(input.to_string()),
            },
            _ => AudioSourceRef::LocalFile(PathBuf::from(shellexpand::tilde(input).to_string())),
        }
    }

    /// Short label for status lines.
    pub fn label(&self) -> String {
        match self {
            AudioSourceRef::Url(url) => url.clone(),
            AudioSourceRef::LocalFile(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

impl std::fmt::Display for AudioSourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSourceRef::Url(url) => write!(f, "{}", url),
            AudioSourceRef::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Media error codes, numbered like the native media element's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Something the output reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Position progressed (or was set by a seek).
    TimeUpdate(f64),
    /// Source opened; duration may be unknown (non-finite or zero).
    LoadedMetadata { duration: f64 },
    /// Playback reached the end.
    Ended,
    /// Loading or decoding failed.
    Error(MediaErrorCode),
}

/// User-visible player problems, shown on the status line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackIssue {
    #[error("Audio source not found or unsupported. Use 'open <path>' to pick a local audio file.")]
    SourceUnavailable,

    #[error("Audio failed to load.")]
    LoadFailed,

    #[error("Playback failed. Check the file format or try picking the file again.")]
    PlaybackFailed,
}

impl PlaybackIssue {
    /// Map a media error code to the message the user sees.
    pub fn from_media_error(code: MediaErrorCode) -> Self {
        match code {
            MediaErrorCode::SrcNotSupported => PlaybackIssue::SourceUnavailable,
            _ => PlaybackIssue::LoadFailed,
        }
    }
}

/// The native audio primitive.
///
/// Outputs live on the UI task, so the trait does not require `Send`.
#[async_trait(?Send)]
pub trait AudioOutput {
    /// Bind a source (or none). Failures surface later as `MediaEvent::Error`.
    async fn load(&mut self, source: Option<&AudioSourceRef>);

    /// Start or resume playback.
    async fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Jump to a position in seconds.
    fn seek(&mut self, seconds: f64);

    /// Set volume in [0, 1].
    fn set_volume(&mut self, volume: f32);

    /// Drain pending events, oldest first.
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

#[async_trait(?Send)]
impl AudioOutput for Box<dyn AudioOutput> {
    async fn load(&mut self, source: Option<&AudioSourceRef>) {
        (**self).load(source).await
    }

    async fn play(&mut self) -> Result<()> {
        (**self).play().await
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        (**self).poll_events()
    }
}

/// Collaborator asked to obtain a local file when nothing playable is bound.
pub trait FilePicker {
    fn request_file(&mut self);
}

/// Create the configured audio output.
///
/// `clock_duration` is the length reported by the silent clock output.
pub fn create_output(settings: &PlaybackSettings, clock_duration: f64) -> Result<Box<dyn AudioOutput>> {
    match settings.output {
        OutputKind::Clock => Ok(Box::new(ClockOutput::new(clock_duration))),
        #[cfg(feature = "rodio")]
        OutputKind::Rodio => Ok(Box::new(RodioOutput::new()?)),
        #[cfg(not(feature = "rodio"))]
        OutputKind::Rodio => Err(crate::error::ReaderError::Config(
            "This build has no rodio output. Rebuild with `--features rodio` or set playback.output = \"clock\".".to_string(),
        )),
    }
}
