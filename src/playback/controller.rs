//! Playback controller: user actions in, position updates out.

use super::{
    is_audio_file, AudioOutput, AudioSourceRef, FilePicker, MediaErrorCode, MediaEvent,
    PlaybackIssue,
};
use crate::config::PlaybackSettings;
use crate::error::{ReaderError, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Player state owned by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub volume: f32,
    pub source: Option<AudioSourceRef>,
    pub last_issue: Option<PlaybackIssue>,
}

impl PlaybackState {
    fn new(volume: f32) -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            volume,
            source: None,
            last_issue: None,
        }
    }
}

/// Result of a play/pause toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Playing,
    Paused,
    /// Nothing playable was bound; the file picker was asked instead.
    FilePickerRequested,
    /// The output rejected the play request.
    Failed,
}

/// Drives an [`AudioOutput`] and keeps [`PlaybackState`] current.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    state: PlaybackState,
    title: String,
    autoplay_delay: Duration,
}

impl<O: AudioOutput> PlaybackController<O> {
    /// Create a controller. `title` appears on the status line while a source is bound.
    pub fn new(mut output: O, title: &str, settings: &PlaybackSettings) -> Self {
        let volume = settings.volume.clamp(0.0, 1.0);
        output.set_volume(volume);

        Self {
            output,
            state: PlaybackState::new(volume),
            title: title.to_string(),
            autoplay_delay: Duration::from_millis(settings.autoplay_delay_ms),
        }
    }

    /// Current player state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// The wrapped output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Bind a source, or none. A source that cannot be played is reported
    /// later through the output's events, not here.
    pub async fn load(&mut self, source: Option<AudioSourceRef>) {
        if self.state.is_playing {
            self.output.pause();
        }

        match &source {
            Some(src) => info!("Loading audio source {}", src),
            None => info!("No audio source bound"),
        }

        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.state.last_issue = None;
        self.state.source = source;

        self.output.load(self.state.source.as_ref()).await;
    }

    /// A source is usable when one is bound and it has not been reported missing.
    pub fn has_usable_source(&self) -> bool {
        self.state.source.is_some()
            && self.state.last_issue != Some(PlaybackIssue::SourceUnavailable)
    }

    /// Toggle between playing and paused.
    ///
    /// Without a usable source the picker is asked for a file and the output
    /// is left untouched.
    pub async fn toggle_play(&mut self, picker: &mut dyn FilePicker) -> ToggleOutcome {
        if !self.has_usable_source() {
            info!("No usable audio source; requesting a local file");
            picker.request_file();
            return ToggleOutcome::FilePickerRequested;
        }

        if self.state.is_playing {
            self.output.pause();
            self.state.is_playing = false;
            debug!("Paused at {:.2}s", self.state.current_time);
            return ToggleOutcome::Paused;
        }

        match self.output.play().await {
            Ok(()) => {
                self.state.is_playing = true;
                self.state.last_issue = None;
                debug!("Playing from {:.2}s", self.state.current_time);
                ToggleOutcome::Playing
            }
            Err(e) => {
                error!("Playback failed: {}", e);
                self.state.last_issue = Some(PlaybackIssue::PlaybackFailed);
                ToggleOutcome::Failed
            }
        }
    }

    /// Seek to `time`, clamped to the known duration. The reported position
    /// updates immediately. Returns the position actually used.
    pub fn seek(&mut self, time: f64) -> f64 {
        let mut target = if time.is_finite() { time.max(0.0) } else { 0.0 };
        if self.state.duration > 0.0 {
            target = target.min(self.state.duration);
        }

        self.output.seek(target);
        self.state.current_time = target;
        target
    }

    /// Set the volume in [0, 1]; out-of-range values are clamped.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        if !volume.is_finite() {
            return self.state.volume;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(volume);
        self.state.volume = volume;
        volume
    }

    /// Drain output events in order, returning each delivered position.
    pub fn pump(&mut self) -> Vec<f64> {
        self.output
            .poll_events()
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    /// Apply one output event. Returns the position for time updates.
    pub fn handle_event(&mut self, event: MediaEvent) -> Option<f64> {
        match event {
            MediaEvent::TimeUpdate(time) => {
                self.state.current_time = time;
                Some(time)
            }
            MediaEvent::LoadedMetadata { duration } => {
                if duration.is_finite() && duration > 0.0 {
                    self.state.duration = duration;
                }
                self.state.last_issue = None;
                debug!("Metadata loaded, duration {:.2}s", self.state.duration);
                None
            }
            MediaEvent::Ended => {
                self.state.is_playing = false;
                info!("Playback ended");
                None
            }
            MediaEvent::Error(code) => {
                let issue = PlaybackIssue::from_media_error(code);
                if code == MediaErrorCode::SrcNotSupported {
                    warn!("Audio source not found or unsupported");
                } else {
                    warn!("Audio failed to load ({:?})", code);
                }
                self.state.last_issue = Some(issue);
                self.state.is_playing = false;
                None
            }
        }
    }

    /// Bind a user-picked local file, reload, and try to start playback.
    ///
    /// Returns an error only when the path is not a readable audio file. An
    /// autoplay failure leaves the player paused with a status-line message.
    /// If the reload itself reported an error, autoplay is not attempted.
    pub async fn select_local_file(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(ReaderError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }
        if !is_audio_file(path) {
            return Err(ReaderError::InvalidInput(format!(
                "Not a recognized audio file: {}",
                path.display()
            )));
        }

        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.load(Some(AudioSourceRef::LocalFile(path))).await;

        if !self.autoplay_delay.is_zero() {
            tokio::time::sleep(self.autoplay_delay).await;
        }

        // Load events land before the play attempt, never after it.
        self.pump();
        if let Some(issue) = self.state.last_issue {
            warn!("Skipping autoplay: {}", issue);
            return Ok(());
        }

        match self.output.play().await {
            Ok(()) => {
                self.state.is_playing = true;
                info!("Autoplay started");
            }
            Err(e) => {
                warn!("Autoplay after file selection failed: {}", e);
                self.state.is_playing = false;
                self.state.last_issue = Some(PlaybackIssue::PlaybackFailed);
            }
        }

        Ok(())
    }

    /// Text for the player's status line.
    pub fn status_line(&self) -> String {
        match (&self.state.last_issue, &self.state.source) {
            (Some(issue), _) => issue.to_string(),
            (None, Some(_)) => format!("Now playing: {}", self.title),
            (None, None) => "Waiting for an audio file...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Records every call; `play` succeeds unless `reject_play` is set.
    #[derive(Default)]
    struct FakeOutput {
        play_calls: usize,
        pause_calls: usize,
        reject_play: bool,
        loaded: Vec<Option<AudioSourceRef>>,
        /// Queue metadata with this duration on every successful load.
        metadata_on_load: Option<f64>,
        /// Queue this error on load instead.
        error_on_load: Option<MediaErrorCode>,
        seeks: Vec<f64>,
        volume: Option<f32>,
        events: VecDeque<MediaEvent>,
    }

    #[async_trait(?Send)]
    impl AudioOutput for FakeOutput {
        async fn load(&mut self, source: Option<&AudioSourceRef>) {
            self.loaded.push(source.cloned());
            if let Some(code) = self.error_on_load {
                self.events.push_back(MediaEvent::Error(code));
            } else if let Some(duration) = self.metadata_on_load {
                self.events.push_back(MediaEvent::LoadedMetadata { duration });
            }
        }

        async fn play(&mut self) -> Result<()> {
            self.play_calls += 1;
            if self.reject_play {
                Err(ReaderError::Playback("rejected".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.pause_calls += 1;
        }

        fn seek(&mut self, seconds: f64) {
            self.seeks.push(seconds);
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = Some(volume);
        }

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            self.events.drain(..).collect()
        }
    }

    #[derive(Default)]
    struct CountingPicker {
        requests: usize,
    }

    impl FilePicker for CountingPicker {
        fn request_file(&mut self) {
            self.requests += 1;
        }
    }

    fn settings() -> PlaybackSettings {
        PlaybackSettings {
            autoplay_delay_ms: 0,
            ..PlaybackSettings::default()
        }
    }

    fn controller(output: FakeOutput) -> PlaybackController<FakeOutput> {
        PlaybackController::new(output, "Chapter One", &settings())
    }

    fn audio_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("picked.mp3");
        std::fs::write(&path, b"audio").unwrap();
        path
    }

    #[tokio::test]
    async fn test_toggle_without_source_requests_file() {
        let mut ctl = controller(FakeOutput::default());
        let mut picker = CountingPicker::default();

        let outcome = ctl.toggle_play(&mut picker).await;

        assert_eq!(outcome, ToggleOutcome::FilePickerRequested);
        assert_eq!(picker.requests, 1);
        assert_eq!(ctl.output().play_calls, 0);
        assert!(!ctl.state().is_playing);
    }

    #[tokio::test]
    async fn test_toggle_after_missing_source_requests_file() {
        let mut ctl = controller(FakeOutput::default());
        let mut picker = CountingPicker::default();

        ctl.load(Some(AudioSourceRef::parse("audio.mp3"))).await;
        ctl.handle_event(MediaEvent::Error(MediaErrorCode::SrcNotSupported));
        assert!(ctl.status_line().contains("pick a local audio file"));

        assert_eq!(ctl.toggle_play(&mut picker).await, ToggleOutcome::FilePickerRequested);
        assert_eq!(ctl.output().play_calls, 0);
    }

    #[tokio::test]
    async fn test_toggle_plays_and_pauses() {
        let mut ctl = controller(FakeOutput::default());
        let mut picker = CountingPicker::default();
        ctl.load(Some(AudioSourceRef::parse("https://example.com/a.mp3"))).await;

        assert_eq!(ctl.toggle_play(&mut picker).await, ToggleOutcome::Playing);
        assert!(ctl.state().is_playing);
        assert_eq!(ctl.status_line(), "Now playing: Chapter One");

        assert_eq!(ctl.toggle_play(&mut picker).await, ToggleOutcome::Paused);
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.output().pause_calls, 1);
        assert_eq!(picker.requests, 0);
    }

    #[tokio::test]
    async fn test_rejected_play_sets_failure_message() {
        let mut ctl = controller(FakeOutput {
            reject_play: true,
            ..FakeOutput::default()
        });
        let mut picker = CountingPicker::default();
        ctl.load(Some(AudioSourceRef::parse("https://example.com/a.mp3"))).await;

        assert_eq!(ctl.toggle_play(&mut picker).await, ToggleOutcome::Failed);
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.state().last_issue, Some(PlaybackIssue::PlaybackFailed));
        assert!(ctl.status_line().starts_with("Playback failed"));
    }

    #[tokio::test]
    async fn test_seek_clamps_and_updates_immediately() {
        let mut ctl = controller(FakeOutput::default());
        ctl.handle_event(MediaEvent::LoadedMetadata { duration: 100.0 });

        assert_eq!(ctl.seek(42.5), 42.5);
        assert_eq!(ctl.state().current_time, 42.5);
        assert_eq!(ctl.seek(500.0), 100.0);
        assert_eq!(ctl.seek(-3.0), 0.0);
        assert_eq!(ctl.output().seeks, vec![42.5, 100.0, 0.0]);
    }

    #[tokio::test]
    async fn test_seek_without_duration_only_floors() {
        let mut ctl = controller(FakeOutput::default());
        assert_eq!(ctl.seek(500.0), 500.0);
        assert_eq!(ctl.seek(f64::NAN), 0.0);
    }

    #[test]
    fn test_volume_is_clamped_and_applied() {
        let mut ctl = controller(FakeOutput::default());
        assert_eq!(ctl.output().volume, Some(0.8));

        assert_eq!(ctl.set_volume(1.7), 1.0);
        assert_eq!(ctl.set_volume(-0.5), 0.0);
        assert_eq!(ctl.set_volume(0.25), 0.25);
        assert_eq!(ctl.set_volume(f32::NAN), 0.25);
        assert_eq!(ctl.output().volume, Some(0.25));
    }

    #[test]
    fn test_pump_forwards_positions_in_order() {
        let mut output = FakeOutput::default();
        output.events.extend([
            MediaEvent::LoadedMetadata { duration: 30.0 },
            MediaEvent::TimeUpdate(1.0),
            MediaEvent::TimeUpdate(1.25),
            MediaEvent::TimeUpdate(1.5),
        ]);
        let mut ctl = controller(output);

        assert_eq!(ctl.pump(), vec![1.0, 1.25, 1.5]);
        assert_eq!(ctl.state().current_time, 1.5);
        assert_eq!(ctl.state().duration, 30.0);
        assert!(ctl.pump().is_empty());
    }

    #[test]
    fn test_errors_and_end_stop_playback() {
        let mut ctl = controller(FakeOutput::default());
        ctl.state.is_playing = true;

        ctl.handle_event(MediaEvent::Error(MediaErrorCode::Network));
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.status_line(), "Audio failed to load.");

        ctl.state.is_playing = true;
        ctl.handle_event(MediaEvent::Ended);
        assert!(!ctl.state().is_playing);
    }

    #[test]
    fn test_unknown_duration_is_ignored() {
        let mut ctl = controller(FakeOutput::default());
        ctl.handle_event(MediaEvent::LoadedMetadata { duration: f64::NAN });
        assert_eq!(ctl.state().duration, 0.0);
    }

    #[test]
    fn test_status_line_without_source() {
        let ctl = controller(FakeOutput::default());
        assert_eq!(ctl.status_line(), "Waiting for an audio file...");
    }

    #[tokio::test]
    async fn test_select_local_file_autoplays() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let mut ctl = controller(FakeOutput::default());

        ctl.select_local_file(&path).await.unwrap();

        assert!(ctl.state().is_playing);
        assert_eq!(ctl.output().play_calls, 1);
        assert!(matches!(
            ctl.state().source,
            Some(AudioSourceRef::LocalFile(_))
        ));
        assert_eq!(ctl.output().loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_select_local_file_autoplay_failure_stays_paused() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let mut ctl = controller(FakeOutput {
            reject_play: true,
            ..FakeOutput::default()
        });

        ctl.select_local_file(&path).await.unwrap();

        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.state().last_issue, Some(PlaybackIssue::PlaybackFailed));
    }

    #[tokio::test]
    async fn test_autoplay_failure_survives_queued_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let mut ctl = controller(FakeOutput {
            reject_play: true,
            metadata_on_load: Some(60.0),
            ..FakeOutput::default()
        });

        ctl.select_local_file(&path).await.unwrap();
        assert!(ctl.pump().is_empty());

        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.state().duration, 60.0);
        assert_eq!(ctl.state().last_issue, Some(PlaybackIssue::PlaybackFailed));
        assert!(ctl.status_line().starts_with("Playback failed"));
    }

    #[tokio::test]
    async fn test_select_local_file_skips_autoplay_when_load_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let mut ctl = controller(FakeOutput {
            error_on_load: Some(MediaErrorCode::Decode),
            ..FakeOutput::default()
        });

        ctl.select_local_file(&path).await.unwrap();

        assert_eq!(ctl.output().play_calls, 0);
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.state().last_issue, Some(PlaybackIssue::LoadFailed));
    }

    #[tokio::test]
    async fn test_select_local_file_rejects_bad_paths() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hi").unwrap();
        let mut ctl = controller(FakeOutput::default());

        assert!(ctl.select_local_file(&dir.path().join("missing.mp3")).await.is_err());
        assert!(ctl.select_local_file(&text).await.is_err());
        assert_eq!(ctl.output().play_calls, 0);
        assert!(ctl.output().loaded.is_empty());
    }

    #[test]
    fn test_select_local_file_waits_for_autoplay_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let settings = PlaybackSettings {
            autoplay_delay_ms: 20,
            ..PlaybackSettings::default()
        };
        let mut ctl = PlaybackController::new(FakeOutput::default(), "Chapter One", &settings);

        let started = std::time::Instant::now();
        tokio_test::block_on(ctl.select_local_file(&path)).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(ctl.state().is_playing);
    }
}
