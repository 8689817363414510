//! Silent output that advances playback on the clock.
//!
//! Nothing is decoded: a source is accepted when it looks playable (an
//! existing local audio file, or an http(s) URL) and the reported duration
//! comes from configuration or the chapter.

use super::{is_audio_file, AudioOutput, AudioSourceRef, MediaErrorCode, MediaEvent};
use crate::error::{ReaderError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::time::Instant;
use tracing::debug;

/// Wall-clock playback without sound.
#[derive(Debug)]
pub struct ClockOutput {
    duration: f64,
    loaded: bool,
    /// Position at the last anchor point (play, pause or seek).
    position: f64,
    /// When playback resumed from `position`; None while paused.
    started_at: Option<Instant>,
    events: VecDeque<MediaEvent>,
}

impl ClockOutput {
    /// Create a clock output reporting the given duration.
    pub fn new(duration: f64) -> Self {
        Self {
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            loaded: false,
            position: 0.0,
            started_at: None,
            events: VecDeque::new(),
        }
    }

    fn current_position(&self) -> f64 {
        match self.started_at {
            Some(at) => (self.position + at.elapsed().as_secs_f64()).min(self.duration),
            None => self.position,
        }
    }

    fn is_resolvable(source: &AudioSourceRef) -> bool {
        match source {
            AudioSourceRef::LocalFile(path) => path.is_file() && is_audio_file(path),
            AudioSourceRef::Url(_) => true,
        }
    }
}

#[async_trait(?Send)]
impl AudioOutput for ClockOutput {
    async fn load(&mut self, source: Option<&AudioSourceRef>) {
        self.started_at = None;
        self.position = 0.0;
        self.loaded = false;

        match source {
            None => {}
            Some(src) if Self::is_resolvable(src) => {
                debug!("Clock output bound to {}", src);
                self.loaded = true;
                self.events.push_back(MediaEvent::LoadedMetadata {
                    duration: self.duration,
                });
            }
            Some(src) => {
                debug!("Clock output cannot resolve {}", src);
                self.events
                    .push_back(MediaEvent::Error(MediaErrorCode::SrcNotSupported));
            }
        }
    }

    async fn play(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(ReaderError::Playback(
                "No playable source is loaded".to_string(),
            ));
        }
        if self.started_at.is_some() {
            return Ok(());
        }
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.position = self.current_position();
        self.started_at = None;
    }

    fn seek(&mut self, seconds: f64) {
        let target = seconds.clamp(0.0, self.duration);
        self.position = target;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.events.push_back(MediaEvent::TimeUpdate(target));
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if self.started_at.is_some() {
            let position = self.current_position();
            if position >= self.duration {
                self.position = self.duration;
                self.started_at = None;
                self.events.push_back(MediaEvent::TimeUpdate(self.duration));
                self.events.push_back(MediaEvent::Ended);
            } else {
                self.events.push_back(MediaEvent::TimeUpdate(position));
            }
        }
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn audio_file(dir: &tempfile::TempDir) -> AudioSourceRef {
        let path = dir.path().join("chapter.mp3");
        std::fs::write(&path, b"not really audio").unwrap();
        AudioSourceRef::LocalFile(path)
    }

    #[tokio::test]
    async fn test_missing_file_reports_unsupported() {
        let mut output = ClockOutput::new(60.0);
        output
            .load(Some(&AudioSourceRef::LocalFile(PathBuf::from("/nope/audio.mp3"))))
            .await;

        assert_eq!(
            output.poll_events(),
            vec![MediaEvent::Error(MediaErrorCode::SrcNotSupported)]
        );
        assert!(output.play().await.is_err());
    }

    #[tokio::test]
    async fn test_load_reports_duration() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = ClockOutput::new(42.0);
        output.load(Some(&audio_file(&dir))).await;

        assert_eq!(
            output.poll_events(),
            vec![MediaEvent::LoadedMetadata { duration: 42.0 }]
        );
    }

    #[tokio::test]
    async fn test_play_advances_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = ClockOutput::new(60.0);
        output.load(Some(&audio_file(&dir))).await;
        output.poll_events();

        output.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let events = output.poll_events();
        match events.as_slice() {
            [MediaEvent::TimeUpdate(t)] => assert!(*t > 0.0 && *t < 60.0),
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_paused_output_is_quiet_and_seek_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = ClockOutput::new(60.0);
        output.load(Some(&audio_file(&dir))).await;
        output.poll_events();

        assert!(output.poll_events().is_empty());
        output.seek(75.0);
        assert_eq!(output.poll_events(), vec![MediaEvent::TimeUpdate(60.0)]);
    }

    #[tokio::test]
    async fn test_reaching_the_end_reports_ended_then_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = ClockOutput::new(10.0);
        output.load(Some(&audio_file(&dir))).await;
        output.poll_events();

        output.seek(10.0);
        output.poll_events();
        // Playing from the end starts over.
        output.play().await.unwrap();
        assert!(output.current_position() < 1.0);

        output.seek(10.0);
        let events = output.poll_events();
        assert_eq!(events.last(), Some(&MediaEvent::Ended));
        assert!(output.started_at.is_none());

        output.play().await.unwrap();
        assert!(output.current_position() < 1.0);
    }
}
