//! Audible output through rodio.
//!
//! The whole source is read into memory on load. Local files come from disk,
//! http(s) sources are fetched with reqwest. Each (re)start decodes a fresh
//! copy so playback can begin again after the end.

use super::{AudioOutput, AudioSourceRef, MediaErrorCode, MediaEvent};
use crate::error::{ReaderError, Result};
use async_trait::async_trait;
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

type BufferDecoder = Decoder<Cursor<Vec<u8>>>;

/// Speaker output backed by a rodio sink.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    bytes: Option<Arc<Vec<u8>>>,
    volume: f32,
    playing: bool,
    ended_reported: bool,
    events: VecDeque<MediaEvent>,
}

impl RodioOutput {
    /// Open the default audio device.
    pub fn new() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| ReaderError::Audio(format!("Failed to open audio device: {}", e)))?;
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            bytes: None,
            volume: 1.0,
            playing: false,
            ended_reported: false,
            events: VecDeque::new(),
        })
    }

    async fn fetch(source: &AudioSourceRef) -> std::result::Result<Vec<u8>, MediaErrorCode> {
        match source {
            AudioSourceRef::LocalFile(path) => tokio::fs::read(path).await.map_err(|e| {
                warn!("Failed to read {}: {}", path.display(), e);
                match e.kind() {
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                        MediaErrorCode::SrcNotSupported
                    }
                    _ => MediaErrorCode::Aborted,
                }
            }),
            AudioSourceRef::Url(url) => {
                let response = reqwest::get(url).await.map_err(|e| {
                    warn!("Failed to fetch {}: {}", url, e);
                    MediaErrorCode::Network
                })?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(MediaErrorCode::SrcNotSupported);
                }
                if !response.status().is_success() {
                    warn!("Fetching {} returned {}", url, response.status());
                    return Err(MediaErrorCode::Network);
                }

                response
                    .bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|_| MediaErrorCode::Network)
            }
        }
    }

    fn decode(bytes: &[u8]) -> std::result::Result<BufferDecoder, MediaErrorCode> {
        Decoder::new(Cursor::new(bytes.to_vec())).map_err(|e| {
            warn!("Failed to decode audio: {}", e);
            match e {
                DecoderError::UnrecognizedFormat => MediaErrorCode::SrcNotSupported,
                _ => MediaErrorCode::Decode,
            }
        })
    }

    /// Replace the sink with a paused one holding a fresh decoder.
    fn rebuild_sink(&mut self) -> std::result::Result<(), MediaErrorCode> {
        let bytes = self.bytes.clone().ok_or(MediaErrorCode::SrcNotSupported)?;
        let decoder = Self::decode(&bytes)?;

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.pause();
        sink.append(decoder);
        self.sink = Some(sink);
        Ok(())
    }
}

#[async_trait(?Send)]
impl AudioOutput for RodioOutput {
    async fn load(&mut self, source: Option<&AudioSourceRef>) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.bytes = None;
        self.playing = false;
        self.ended_reported = false;

        let Some(source) = source else {
            return;
        };

        let bytes = match Self::fetch(source).await {
            Ok(bytes) => bytes,
            Err(code) => {
                self.events.push_back(MediaEvent::Error(code));
                return;
            }
        };

        let duration = match Self::decode(&bytes) {
            Ok(decoder) => decoder
                .total_duration()
                .map(|d| d.as_secs_f64())
                .unwrap_or(f64::NAN),
            Err(code) => {
                self.events.push_back(MediaEvent::Error(code));
                return;
            }
        };

        debug!("Loaded {} bytes of audio from {}", bytes.len(), source);
        self.bytes = Some(Arc::new(bytes));

        match self.rebuild_sink() {
            Ok(()) => self.events.push_back(MediaEvent::LoadedMetadata { duration }),
            Err(code) => self.events.push_back(MediaEvent::Error(code)),
        }
    }

    async fn play(&mut self) -> Result<()> {
        if self.bytes.is_none() {
            return Err(ReaderError::Playback(
                "No playable source is loaded".to_string(),
            ));
        }

        let finished = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if finished {
            self.rebuild_sink()
                .map_err(|code| ReaderError::Audio(format!("Failed to restart audio ({:?})", code)))?;
        }

        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.playing = true;
        self.ended_reported = false;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds.max(0.0))) {
            warn!("Seek to {:.2}s failed: {}", seconds, e);
            return;
        }
        self.events.push_back(MediaEvent::TimeUpdate(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if self.playing {
            if let Some(sink) = &self.sink {
                if sink.empty() {
                    self.playing = false;
                    if !self.ended_reported {
                        self.ended_reported = true;
                        self.events.push_back(MediaEvent::Ended);
                    }
                } else {
                    self.events
                        .push_back(MediaEvent::TimeUpdate(sink.get_pos().as_secs_f64()));
                }
            }
        }
        self.events.drain(..).collect()
    }
}
