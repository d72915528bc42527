//! Scriptable in-memory media session for tests

use crate::{MediaController, MediaMetadata, MediaSession, SessionError};
use nowplaying_core::PlaybackStatus;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Transport command received by a [`FakeController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Previous,
    Play,
    Pause,
    Next,
}

#[derive(Clone)]
pub struct FakeController {
    id: String,
    metadata: MediaMetadata,
    status: Arc<Mutex<PlaybackStatus>>,
    artwork: Option<Vec<u8>>,
    fail_metadata: bool,
    fail_status: bool,
    commands: Arc<Mutex<Vec<Command>>>,
}

impl FakeController {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            metadata: MediaMetadata::default(),
            status: Arc::new(Mutex::new(PlaybackStatus::Stopped)),
            artwork: None,
            fail_metadata: false,
            fail_status: false,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_status(self, status: PlaybackStatus) -> Self {
        *self.status.lock().unwrap() = status;
        self
    }

    pub fn with_artwork(mut self, bytes: Vec<u8>) -> Self {
        self.artwork = Some(bytes);
        self
    }

    pub fn failing_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    /// Shared log of the commands this controller received
    pub fn commands(&self) -> Arc<Mutex<Vec<Command>>> {
        self.commands.clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        *self.status.lock().unwrap()
    }

    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

impl MediaController for FakeController {
    fn id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> Result<MediaMetadata, SessionError> {
        if self.fail_metadata {
            return Err(SessionError::Backend("metadata unavailable".to_string()));
        }
        Ok(self.metadata.clone())
    }

    fn playback_status(&self) -> Result<PlaybackStatus, SessionError> {
        if self.fail_status {
            return Err(SessionError::Backend("status unavailable".to_string()));
        }
        Ok(self.status())
    }

    fn artwork(&self, _metadata: &MediaMetadata) -> Result<Option<Vec<u8>>, SessionError> {
        Ok(self.artwork.clone())
    }

    fn skip_to_previous(&self) -> Result<(), SessionError> {
        self.record(Command::Previous);
        Ok(())
    }

    fn play(&self) -> Result<(), SessionError> {
        self.record(Command::Play);
        *self.status.lock().unwrap() = PlaybackStatus::Playing;
        Ok(())
    }

    fn pause(&self) -> Result<(), SessionError> {
        self.record(Command::Pause);
        *self.status.lock().unwrap() = PlaybackStatus::Paused;
        Ok(())
    }

    fn skip_to_next(&self) -> Result<(), SessionError> {
        self.record(Command::Next);
        Ok(())
    }
}

/// Session registry returning a fixed list of controllers
#[derive(Clone, Default)]
pub struct FakeSession {
    controllers: Vec<FakeController>,
    denied: bool,
}

impl FakeSession {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry that refuses every lookup
    pub fn denied() -> Self {
        Self {
            controllers: Vec::new(),
            denied: true,
        }
    }

    pub fn with(controller: FakeController) -> Self {
        Self::with_all(vec![controller])
    }

    pub fn with_all(controllers: Vec<FakeController>) -> Self {
        Self {
            controllers,
            denied: false,
        }
    }
}

impl MediaSession for FakeSession {
    fn active_controllers(&self) -> Result<Vec<Box<dyn MediaController>>, SessionError> {
        if self.denied {
            return Err(SessionError::PermissionDenied(
                "notification access not granted".to_string(),
            ));
        }
        Ok(self
            .controllers
            .iter()
            .cloned()
            .map(|c| Box::new(c) as Box<dyn MediaController>)
            .collect())
    }
}

/// A small valid PNG for artwork tests
pub fn sample_png() -> Vec<u8> {
    let pixels = image::RgbaImage::from_fn(4, 4, |x, y| image::Rgba([x as u8 * 60, y as u8 * 60, 90, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    png
}
