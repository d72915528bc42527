//! Windows media sessions via System Media Transport Controls (SMTC)
//!
//! Any application publishing to SMTC (Spotify, browsers, Groove, ...) is
//! visible here. Requires Windows 10 version 1803 or later.

use crate::{MediaController, MediaMetadata, MediaSession, SessionError};
use nowplaying_core::PlaybackStatus;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use windows::{
    core::{Interface, RuntimeType},
    Foundation::{AsyncStatus, IAsyncOperation},
    Media::Control::{
        GlobalSystemMediaTransportControlsSession,
        GlobalSystemMediaTransportControlsSessionManager,
        GlobalSystemMediaTransportControlsSessionPlaybackStatus,
    },
    Storage::Streams::DataReader,
};

const ASYNC_TIMEOUT: Duration = Duration::from_secs(2);
const E_ACCESSDENIED: u32 = 0x8007_0005;

pub struct SmtcSession {
    manager: Option<GlobalSystemMediaTransportControlsSessionManager>,
}

impl SmtcSession {
    pub fn new() -> Self {
        let manager = match Self::request_manager() {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Failed to initialize SMTC session manager: {}", e);
                None
            }
        };
        Self { manager }
    }

    fn request_manager() -> Result<GlobalSystemMediaTransportControlsSessionManager, SessionError> {
        let operation = GlobalSystemMediaTransportControlsSessionManager::RequestAsync().map_err(winrt_error)?;
        block_on(operation)
    }
}

impl MediaSession for SmtcSession {
    fn active_controllers(&self) -> Result<Vec<Box<dyn MediaController>>, SessionError> {
        let manager = self
            .manager
            .as_ref()
            .ok_or_else(|| SessionError::Backend("SMTC manager not initialized".to_string()))?;

        // SMTC exposes the session it considers current; that is the one we mirror
        match manager.GetCurrentSession() {
            Ok(session) => {
                let id = session
                    .SourceAppUserModelId()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                Ok(vec![Box::new(SmtcController { id, session })])
            }
            Err(e) => {
                debug!("No current SMTC session: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

pub struct SmtcController {
    id: String,
    session: GlobalSystemMediaTransportControlsSession,
}

impl SmtcController {
    fn run_command(&self, name: &str, operation: windows::core::Result<IAsyncOperation<bool>>) -> Result<(), SessionError> {
        let accepted = block_on(operation.map_err(winrt_error)?)?;
        if !accepted {
            debug!("{} was rejected by {}", name, self.id);
        }
        Ok(())
    }

    fn read_thumbnail(&self) -> Result<Option<Vec<u8>>, SessionError> {
        let properties = block_on(self.session.TryGetMediaPropertiesAsync().map_err(winrt_error)?)?;
        let reference = match properties.Thumbnail() {
            Ok(reference) => reference,
            Err(_) => return Ok(None),
        };

        let stream = block_on(reference.OpenReadAsync().map_err(winrt_error)?)?;
        let size = stream.Size().map_err(winrt_error)? as u32;
        if size == 0 {
            return Ok(None);
        }

        let reader = DataReader::CreateDataReader(&stream).map_err(winrt_error)?;
        let load: IAsyncOperation<u32> = reader.LoadAsync(size).map_err(winrt_error)?.cast().map_err(winrt_error)?;
        let loaded = block_on(load)?;

        let mut bytes = vec![0u8; loaded as usize];
        reader.ReadBytes(&mut bytes).map_err(winrt_error)?;
        Ok(Some(bytes))
    }
}

impl MediaController for SmtcController {
    fn id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> Result<MediaMetadata, SessionError> {
        let properties = block_on(self.session.TryGetMediaPropertiesAsync().map_err(winrt_error)?)?;

        let text = |value: windows::core::Result<windows::core::HSTRING>| {
            value.ok().map(|s| s.to_string()).filter(|s| !s.is_empty())
        };

        let metadata = MediaMetadata {
            title: text(properties.Title()),
            artist: text(properties.Artist()),
            album: text(properties.AlbumTitle()),
            art_url: None,
        };
        debug!("SMTC metadata from {}: {:?}", self.id, metadata);
        Ok(metadata)
    }

    fn playback_status(&self) -> Result<PlaybackStatus, SessionError> {
        let info = self.session.GetPlaybackInfo().map_err(winrt_error)?;
        let status = info.PlaybackStatus().map_err(winrt_error)?;
        Ok(match status {
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Playing => PlaybackStatus::Playing,
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Paused => PlaybackStatus::Paused,
            _ => PlaybackStatus::Stopped,
        })
    }

    /// SMTC hands out the thumbnail as a stream instead of a URL
    fn artwork(&self, _metadata: &MediaMetadata) -> Result<Option<Vec<u8>>, SessionError> {
        self.read_thumbnail()
    }

    fn skip_to_previous(&self) -> Result<(), SessionError> {
        self.run_command("Previous", self.session.TrySkipPreviousAsync())
    }

    fn play(&self) -> Result<(), SessionError> {
        self.run_command("Play", self.session.TryPlayAsync())
    }

    fn pause(&self) -> Result<(), SessionError> {
        self.run_command("Pause", self.session.TryPauseAsync())
    }

    fn skip_to_next(&self) -> Result<(), SessionError> {
        self.run_command("Next", self.session.TrySkipNextAsync())
    }
}

/// Wait for a WinRT async operation, giving up after [`ASYNC_TIMEOUT`]
fn block_on<T>(operation: IAsyncOperation<T>) -> Result<T, SessionError>
where
    T: RuntimeType + Clone,
{
    let start = Instant::now();

    loop {
        match operation.Status().map_err(winrt_error)? {
            AsyncStatus::Completed => return operation.GetResults().map_err(winrt_error),
            AsyncStatus::Error => {
                let code = operation.ErrorCode().map(|c| c.0 as u32).unwrap_or_default();
                if code == E_ACCESSDENIED {
                    return Err(SessionError::PermissionDenied("SMTC access denied".to_string()));
                }
                return Err(SessionError::Backend(format!("async operation failed (0x{:08X})", code)));
            }
            AsyncStatus::Canceled => return Err(SessionError::Backend("async operation was canceled".to_string())),
            AsyncStatus::Started => {
                if start.elapsed() > ASYNC_TIMEOUT {
                    return Err(SessionError::Backend("async operation timed out".to_string()));
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            _ => return Err(SessionError::Backend("unknown async status".to_string())),
        }
    }
}

fn winrt_error(e: windows::core::Error) -> SessionError {
    if e.code().0 as u32 == E_ACCESSDENIED {
        SessionError::PermissionDenied(e.message().to_string())
    } else {
        SessionError::Backend(e.to_string())
    }
}
