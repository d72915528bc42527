//! Cross-platform access to the active media session
//!
//! This crate reads the "now playing" state from whatever media session the
//! platform exposes and forwards transport commands back to it:
//! - Linux: MPRIS via D-Bus
//! - Windows: System Media Transport Controls (SMTC)
//! - macOS: AppleScript (Spotify and Music.app)

use nowplaying_core::PlaybackStatus;
use thiserror::Error;

pub mod art;
pub mod dispatch;
pub mod reader;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use dispatch::{dispatch_action, perform_action};
pub use reader::read_now_playing;

/// Metadata reported by a media controller; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// `file://` or `http(s)://` location of the cover art
    pub art_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// The platform refused access to its media sessions
    #[error("media session access denied: {0}")]
    PermissionDenied(String),
    #[error("media session backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SessionError::PermissionDenied(_))
    }
}

/// A single media session, exposing its metadata and transport controls
pub trait MediaController: Send + Sync {
    /// Platform identifier of the player (bus name, app id, ...)
    fn id(&self) -> &str;

    fn metadata(&self) -> Result<MediaMetadata, SessionError>;

    fn playback_status(&self) -> Result<PlaybackStatus, SessionError>;

    /// Raw cover art bytes in any image format
    fn artwork(&self, metadata: &MediaMetadata) -> Result<Option<Vec<u8>>, SessionError> {
        match metadata.art_url.as_deref() {
            Some(url) => art::fetch_artwork(url).map(Some),
            None => Ok(None),
        }
    }

    fn skip_to_previous(&self) -> Result<(), SessionError>;

    fn play(&self) -> Result<(), SessionError>;

    fn pause(&self) -> Result<(), SessionError>;

    fn skip_to_next(&self) -> Result<(), SessionError>;
}

/// Registry of the media sessions visible to this application
pub trait MediaSession: Send + Sync {
    /// Active controllers, most relevant first
    fn active_controllers(&self) -> Result<Vec<Box<dyn MediaController>>, SessionError>;

    /// The controller the widget mirrors and drives
    fn first_controller(&self) -> Result<Option<Box<dyn MediaController>>, SessionError> {
        Ok(self.active_controllers()?.into_iter().next())
    }

    /// Identifiers of the active players, for diagnostics
    fn list_active_players(&self) -> Vec<String> {
        match self.active_controllers() {
            Ok(controllers) => controllers.iter().map(|c| c.id().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

// Platform-specific modules
#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "macos")]
mod macos;

/// Create a platform-specific media session
pub fn create_media_session() -> Box<dyn MediaSession> {
    #[cfg(target_os = "linux")]
    return Box::new(linux::MprisSession::new());

    #[cfg(target_os = "windows")]
    return Box::new(windows::SmtcSession::new());

    #[cfg(target_os = "macos")]
    return Box::new(macos::MacOsSession::new());

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    compile_error!("Unsupported platform - media session access requires Linux, Windows, or macOS");
}
