use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Track title used when a live session reports no title
pub const UNKNOWN_TRACK: &str = "Unknown Track";
/// Artist used when a live session reports no artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Track title used when no session is visible at all
pub const NO_TRACK_PLAYING: &str = "No track playing";
/// Artist used when no session is visible at all
pub const NO_SESSION_ARTIST: &str = "Unknown artist";

/// Keys of the persisted widget record
pub mod keys {
    pub const TRACK: &str = "track";
    pub const ARTIST: &str = "artist";
    /// Base64-encoded PNG, may contain line breaks
    pub const THUMBNAIL: &str = "thumbnail";
    pub const IS_PLAYING: &str = "isPlaying";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// Flat projection of what the active media session currently reports.
///
/// Every field always holds a value; missing data is replaced by the
/// fallbacks above when the snapshot is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingSnapshot {
    pub track: String,
    pub artist: String,
    /// Encoded PNG bytes (optional)
    #[serde(default, skip_serializing)]
    pub artwork: Option<Vec<u8>>,
    pub is_playing: bool,
}

impl NowPlayingSnapshot {
    /// Snapshot reported when no media session is visible
    pub fn no_session() -> Self {
        Self {
            track: NO_TRACK_PLAYING.to_string(),
            artist: NO_SESSION_ARTIST.to_string(),
            artwork: None,
            is_playing: false,
        }
    }

    /// Build a snapshot from raw session fields, filling in fallbacks
    pub fn from_session(
        title: Option<String>,
        artist: Option<String>,
        artwork: Option<Vec<u8>>,
        status: PlaybackStatus,
    ) -> Self {
        Self {
            track: non_empty(title).unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
            artist: non_empty(artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            artwork: artwork.filter(|bytes| !bytes.is_empty()),
            is_playing: status.is_playing(),
        }
    }

    pub fn has_artwork(&self) -> bool {
        self.artwork.is_some()
    }
}

impl Default for NowPlayingSnapshot {
    fn default() -> Self {
        Self::no_session()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Playback state reported by a media controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackStatus {
    pub fn is_playing(self) -> bool {
        self == PlaybackStatus::Playing
    }

    /// Parse an MPRIS `PlaybackStatus` value
    pub fn from_mpris(value: &str) -> Self {
        match value.trim() {
            "Playing" => PlaybackStatus::Playing,
            "Paused" => PlaybackStatus::Paused,
            _ => PlaybackStatus::Stopped,
        }
    }
}

/// Transport command requested by the widget or the command channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaAction {
    #[serde(rename = "previous")]
    Previous,
    #[serde(rename = "playPause")]
    PlayPause,
    #[serde(rename = "next")]
    Next,
}

impl MediaAction {
    pub const ALL: [MediaAction; 3] = [MediaAction::Previous, MediaAction::PlayPause, MediaAction::Next];

    /// Wire tag carried by intents and command-channel calls
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaAction::Previous => "previous",
            MediaAction::PlayPause => "playPause",
            MediaAction::Next => "next",
        }
    }
}

impl std::fmt::Display for MediaAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for unknown action tags
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown media action '{0}'")]
pub struct ParseActionError(pub String);

impl FromStr for MediaAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "previous" => Ok(MediaAction::Previous),
            "playPause" | "play-pause" | "play_pause" => Ok(MediaAction::PlayPause),
            "next" => Ok(MediaAction::Next),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}
