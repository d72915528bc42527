//! macOS media sessions via AppleScript
//!
//! Spotify and Music.app are scriptable; each running one is exposed as a
//! controller. Scripting another app requires the user's Automation consent,
//! which surfaces here as a permission error.

use crate::{MediaController, MediaMetadata, MediaSession, SessionError};
use nowplaying_core::PlaybackStatus;
use std::process::Command;
use tracing::debug;

/// Scriptable players, in preference order
const PLAYERS: [&str; 2] = ["Spotify", "Music"];

/// errAEEventNotPermitted
const NOT_PERMITTED: &str = "-1743";

pub struct MacOsSession;

impl MacOsSession {
    pub fn new() -> Self {
        Self
    }

    fn is_running(app: &str) -> Result<bool, SessionError> {
        let stdout = osascript(&format!(
            "tell application \"System Events\" to (name of processes) contains \"{}\"",
            app
        ))?;
        Ok(stdout == "true")
    }
}

impl MediaSession for MacOsSession {
    fn active_controllers(&self) -> Result<Vec<Box<dyn MediaController>>, SessionError> {
        let mut controllers: Vec<(AppleScriptController, PlaybackStatus)> = Vec::new();

        for app in PLAYERS {
            if !Self::is_running(app)? {
                debug!("{} is not running", app);
                continue;
            }
            let controller = AppleScriptController { app };
            let status = controller.playback_status()?;
            controllers.push((controller, status));
        }

        // A playing app wins over a paused one; otherwise keep preference order
        controllers.sort_by_key(|(_, status)| !status.is_playing());

        Ok(controllers
            .into_iter()
            .map(|(controller, _)| Box::new(controller) as Box<dyn MediaController>)
            .collect())
    }
}

pub struct AppleScriptController {
    app: &'static str,
}

impl AppleScriptController {
    fn tell(&self, body: &str) -> Result<String, SessionError> {
        osascript(&format!("tell application \"{}\"\n{}\nend tell", self.app, body))
    }
}

impl MediaController for AppleScriptController {
    fn id(&self) -> &str {
        self.app
    }

    fn metadata(&self) -> Result<MediaMetadata, SessionError> {
        // Only Spotify exposes a cover URL to AppleScript
        let art = if self.app == "Spotify" {
            "artwork url of current track"
        } else {
            "\"\""
        };
        let stdout = self.tell(&format!(
            r#"if player state is playing or player state is paused then
    return (name of current track) & "|||" & (artist of current track) & "|||" & (album of current track) & "|||" & {}
else
    return ""
end if"#,
            art
        ))?;
        Ok(parse_track_line(&stdout))
    }

    fn playback_status(&self) -> Result<PlaybackStatus, SessionError> {
        let stdout = self.tell("return player state as string")?;
        Ok(match stdout.as_str() {
            "playing" => PlaybackStatus::Playing,
            "paused" => PlaybackStatus::Paused,
            _ => PlaybackStatus::Stopped,
        })
    }

    fn skip_to_previous(&self) -> Result<(), SessionError> {
        self.tell("previous track").map(|_| ())
    }

    fn play(&self) -> Result<(), SessionError> {
        self.tell("play").map(|_| ())
    }

    fn pause(&self) -> Result<(), SessionError> {
        self.tell("pause").map(|_| ())
    }

    fn skip_to_next(&self) -> Result<(), SessionError> {
        self.tell("next track").map(|_| ())
    }
}

fn osascript(script: &str) -> Result<String, SessionError> {
    let output = Command::new("osascript").arg("-e").arg(script).output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.contains(NOT_PERMITTED) || stderr.contains("Not authorized") {
        return Err(SessionError::PermissionDenied(stderr));
    }
    Err(SessionError::Backend(stderr))
}

/// Split `title|||artist|||album|||art` into metadata; empty parts are missing
fn parse_track_line(line: &str) -> MediaMetadata {
    let mut parts = line
        .split("|||")
        .map(|part| Some(part.trim().to_string()).filter(|p| !p.is_empty()));
    MediaMetadata {
        title: parts.next().flatten(),
        artist: parts.next().flatten(),
        album: parts.next().flatten(),
        art_url: parts.next().flatten(),
    }
}
