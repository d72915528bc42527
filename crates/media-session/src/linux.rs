//! Linux media sessions via MPRIS (Media Player Remote Interfacing Specification)
//!
//! Players are discovered on the session bus and queried/driven through
//! `dbus-send`.

use crate::{MediaController, MediaMetadata, MediaSession, SessionError};
use nowplaying_core::PlaybackStatus;
use std::collections::HashMap;
use std::process::Command;
use tracing::{debug, warn};

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";
const BROWSERS: [&str; 4] = ["firefox", "chrome", "chromium", "brave"];

pub struct MprisSession;

impl MprisSession {
    pub fn new() -> Self {
        Self
    }

    /// Bus names of every MPRIS player on the session bus
    fn player_names(&self) -> Result<Vec<String>, SessionError> {
        let stdout = dbus_send(&[
            "--session",
            "--print-reply",
            "--dest=org.freedesktop.DBus",
            "/org/freedesktop/DBus",
            "org.freedesktop.DBus.ListNames",
        ])?;
        Ok(parse_player_names(&stdout))
    }
}

impl MediaSession for MprisSession {
    fn active_controllers(&self) -> Result<Vec<Box<dyn MediaController>>, SessionError> {
        let mut players: Vec<(MprisController, PlaybackStatus)> = self
            .player_names()?
            .into_iter()
            .map(|name| {
                let controller = MprisController { bus_name: name };
                let status = controller.playback_status().unwrap_or_else(|e| {
                    debug!("No playback status from {}: {}", controller.bus_name, e);
                    PlaybackStatus::Stopped
                });
                (controller, status)
            })
            .collect();

        // Playing players first, then dedicated players before browsers
        players.sort_by_key(|(controller, status)| (!status.is_playing(), is_browser(&controller.bus_name)));

        Ok(players
            .into_iter()
            .map(|(controller, _)| Box::new(controller) as Box<dyn MediaController>)
            .collect())
    }
}

pub struct MprisController {
    bus_name: String,
}

impl MprisController {
    fn get_property(&self, property: &str) -> Result<String, SessionError> {
        dbus_send(&[
            "--session",
            "--print-reply",
            &format!("--dest={}", self.bus_name),
            MPRIS_PATH,
            "org.freedesktop.DBus.Properties.Get",
            &format!("string:{}", PLAYER_INTERFACE),
            &format!("string:{}", property),
        ])
    }

    fn call(&self, method: &str) -> Result<(), SessionError> {
        dbus_send(&[
            "--session",
            "--print-reply",
            "--type=method_call",
            &format!("--dest={}", self.bus_name),
            MPRIS_PATH,
            &format!("{}.{}", PLAYER_INTERFACE, method),
        ])?;
        debug!("Called {} on {}", method, self.bus_name);
        Ok(())
    }
}

impl MediaController for MprisController {
    fn id(&self) -> &str {
        &self.bus_name
    }

    fn metadata(&self) -> Result<MediaMetadata, SessionError> {
        let stdout = self.get_property("Metadata")?;
        let mut fields = parse_metadata(&stdout);
        debug!("Parsed metadata map: {:?}", fields);

        Ok(MediaMetadata {
            title: fields.remove("xesam:title"),
            artist: fields
                .remove("xesam:artist")
                .or_else(|| fields.remove("xesam:albumArtist")),
            album: fields.remove("xesam:album"),
            art_url: fields.remove("mpris:artUrl"),
        })
    }

    fn playback_status(&self) -> Result<PlaybackStatus, SessionError> {
        let stdout = self.get_property("PlaybackStatus")?;
        let value = first_string(stdout.lines().map(str::trim))
            .ok_or_else(|| SessionError::Backend(format!("no PlaybackStatus from {}", self.bus_name)))?;
        Ok(PlaybackStatus::from_mpris(&value))
    }

    fn skip_to_previous(&self) -> Result<(), SessionError> {
        self.call("Previous")
    }

    fn play(&self) -> Result<(), SessionError> {
        self.call("Play")
    }

    fn pause(&self) -> Result<(), SessionError> {
        self.call("Pause")
    }

    fn skip_to_next(&self) -> Result<(), SessionError> {
        self.call("Next")
    }
}

/// Run `dbus-send` and return its stdout, classifying bus errors
fn dbus_send(args: &[&str]) -> Result<String, SessionError> {
    let output = Command::new("dbus-send").args(args).output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if is_access_denied(&stderr) {
        warn!("D-Bus refused access: {}", stderr);
        return Err(SessionError::PermissionDenied(stderr));
    }
    Err(SessionError::Backend(stderr))
}

fn is_access_denied(stderr: &str) -> bool {
    stderr.contains("org.freedesktop.DBus.Error.AccessDenied")
        || stderr.contains("org.freedesktop.DBus.Error.InteractiveAuthorizationRequired")
}

fn is_browser(bus_name: &str) -> bool {
    let name = bus_name.to_lowercase();
    BROWSERS.iter().any(|browser| name.contains(browser))
}

/// Extract MPRIS bus names from a `ListNames` reply
fn parse_player_names(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| unquote(line.trim().strip_prefix("string ")?))
        .filter(|name| name.starts_with(MPRIS_PREFIX))
        .collect()
}

/// Flatten a `Metadata` reply into key -> first string value.
///
/// Array values (artists, genres) keep their first element; non-string values
/// (track ids, lengths) are skipped.
fn parse_metadata(output: &str) -> HashMap<String, String> {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();
    let mut metadata = HashMap::new();

    for (i, line) in lines.iter().enumerate() {
        if !line.starts_with("dict entry(") {
            continue;
        }
        let key = match lines.get(i + 1).and_then(|l| unquote(l.strip_prefix("string ")?)) {
            Some(key) => key,
            None => continue,
        };
        let value_lines = lines
            .iter()
            .skip(i + 2)
            .take_while(|l| !l.starts_with("dict entry(") && **l != ")")
            .copied();
        if let Some(value) = first_string(value_lines) {
            metadata.insert(key, value);
        }
    }

    metadata
}

/// First `string "..."` value among the given lines
fn first_string<'a>(mut lines: impl Iterator<Item = &'a str>) -> Option<String> {
    lines.find_map(|line| {
        let start = line.find("string \"")?;
        unquote(&line[start + "string ".len()..])
    })
}

fn unquote(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix('"')?;
    let end = inner.rfind('"')?;
    Some(inner[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_NAMES: &str = r#"method return time=1700000000.1 sender=org.freedesktop.DBus -> destination=:1.42 serial=3 reply_serial=2
   array [
      string "org.freedesktop.DBus"
      string ":1.7"
      string "org.mpris.MediaPlayer2.firefox.instance_1_2"
      string "org.mpris.MediaPlayer2.spotify"
      string "org.freedesktop.Notifications"
   ]"#;

    const METADATA: &str = r#"method return time=1700000000.2 sender=:1.9 -> destination=:1.42 serial=12 reply_serial=2
   variant       array [
         dict entry(
            string "mpris:trackid"
            variant                object path "/com/spotify/track/1"
         )
         dict entry(
            string "mpris:length"
            variant                uint64 421000000
         )
         dict entry(
            string "mpris:artUrl"
            variant                string "https://i.scdn.co/image/abc"
         )
         dict entry(
            string "xesam:artist"
            variant                array [
                  string "Pink Floyd"
                  string "David Gilmour"
               ]
         )
         dict entry(
            string "xesam:title"
            variant                string "Time"
         )
      ]"#;

    #[test]
    fn test_parse_player_names() {
        assert_eq!(
            parse_player_names(LIST_NAMES),
            vec![
                "org.mpris.MediaPlayer2.firefox.instance_1_2".to_string(),
                "org.mpris.MediaPlayer2.spotify".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_metadata() {
        let metadata = parse_metadata(METADATA);
        assert_eq!(metadata.get("xesam:title").map(String::as_str), Some("Time"));
        assert_eq!(metadata.get("xesam:artist").map(String::as_str), Some("Pink Floyd"));
        assert_eq!(
            metadata.get("mpris:artUrl").map(String::as_str),
            Some("https://i.scdn.co/image/abc")
        );
        assert!(!metadata.contains_key("mpris:trackid"));
        assert!(!metadata.contains_key("mpris:length"));
    }

    #[test]
    fn test_parse_status_reply() {
        let reply = "method return time=1 sender=:1.9 -> destination=:1.42 serial=5 reply_serial=2\n   variant       string \"Playing\"\n";
        assert_eq!(first_string(reply.lines().map(str::trim)).as_deref(), Some("Playing"));
    }

    #[test]
    fn test_browser_detection() {
        assert!(is_browser("org.mpris.MediaPlayer2.firefox.instance_1_2"));
        assert!(is_browser("org.mpris.MediaPlayer2.Chromium.instance9"));
        assert!(!is_browser("org.mpris.MediaPlayer2.spotify"));
    }

    #[test]
    fn test_access_denied_detection() {
        assert!(is_access_denied(
            "Error org.freedesktop.DBus.Error.AccessDenied: Rejected send message"
        ));
        assert!(!is_access_denied("Error org.freedesktop.DBus.Error.ServiceUnknown: no such name"));
    }

    #[test]
    fn test_live_session() {
        // Fine without a session bus or players; just must not panic
        match MprisSession::new().active_controllers() {
            Ok(controllers) => println!("Found {} MPRIS players", controllers.len()),
            Err(e) => println!("No MPRIS access (OK): {}", e),
        }
    }
}
