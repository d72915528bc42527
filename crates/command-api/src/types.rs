//! Type definitions for the command channel
use nowplaying_core::artwork::to_base64;
use nowplaying_core::NowPlayingSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code when reading the session fails
pub const MEDIA_ERROR: &str = "MEDIA_ERROR";
/// Error code when `mediaAction` is called without an action
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
/// Error code when the transport command fails
pub const ACTION_ERROR: &str = "ACTION_ERROR";

/// Request for POST /v1/channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: &str, arguments: Value) -> Self {
        Self {
            method: method.to_string(),
            arguments,
        }
    }

    /// String argument `name`, if present
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success(result: Value) -> Self {
        MethodResult::Success { result }
    }

    pub fn error(code: &str, message: &str, details: Option<String>) -> Self {
        MethodResult::Error {
            code: code.to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Error code, for error results
    pub fn code(&self) -> Option<&str> {
        match self {
            MethodResult::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Flat now-playing record returned by `getMediaInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub track: String,
    pub artist: String,
    /// Base64 PNG, empty when there is no artwork
    pub thumbnail_url: String,
    pub is_playing: bool,
}

impl From<&NowPlayingSnapshot> for MediaInfo {
    fn from(snapshot: &NowPlayingSnapshot) -> Self {
        Self {
            track: snapshot.track.clone(),
            artist: snapshot.artist.clone(),
            thumbnail_url: snapshot.artwork.as_deref().map(to_base64).unwrap_or_default(),
            is_playing: snapshot.is_playing,
        }
    }
}

/// Request for POST /v1/media/action
///
/// `action` is kept as raw JSON so a wrong type is reported as
/// `INVALID_ARGUMENT` by the channel rather than rejected by the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaActionRequest {
    #[serde(default)]
    pub action: Value,
}

/// Response for GET /v1/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub players: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_result_wire_format() {
        assert_eq!(
            serde_json::to_value(MethodResult::success(Value::Null)).unwrap(),
            json!({"status": "success", "result": null})
        );
        assert_eq!(
            serde_json::to_value(MethodResult::error(INVALID_ARGUMENT, "Action cannot be null", None)).unwrap(),
            json!({"status": "error", "code": "INVALID_ARGUMENT", "message": "Action cannot be null", "details": null})
        );
        assert_eq!(
            serde_json::to_value(MethodResult::NotImplemented).unwrap(),
            json!({"status": "notImplemented"})
        );
    }

    #[test]
    fn test_media_info_keys() {
        let info = MediaInfo::from(&NowPlayingSnapshot::no_session());
        assert_eq!(
            serde_json::to_value(info).unwrap(),
            json!({
                "track": "No track playing",
                "artist": "Unknown artist",
                "thumbnailUrl": "",
                "isPlaying": false
            })
        );
    }

    #[test]
    fn test_method_call_defaults_arguments() {
        let call: MethodCall = serde_json::from_value(json!({"method": "getMediaInfo"})).unwrap();
        assert_eq!(call.arguments, Value::Null);
        assert_eq!(call.argument("action"), None);

        let call = MethodCall::new("mediaAction", json!({"action": "next"}));
        assert_eq!(call.argument("action"), Some("next"));
    }
}
