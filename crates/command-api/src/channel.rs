//! Method-call handling, independent of the transport

use crate::types::*;
use nowplaying_media_session::{dispatch_action, read_now_playing, MediaSession};
use serde_json::Value;
use tracing::{debug, error};

pub const CHANNEL_NAME: &str = "nowplaying/media";

pub const GET_MEDIA_INFO: &str = "getMediaInfo";
pub const MEDIA_ACTION: &str = "mediaAction";

/// Handle one method call against `session`.
///
/// Blocks on the platform session; call it from a blocking context.
pub fn handle_method_call(session: &dyn MediaSession, call: &MethodCall) -> MethodResult {
    debug!("{} <- {}", CHANNEL_NAME, call.method);

    match call.method.as_str() {
        GET_MEDIA_INFO => {
            let info = MediaInfo::from(&read_now_playing(session));
            match serde_json::to_value(info) {
                Ok(value) => MethodResult::success(value),
                Err(e) => {
                    error!("Failed to encode media info: {}", e);
                    MethodResult::error(MEDIA_ERROR, "Failed to get media info", Some(e.to_string()))
                }
            }
        }
        MEDIA_ACTION => match call.argument("action") {
            Some(action) => match dispatch_action(session, action) {
                Ok(()) => MethodResult::success(Value::Null),
                Err(e) => {
                    error!("Failed to perform media action '{}': {}", action, e);
                    MethodResult::error(ACTION_ERROR, "Failed to perform media action", Some(e.to_string()))
                }
            },
            None => MethodResult::error(INVALID_ARGUMENT, "Action cannot be null", None),
        },
        _ => MethodResult::NotImplemented,
    }
}
