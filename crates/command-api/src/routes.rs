//! Route handlers for the command channel

use crate::channel::{handle_method_call, GET_MEDIA_INFO, MEDIA_ACTION};
use crate::types::*;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use nowplaying_media_session::MediaSession;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, error};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<dyn MediaSession>,
    /// Signalled after a successful action so the widget republishes early
    pub refresh: Arc<Notify>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/channel", post(method_call))
        .route("/v1/media", get(get_media_info))
        .route("/v1/media/action", post(media_action))
        .route("/v1/health", get(health_check))
        .with_state(state)
}

/// Run a call on the blocking pool and map the result onto an HTTP response
async fn dispatch(state: AppState, call: MethodCall) -> Response {
    let session = state.session.clone();
    let is_action = call.method == MEDIA_ACTION;

    let result = match tokio::task::spawn_blocking(move || handle_method_call(session.as_ref(), &call)).await {
        Ok(result) => result,
        Err(e) => {
            error!("Method call task failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MethodResult::error(MEDIA_ERROR, "Method call task failed", Some(e.to_string()))),
            )
                .into_response();
        }
    };

    if is_action && matches!(result, MethodResult::Success { .. }) {
        state.refresh.notify_one();
    }

    let status = match &result {
        MethodResult::Success { .. } => StatusCode::OK,
        MethodResult::Error { code, .. } if code == INVALID_ARGUMENT => StatusCode::BAD_REQUEST,
        MethodResult::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        MethodResult::NotImplemented => StatusCode::NOT_IMPLEMENTED,
    };

    (status, Json(result)).into_response()
}

/// POST /v1/channel - Generic method call
async fn method_call(State(state): State<AppState>, Json(call): Json<MethodCall>) -> Response {
    debug!("POST /v1/channel: {}", call.method);
    dispatch(state, call).await
}

/// GET /v1/media - Current now-playing record
async fn get_media_info(State(state): State<AppState>) -> Response {
    debug!("GET /v1/media");
    dispatch(state, MethodCall::new(GET_MEDIA_INFO, Value::Null)).await
}

/// POST /v1/media/action - Send a transport command
async fn media_action(State(state): State<AppState>, Json(req): Json<MediaActionRequest>) -> Response {
    debug!("POST /v1/media/action: {}", req.action);

    dispatch(state, MethodCall::new(MEDIA_ACTION, json!({ "action": req.action }))).await
}

/// GET /v1/health - Health check
async fn health_check(State(state): State<AppState>) -> Response {
    let session = state.session.clone();
    let players = tokio::task::spawn_blocking(move || session.list_active_players())
        .await
        .unwrap_or_default();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        players,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use nowplaying_core::PlaybackStatus;
    use nowplaying_media_session::fake::{Command, FakeController, FakeSession};
    use nowplaying_media_session::MediaMetadata;
    use tower::ServiceExt;

    fn state(session: FakeSession) -> AppState {
        AppState {
            session: Arc::new(session),
            refresh: Arc::new(Notify::new()),
        }
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_media() {
        let controller = FakeController::new("player")
            .with_metadata(MediaMetadata {
                title: Some("Song A".to_string()),
                ..Default::default()
            })
            .with_status(PlaybackStatus::Paused);
        let router = create_router(state(FakeSession::with(controller)));

        let (status, body) = send(router, Request::get("/v1/media").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["result"]["track"], "Song A");
        assert_eq!(body["result"]["artist"], "Unknown Artist");
        assert_eq!(body["result"]["isPlaying"], false);
    }

    #[tokio::test]
    async fn test_action_notifies_refresh() {
        let controller = FakeController::new("player").with_status(PlaybackStatus::Playing);
        let commands = controller.commands();
        let state = state(FakeSession::with(controller));
        let refresh = state.refresh.clone();
        let router = create_router(state);

        let (status, _) = send(router, post_json("/v1/media/action", json!({"action": "playPause"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(*commands.lock().unwrap(), vec![Command::Pause]);

        // notify_one stores a permit, so this resolves immediately
        tokio::time::timeout(std::time::Duration::from_secs(1), refresh.notified())
            .await
            .expect("refresh should have been signalled");
    }

    #[tokio::test]
    async fn test_action_without_action_is_bad_request() {
        let router = create_router(state(FakeSession::empty()));
        let (status, body) = send(router, post_json("/v1/media/action", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
        assert_eq!(body["message"], "Action cannot be null");
    }

    #[tokio::test]
    async fn test_action_with_wrong_type_is_bad_request() {
        let router = create_router(state(FakeSession::empty()));
        for body in [json!({"action": 3}), json!({"action": null}), json!({"action": ["next"]})] {
            let (status, reply) = send(router.clone(), post_json("/v1/media/action", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["status"], "error");
            assert_eq!(reply["code"], "INVALID_ARGUMENT");
            assert_eq!(reply["message"], "Action cannot be null");
        }
    }

    #[tokio::test]
    async fn test_channel_errors_map_to_status_codes() {
        let router = create_router(state(FakeSession::denied()));
        let (status, body) = send(
            router.clone(),
            post_json("/v1/channel", json!({"method": "mediaAction", "arguments": {"action": "next"}})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "ACTION_ERROR");

        let (status, body) = send(router, post_json("/v1/channel", json!({"method": "stop"}))).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["status"], "notImplemented");
    }

    #[tokio::test]
    async fn test_health_check() {
        let session = FakeSession::with_all(vec![FakeController::new("spotify"), FakeController::new("vlc")]);
        let router = create_router(state(session));

        let (status, body) = send(router, Request::get("/v1/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["players"], json!(["spotify", "vlc"]));
    }
}
