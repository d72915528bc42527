use nowplaying_command_api::ControlServer;
use nowplaying_core::PlaybackStatus;
use nowplaying_media_session::fake::{Command, FakeController, FakeSession};
use nowplaying_media_session::MediaMetadata;
use serde_json::{json, Value};
use std::sync::Arc;

async fn start(session: FakeSession) -> ControlServer {
    let mut server = ControlServer::new("127.0.0.1:0".parse().unwrap(), Arc::new(session));
    server.start().await.expect("server should bind");
    server
}

async fn post(server: &ControlServer, path: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{}{}", server.addr(), path))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let text = response.text().await.unwrap();
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn test_channel_over_http() {
    let controller = FakeController::new("player")
        .with_metadata(MediaMetadata {
            title: Some("Song A".to_string()),
            artist: Some("Artist B".to_string()),
            ..Default::default()
        })
        .with_status(PlaybackStatus::Paused);
    let commands = controller.commands();
    let server = start(FakeSession::with(controller.clone())).await;

    let (status, body) = post(&server, "/v1/channel", json!({"method": "getMediaInfo"})).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["result"],
        json!({"track": "Song A", "artist": "Artist B", "thumbnailUrl": "", "isPlaying": false})
    );

    let (status, _) = post(&server, "/v1/channel", json!({"method": "mediaAction", "arguments": {"action": "playPause"}})).await;
    assert_eq!(status, 200);
    assert_eq!(controller.status(), PlaybackStatus::Playing);

    let (status, _) = post(&server, "/v1/media/action", json!({"action": "next"})).await;
    assert_eq!(status, 200);
    assert_eq!(*commands.lock().unwrap(), vec![Command::Play, Command::Next]);

    let (_, body) = post(&server, "/v1/channel", json!({"method": "getMediaInfo"})).await;
    assert_eq!(body["result"]["isPlaying"], true);
}

#[tokio::test]
async fn test_health_over_http() {
    let server = start(FakeSession::empty()).await;

    let text = reqwest::get(format!("http://{}/v1/health", server.addr()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["players"], json!([]));
}
