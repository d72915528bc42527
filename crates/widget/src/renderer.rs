//! Builds a widget view from the persisted now-playing record
//!
//! The renderer never queries the live session: it paints whatever the
//! publisher stored last, so rendering the same record twice gives the same view.

use crate::view::{PlayPauseIcon, WidgetView};
use nowplaying_core::artwork::{decode_rgba, from_base64, ArtworkError, DecodedArtwork};
use nowplaying_core::{keys, KeyValueStore, NO_SESSION_ARTIST, NO_TRACK_PLAYING};
use tracing::{debug, warn};

/// Render the widget `widget_id` from `store`
pub async fn render_widget(store: &dyn KeyValueStore, widget_id: u32) -> WidgetView {
    let mut view = WidgetView::new(widget_id);
    view.bind_controls();

    view.track_title = read_string(store, keys::TRACK)
        .await
        .unwrap_or_else(|| NO_TRACK_PLAYING.to_string());
    view.artist_name = read_string(store, keys::ARTIST)
        .await
        .unwrap_or_else(|| NO_SESSION_ARTIST.to_string());

    let is_playing = match store.get_bool(keys::IS_PLAYING).await {
        Ok(value) => value.unwrap_or(false),
        Err(e) => {
            warn!("Failed to read play state for widget {}: {}", widget_id, e);
            false
        }
    };
    view.play_pause_icon = PlayPauseIcon::for_state(is_playing);

    if let Some(encoded) = read_string(store, keys::THUMBNAIL).await {
        match decode_thumbnail(&encoded) {
            Ok(artwork) => view.thumbnail = Some(artwork),
            Err(ArtworkError::Empty) => {}
            Err(e) => warn!("Ignoring stored thumbnail for widget {}: {}", widget_id, e),
        }
    }

    debug!(
        "Rendered widget {}: track={:?}, icon={}, thumbnail={}",
        widget_id,
        view.track_title,
        view.play_pause_icon.name(),
        view.thumbnail.is_some()
    );
    view
}

fn decode_thumbnail(encoded: &str) -> Result<DecodedArtwork, ArtworkError> {
    let bytes = from_base64(encoded)?;
    decode_rgba(&bytes)
}

async fn read_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get_string(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from widget store: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ControlId;
    use async_trait::async_trait;
    use nowplaying_core::artwork::to_base64;
    use nowplaying_core::{MemoryStore, StoreError};
    use nowplaying_media_session::fake::sample_png;

    #[tokio::test]
    async fn test_render_stored_snapshot() {
        let store = MemoryStore::with_entries([
            (keys::TRACK, "Song A"),
            (keys::ARTIST, "Artist B"),
            (keys::THUMBNAIL, ""),
            (keys::IS_PLAYING, "true"),
        ]);

        let view = render_widget(&store, 1).await;
        assert_eq!(view.track_title, "Song A");
        assert_eq!(view.artist_name, "Artist B");
        assert_eq!(view.play_pause_icon, PlayPauseIcon::Pause);
        assert_eq!(view.thumbnail, None);
        assert_eq!(view.click_intents.len(), 3);
    }

    #[tokio::test]
    async fn test_render_empty_store_uses_defaults() {
        let view = render_widget(&MemoryStore::new(), 2).await;
        assert_eq!(view.track_title, "No track playing");
        assert_eq!(view.artist_name, "Unknown artist");
        assert_eq!(view.play_pause_icon, PlayPauseIcon::Play);
        assert_eq!(view.thumbnail, None);
        assert_eq!(view.intent_for(ControlId::Next).unwrap().widget_id, Some(2));
    }

    #[tokio::test]
    async fn test_render_is_idempotent() {
        let store = MemoryStore::with_entries([
            (keys::TRACK, "Song A".to_string()),
            (keys::ARTIST, "Artist B".to_string()),
            (keys::THUMBNAIL, to_base64(&sample_png())),
            (keys::IS_PLAYING, "false".to_string()),
        ]);

        let first = render_widget(&store, 5).await;
        let second = render_widget(&store, 5).await;
        assert_eq!(first, second);
        assert!(first.thumbnail.is_some());
    }

    #[tokio::test]
    async fn test_thumbnail_with_line_breaks_is_decoded() {
        let encoded = to_base64(&sample_png());
        let wrapped: String = encoded
            .as_bytes()
            .chunks(76)
            .map(|chunk| format!("{}\n", String::from_utf8_lossy(chunk)))
            .collect();
        let store = MemoryStore::with_entries([(keys::THUMBNAIL, wrapped)]);

        let thumbnail = render_widget(&store, 1).await.thumbnail.expect("thumbnail should decode");
        assert_eq!((thumbnail.width, thumbnail.height), (4, 4));
    }

    #[tokio::test]
    async fn test_malformed_thumbnail_is_omitted() {
        let store = MemoryStore::with_entries([
            (keys::TRACK, "Song A".to_string()),
            (keys::THUMBNAIL, "%%%not base64%%%".to_string()),
        ]);
        let view = render_widget(&store, 1).await;
        assert_eq!(view.track_title, "Song A");
        assert_eq!(view.thumbnail, None);

        let store = MemoryStore::with_entries([(keys::THUMBNAIL, to_base64(b"not an image"))]);
        assert_eq!(render_widget(&store, 1).await.thumbnail, None);
    }

    #[tokio::test]
    async fn test_invalid_play_state_reads_as_paused() {
        let store = MemoryStore::with_entries([(keys::IS_PLAYING, "yes")]);
        assert_eq!(render_widget(&store, 1).await.play_pause_icon, PlayPauseIcon::Play);
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get_string(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        async fn set_string(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_still_renders() {
        let view = render_widget(&BrokenStore, 3).await;
        assert_eq!(view.track_title, "No track playing");
        assert_eq!(view.play_pause_icon, PlayPauseIcon::Play);
        assert_eq!(view.click_intents.len(), 3);
    }
}
