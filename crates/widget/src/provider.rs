//! Widget provider: repaints widgets on update and turns taps into transport commands

use crate::host::WidgetHost;
use crate::intent::{WidgetIntent, ACTION_APPWIDGET_UPDATE};
use crate::renderer::render_widget;
use nowplaying_core::{KeyValueStore, MediaAction};
use nowplaying_media_session::{dispatch_action, MediaSession, SessionError};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct WidgetProvider {
    store: Arc<dyn KeyValueStore>,
    session: Arc<dyn MediaSession>,
    host: Arc<dyn WidgetHost>,
}

impl WidgetProvider {
    pub fn new(store: Arc<dyn KeyValueStore>, session: Arc<dyn MediaSession>, host: Arc<dyn WidgetHost>) -> Self {
        Self { store, session, host }
    }

    /// Render each widget from the stored record and hand it to the host
    pub async fn on_update(&self, widget_ids: &[u32]) {
        for &widget_id in widget_ids {
            let view = render_widget(self.store.as_ref(), widget_id).await;
            self.host.update_widget(widget_id, view);
        }
    }

    /// Repaint every widget the host knows about
    pub async fn refresh_all(&self) {
        let ids = self.host.widget_ids();
        self.on_update(&ids).await;
    }

    /// Handle a broadcast intent
    pub async fn on_receive(&self, intent: &WidgetIntent) {
        if intent.action.parse::<MediaAction>().is_ok() {
            self.send_media_command(&intent.action).await;
            return;
        }

        match (intent.action.as_str(), intent.widget_id) {
            (ACTION_APPWIDGET_UPDATE, Some(widget_id)) => self.on_update(&[widget_id]).await,
            (ACTION_APPWIDGET_UPDATE, None) => debug!("Update intent without a widget id, ignoring"),
            (other, _) => debug!("Ignoring intent '{}'", other),
        }
    }

    /// Forward a tap to the media session.
    ///
    /// A broadcast has nobody to report to, so failures (permission denial
    /// included) end here as log lines.
    async fn send_media_command(&self, action: &str) {
        let session = self.session.clone();
        let tag = action.to_string();

        let result = tokio::task::spawn_blocking(move || dispatch_action(session.as_ref(), &tag)).await;

        match result {
            Ok(Ok(())) => debug!("Dispatched '{}' from widget", action),
            Ok(Err(SessionError::PermissionDenied(reason))) => {
                warn!("Media session access denied while handling '{}': {}", action, reason)
            }
            Ok(Err(e)) => warn!("Failed to dispatch '{}': {}", action, e),
            Err(e) => warn!("Dispatch task for '{}' failed: {}", action, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::WidgetRegistry;
    use crate::view::{ControlId, PlayPauseIcon};
    use nowplaying_core::{keys, MemoryStore, PlaybackStatus};
    use nowplaying_media_session::fake::{Command, FakeController, FakeSession};

    fn provider_with(session: FakeSession, store: MemoryStore) -> (WidgetProvider, Arc<WidgetRegistry>) {
        let registry = Arc::new(WidgetRegistry::with_widgets([1, 2]));
        let provider = WidgetProvider::new(Arc::new(store), Arc::new(session), registry.clone());
        (provider, registry)
    }

    #[tokio::test]
    async fn test_on_update_renders_each_widget() {
        let store = MemoryStore::with_entries([(keys::TRACK, "Song A"), (keys::IS_PLAYING, "true")]);
        let (provider, registry) = provider_with(FakeSession::empty(), store);

        provider.on_update(&[1]).await;
        let view = registry.view(1).expect("widget 1 should be rendered");
        assert_eq!(view.track_title, "Song A");
        assert_eq!(view.play_pause_icon, PlayPauseIcon::Pause);
        assert_eq!(registry.view(2), None);

        provider.refresh_all().await;
        assert!(registry.view(2).is_some());
    }

    #[tokio::test]
    async fn test_tap_dispatches_to_session() {
        let controller = FakeController::new("player").with_status(PlaybackStatus::Playing);
        let commands = controller.commands();
        let (provider, registry) = provider_with(FakeSession::with(controller), MemoryStore::new());

        provider.on_update(&[1]).await;
        let view = registry.view(1).unwrap();
        provider.on_receive(view.intent_for(ControlId::PlayPause).unwrap()).await;
        provider.on_receive(view.intent_for(ControlId::Next).unwrap()).await;

        assert_eq!(*commands.lock().unwrap(), vec![Command::Pause, Command::Next]);
    }

    #[tokio::test]
    async fn test_update_intent_refreshes_one_widget() {
        let store = MemoryStore::with_entries([(keys::TRACK, "Song A")]);
        let (provider, registry) = provider_with(FakeSession::empty(), store);

        provider.on_receive(&WidgetIntent::update(2)).await;
        assert_eq!(registry.view(2).unwrap().track_title, "Song A");
        assert_eq!(registry.view(1), None);

        provider
            .on_receive(&WidgetIntent {
                action: ACTION_APPWIDGET_UPDATE.to_string(),
                widget_id: None,
            })
            .await;
        assert_eq!(registry.view(1), None);
    }

    #[tokio::test]
    async fn test_permission_denied_is_swallowed() {
        let (provider, _registry) = provider_with(FakeSession::denied(), MemoryStore::new());
        provider.on_receive(&WidgetIntent::media(MediaAction::Next, 1)).await;
    }

    #[tokio::test]
    async fn test_unknown_intent_is_ignored() {
        let controller = FakeController::new("player");
        let commands = controller.commands();
        let (provider, registry) = provider_with(FakeSession::with(controller), MemoryStore::new());

        provider
            .on_receive(&WidgetIntent {
                action: "shuffle".to_string(),
                widget_id: Some(1),
            })
            .await;

        assert!(commands.lock().unwrap().is_empty());
        assert_eq!(registry.view(1), None);
    }
}
