//! Keeps the persisted widget record in sync with the live media session

use crate::provider::WidgetProvider;
use anyhow::{Context, Result};
use chrono::Utc;
use nowplaying_core::artwork::to_base64;
use nowplaying_core::{keys, KeyValueStore, NowPlayingSnapshot, StoreError};
use nowplaying_media_session::{read_now_playing, MediaSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

/// Write `snapshot` under the keys the widget renders from
pub async fn save_snapshot(store: &dyn KeyValueStore, snapshot: &NowPlayingSnapshot) -> Result<(), StoreError> {
    let thumbnail = snapshot.artwork.as_deref().map(to_base64).unwrap_or_default();

    store.set_string(keys::TRACK, &snapshot.track).await?;
    store.set_string(keys::ARTIST, &snapshot.artist).await?;
    store.set_string(keys::THUMBNAIL, &thumbnail).await?;
    store.set_bool(keys::IS_PLAYING, snapshot.is_playing).await?;
    store.set_string(keys::UPDATED_AT, &Utc::now().to_rfc3339()).await?;
    Ok(())
}

pub struct SnapshotPublisher {
    session: Arc<dyn MediaSession>,
    store: Arc<dyn KeyValueStore>,
    provider: WidgetProvider,
    last: Mutex<Option<NowPlayingSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(session: Arc<dyn MediaSession>, store: Arc<dyn KeyValueStore>, provider: WidgetProvider) -> Self {
        Self {
            session,
            store,
            provider,
            last: Mutex::new(None),
        }
    }

    /// Read the session, store the snapshot and repaint the widgets.
    ///
    /// Returns whether the snapshot changed since the previous call; an
    /// unchanged snapshot is neither rewritten nor repainted.
    pub async fn publish(&self) -> Result<bool> {
        let session = self.session.clone();
        let snapshot = tokio::task::spawn_blocking(move || read_now_playing(session.as_ref()))
            .await
            .context("session reader task failed")?;

        let mut last = self.last.lock().await;
        if last.as_ref() == Some(&snapshot) {
            debug!("Now playing unchanged");
            return Ok(false);
        }

        save_snapshot(self.store.as_ref(), &snapshot)
            .await
            .context("failed to store now-playing snapshot")?;
        info!(
            "Now playing: {} - {} ({}, artwork: {})",
            snapshot.artist,
            snapshot.track,
            if snapshot.is_playing { "playing" } else { "paused" },
            snapshot.has_artwork()
        );
        *last = Some(snapshot);
        drop(last);

        self.provider.refresh_all().await;
        Ok(true)
    }

    /// Publish every `interval`, or as soon as `wake` is signalled, until
    /// the task is dropped
    pub async fn run(self: Arc<Self>, interval: Duration, wake: Arc<Notify>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wake.notified() => debug!("Publish requested"),
            }
            if let Err(e) = self.publish().await {
                warn!("Failed to publish now playing: {:#}", e);
            }
        }
    }
}
