//! Builds the now-playing snapshot from the first active controller

use crate::{MediaController, MediaSession, SessionError};
use nowplaying_core::artwork::encode_png;
use nowplaying_core::{NowPlayingSnapshot, PlaybackStatus};
use tracing::{debug, warn};

/// Read the current now-playing state.
///
/// Never fails: a missing session, a denied lookup or a failing backend all
/// produce the default snapshot, and artwork problems only drop the artwork.
pub fn read_now_playing(session: &dyn MediaSession) -> NowPlayingSnapshot {
    let controller = match session.first_controller() {
        Ok(Some(controller)) => controller,
        Ok(None) => {
            debug!("No active media session");
            return NowPlayingSnapshot::no_session();
        }
        Err(SessionError::PermissionDenied(reason)) => {
            warn!("Media session access denied: {}", reason);
            return NowPlayingSnapshot::no_session();
        }
        Err(e) => {
            warn!("Failed to look up media sessions: {}", e);
            return NowPlayingSnapshot::no_session();
        }
    };

    match snapshot_from(controller.as_ref()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Failed to read media session {}: {}", controller.id(), e);
            NowPlayingSnapshot::no_session()
        }
    }
}

fn snapshot_from(controller: &dyn MediaController) -> Result<NowPlayingSnapshot, SessionError> {
    let metadata = controller.metadata()?;

    let status = controller.playback_status().unwrap_or_else(|e| {
        warn!("Failed to get playback status from {}: {}", controller.id(), e);
        PlaybackStatus::Stopped
    });

    let artwork = match controller.artwork(&metadata) {
        Ok(Some(raw)) => match encode_png(&raw) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!("Failed to encode artwork from {}: {}", controller.id(), e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to load artwork from {}: {}", controller.id(), e);
            None
        }
    };

    debug!(
        "Now playing on {}: title={:?}, artist={:?}, status={:?}, artwork={}",
        controller.id(),
        metadata.title,
        metadata.artist,
        status,
        artwork.is_some()
    );

    Ok(NowPlayingSnapshot::from_session(metadata.title, metadata.artist, artwork, status))
}
