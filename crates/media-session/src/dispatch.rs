//! Forwards transport commands to the active media session

use crate::{MediaController, MediaSession, SessionError};
use nowplaying_core::{MediaAction, PlaybackStatus};
use tracing::{debug, info};

/// Dispatch an action tag to the first active controller.
///
/// Unknown tags and a missing controller are silent no-ops. Permission
/// denial is returned to the caller, which decides whether to report it.
pub fn dispatch_action(session: &dyn MediaSession, action: &str) -> Result<(), SessionError> {
    let action = match action.parse::<MediaAction>() {
        Ok(action) => action,
        Err(e) => {
            debug!("Ignoring {}", e);
            return Ok(());
        }
    };

    match session.first_controller()? {
        Some(controller) => perform_action(controller.as_ref(), action),
        None => {
            debug!("No active media session, ignoring '{}'", action);
            Ok(())
        }
    }
}

/// Invoke the transport command matching `action` on `controller`
pub fn perform_action(controller: &dyn MediaController, action: MediaAction) -> Result<(), SessionError> {
    info!("Sending {} to {}", action, controller.id());

    match action {
        MediaAction::Previous => controller.skip_to_previous(),
        MediaAction::Next => controller.skip_to_next(),
        MediaAction::PlayPause => match controller.playback_status()? {
            PlaybackStatus::Playing => controller.pause(),
            _ => controller.play(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Command, FakeController, FakeSession};

    #[test]
    fn test_play_pause_pauses_when_playing() {
        let controller = FakeController::new("player").with_status(PlaybackStatus::Playing);
        let commands = controller.commands();
        dispatch_action(&FakeSession::with(controller), "playPause").unwrap();
        assert_eq!(*commands.lock().unwrap(), vec![Command::Pause]);
    }

    #[test]
    fn test_play_pause_plays_when_not_playing() {
        for status in [PlaybackStatus::Paused, PlaybackStatus::Stopped] {
            let controller = FakeController::new("player").with_status(status);
            let commands = controller.commands();
            dispatch_action(&FakeSession::with(controller), "playPause").unwrap();
            assert_eq!(*commands.lock().unwrap(), vec![Command::Play]);
        }
    }

    #[test]
    fn test_skip_commands_are_unconditional() {
        let controller = FakeController::new("player").with_status(PlaybackStatus::Stopped);
        let commands = controller.commands();
        let session = FakeSession::with(controller);

        dispatch_action(&session, "previous").unwrap();
        dispatch_action(&session, "next").unwrap();

        assert_eq!(*commands.lock().unwrap(), vec![Command::Previous, Command::Next]);
    }

    #[test]
    fn test_only_first_controller_is_driven() {
        let first = FakeController::new("first");
        let second = FakeController::new("second");
        let first_commands = first.commands();
        let second_commands = second.commands();

        dispatch_action(&FakeSession::with_all(vec![first, second]), "next").unwrap();

        assert_eq!(*first_commands.lock().unwrap(), vec![Command::Next]);
        assert!(second_commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_action_is_a_no_op() {
        let controller = FakeController::new("player");
        let commands = controller.commands();
        assert!(dispatch_action(&FakeSession::with(controller), "rewind").is_ok());
        assert!(commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_action_ignores_denied_session() {
        assert!(dispatch_action(&FakeSession::denied(), "rewind").is_ok());
        assert!(dispatch_action(&FakeSession::denied(), "").is_ok());
    }

    #[test]
    fn test_no_session_is_a_no_op() {
        assert!(dispatch_action(&FakeSession::empty(), "next").is_ok());
    }

    #[test]
    fn test_permission_denied_is_returned() {
        let result = dispatch_action(&FakeSession::denied(), "next");
        assert!(matches!(result, Err(SessionError::PermissionDenied(_))));
    }

    #[test]
    fn test_perform_action_directly() {
        let controller = FakeController::new("player").with_status(PlaybackStatus::Playing);
        let commands = controller.commands();
        perform_action(&controller, MediaAction::PlayPause).unwrap();
        perform_action(&controller, MediaAction::Previous).unwrap();
        assert_eq!(*commands.lock().unwrap(), vec![Command::Pause, Command::Previous]);
    }
}
