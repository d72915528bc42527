//! The widget's view tree, handed to the host for painting

use crate::intent::WidgetIntent;
use nowplaying_core::artwork::DecodedArtwork;
use nowplaying_core::MediaAction;
use std::collections::BTreeMap;

/// Clickable regions of the widget layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlId {
    Previous,
    PlayPause,
    Next,
}

impl ControlId {
    pub const ALL: [ControlId; 3] = [ControlId::Previous, ControlId::PlayPause, ControlId::Next];

    pub fn action(self) -> MediaAction {
        match self {
            ControlId::Previous => MediaAction::Previous,
            ControlId::PlayPause => MediaAction::PlayPause,
            ControlId::Next => MediaAction::Next,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ControlId::Previous => "⏮",
            ControlId::PlayPause => "⏯",
            ControlId::Next => "⏭",
        }
    }
}

/// Image shown on the play/pause control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseIcon {
    Play,
    Pause,
}

impl PlayPauseIcon {
    /// Show "pause" while playing, "play" otherwise
    pub fn for_state(is_playing: bool) -> Self {
        if is_playing {
            PlayPauseIcon::Pause
        } else {
            PlayPauseIcon::Play
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PlayPauseIcon::Play => "▶",
            PlayPauseIcon::Pause => "⏸",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayPauseIcon::Play => "play",
            PlayPauseIcon::Pause => "pause",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub widget_id: u32,
    pub track_title: String,
    pub artist_name: String,
    pub thumbnail: Option<DecodedArtwork>,
    pub play_pause_icon: PlayPauseIcon,
    /// Intent fired when each control is tapped
    pub click_intents: BTreeMap<ControlId, WidgetIntent>,
}

impl WidgetView {
    pub fn new(widget_id: u32) -> Self {
        Self {
            widget_id,
            track_title: String::new(),
            artist_name: String::new(),
            thumbnail: None,
            play_pause_icon: PlayPauseIcon::Play,
            click_intents: BTreeMap::new(),
        }
    }

    /// Bind every control to the intent carrying its action and this widget's id
    pub fn bind_controls(&mut self) {
        for control in ControlId::ALL {
            self.click_intents
                .insert(control, WidgetIntent::media(control.action(), self.widget_id));
        }
    }

    pub fn intent_for(&self, control: ControlId) -> Option<&WidgetIntent> {
        self.click_intents.get(&control)
    }
}
