//! Broadcast intents routed from widget taps (and host refreshes) to the provider

use nowplaying_core::MediaAction;

/// Intent action asking the provider to repaint one widget
pub const ACTION_APPWIDGET_UPDATE: &str = "APPWIDGET_UPDATE";

const URI_PREFIX: &str = "homewidget://media_action?";

/// An action tag addressed to a widget instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetIntent {
    pub action: String,
    pub widget_id: Option<u32>,
}

impl WidgetIntent {
    /// Intent fired by tapping a transport control
    pub fn media(action: MediaAction, widget_id: u32) -> Self {
        Self {
            action: action.as_str().to_string(),
            widget_id: Some(widget_id),
        }
    }

    /// Intent asking for a repaint of `widget_id`
    pub fn update(widget_id: u32) -> Self {
        Self {
            action: ACTION_APPWIDGET_UPDATE.to_string(),
            widget_id: Some(widget_id),
        }
    }

    /// `homewidget://media_action?action=<tag>&widgetId=<id>`
    pub fn to_uri(&self) -> String {
        let mut uri = format!("{}action={}", URI_PREFIX, urlencoding::encode(&self.action));
        if let Some(id) = self.widget_id {
            uri.push_str(&format!("&widgetId={}", id));
        }
        uri
    }

    /// Parse an intent URI; unknown query parameters are ignored
    pub fn from_uri(uri: &str) -> Option<Self> {
        let query = uri.strip_prefix(URI_PREFIX)?;
        let mut action = None;
        let mut widget_id = None;

        for pair in query.split('&') {
            let (name, value) = match pair.split_once('=') {
                Some(parts) => parts,
                None => continue,
            };
            let value = urlencoding::decode(value).ok()?.into_owned();
            match name {
                "action" => action = Some(value),
                "widgetId" => widget_id = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self {
            action: action?,
            widget_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_intent_uri() {
        let intent = WidgetIntent::media(MediaAction::PlayPause, 42);
        assert_eq!(intent.to_uri(), "homewidget://media_action?action=playPause&widgetId=42");
        assert_eq!(WidgetIntent::from_uri(&intent.to_uri()), Some(intent));
    }

    #[test]
    fn test_parse_without_widget_id() {
        let intent = WidgetIntent::from_uri("homewidget://media_action?action=next").unwrap();
        assert_eq!(intent.action, "next");
        assert_eq!(intent.widget_id, None);
    }

    #[test]
    fn test_parse_ignores_unknown_parameters() {
        let intent = WidgetIntent::from_uri("homewidget://media_action?foo=bar&widgetId=3&action=previous").unwrap();
        assert_eq!(intent, WidgetIntent::media(MediaAction::Previous, 3));
    }

    #[test]
    fn test_parse_rejects_foreign_uris() {
        assert_eq!(WidgetIntent::from_uri("https://example.com/?action=next"), None);
        assert_eq!(WidgetIntent::from_uri("homewidget://media_action?widgetId=1"), None);
    }

    #[test]
    fn test_action_is_percent_encoded() {
        let intent = WidgetIntent {
            action: "a b&c".to_string(),
            widget_id: Some(1),
        };
        assert_eq!(WidgetIntent::from_uri(&intent.to_uri()), Some(intent));
    }
}
