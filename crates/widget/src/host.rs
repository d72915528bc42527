//! The widget host: holds the latest view of every placed widget

use crate::view::WidgetView;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Receiver of rendered views (the launcher / window painting the widgets)
pub trait WidgetHost: Send + Sync {
    /// Replace the view shown for `widget_id`
    fn update_widget(&self, widget_id: u32, view: WidgetView);

    /// Ids of the placed widgets
    fn widget_ids(&self) -> Vec<u32>;
}

/// In-process widget host
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    views: RwLock<BTreeMap<u32, Option<WidgetView>>>,
}

impl WidgetRegistry {
    pub fn with_widgets(ids: impl IntoIterator<Item = u32>) -> Self {
        let registry = Self::default();
        for id in ids {
            registry.add_widget(id);
        }
        registry
    }

    /// Place a widget; it has no view until the first update
    pub fn add_widget(&self, widget_id: u32) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(widget_id)
            .or_insert(None);
    }

    /// Latest view of `widget_id`, if it has been rendered
    pub fn view(&self, widget_id: u32) -> Option<WidgetView> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&widget_id)
            .cloned()
            .flatten()
    }
}

impl WidgetHost for WidgetRegistry {
    fn update_widget(&self, widget_id: u32, view: WidgetView) {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(widget_id, Some(view));
    }

    fn widget_ids(&self) -> Vec<u32> {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}
