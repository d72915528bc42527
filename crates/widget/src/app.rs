use crate::host::{WidgetHost, WidgetRegistry};
use crate::intent::WidgetIntent;
use crate::paint::WidgetPainter;
use crate::provider::WidgetProvider;
use crate::publisher::SnapshotPublisher;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Window hosting the placed widgets
pub struct WidgetApp {
    registry: Arc<WidgetRegistry>,
    provider: WidgetProvider,
    publisher: Arc<SnapshotPublisher>,

    /// Runtime the tap handlers are spawned on
    runtime: Handle,

    painters: BTreeMap<u32, WidgetPainter>,
}

impl WidgetApp {
    pub fn new(
        registry: Arc<WidgetRegistry>,
        provider: WidgetProvider,
        publisher: Arc<SnapshotPublisher>,
        runtime: Handle,
    ) -> Self {
        Self {
            registry,
            provider,
            publisher,
            runtime,
            painters: BTreeMap::new(),
        }
    }

    /// Deliver a tap, then publish right away so the widget reflects it
    fn deliver(&self, intent: WidgetIntent) {
        let provider = self.provider.clone();
        let publisher = self.publisher.clone();

        self.runtime.spawn(async move {
            provider.on_receive(&intent).await;
            if let Err(e) = publisher.publish().await {
                tracing::warn!("Failed to publish after '{}': {:#}", intent.action, e);
            }
        });
    }
}

impl eframe::App for WidgetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut tapped = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            let ids = self.registry.widget_ids();
            if ids.is_empty() {
                ui.label("No widgets placed");
            }

            for widget_id in ids {
                match self.registry.view(widget_id) {
                    Some(view) => {
                        let painter = self.painters.entry(widget_id).or_default();
                        if let Some(intent) = painter.show(ui, &view) {
                            tapped.push(intent);
                        }
                    }
                    None => {
                        ui.weak("Waiting for media session…");
                    }
                }
                ui.separator();
            }
        });

        for intent in tapped {
            tracing::debug!("Widget tap: {}", intent.to_uri());
            self.deliver(intent);
        }

        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
