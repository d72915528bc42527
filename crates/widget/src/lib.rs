pub mod app;
pub mod host;
pub mod intent;
pub mod paint;
pub mod provider;
pub mod publisher;
pub mod renderer;
pub mod view;

pub use app::WidgetApp;
pub use host::{WidgetHost, WidgetRegistry};
pub use intent::{WidgetIntent, ACTION_APPWIDGET_UPDATE};
pub use provider::WidgetProvider;
pub use publisher::{save_snapshot, SnapshotPublisher};
pub use renderer::render_widget;
pub use view::{ControlId, PlayPauseIcon, WidgetView};
