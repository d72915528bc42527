mod config;
mod setup;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use nowplaying_command_api::{ControlServer, MediaInfo};
use nowplaying_core::KeyValueStore;
use nowplaying_media_session::{create_media_session, dispatch_action, read_now_playing, MediaSession};
use nowplaying_persistence::{init_db, WidgetDataRepository, WidgetInstanceRepository};
use nowplaying_widget::{SnapshotPublisher, WidgetApp, WidgetProvider, WidgetRegistry};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Now-playing widget for the desktop
#[derive(Parser, Debug)]
#[command(name = "nowplaying", version, about)]
struct Cli {
    /// Config file (default: <config_dir>/nowplaying/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the widget database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Override the command channel address
    #[arg(long, global = true)]
    addr: Option<SocketAddr>,

    /// Skip the startup access check
    #[arg(long, global = true)]
    skip_setup: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Widget window, command channel and refresh loop (default)
    Run,
    /// Print the current snapshot as JSON
    Info,
    /// Send previous, playPause or next to the active player
    Action { action: String },
    /// Command channel and refresh loop without a window
    Serve,
    /// Run the access check and exit
    Setup,
    /// Place a widget with the given id
    Place { widget_id: u32 },
    /// Remove a placed widget
    Remove { widget_id: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(addr) = cli.addr {
        config.control_api_addr = addr;
    }

    let _log_guard = init_logging(config.log_dir.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Run);
    let session: Arc<dyn MediaSession> = Arc::from(create_media_session());

    match command {
        Commands::Setup => {
            setup::request_access()?;
            Ok(())
        }
        Commands::Info => print_info(session).await,
        Commands::Action { action } => run_action(session, action).await,
        Commands::Place { widget_id } => {
            let instances = open_instances(&config.db_path).await?;
            instances.register(widget_id).await?;
            println!("Placed widgets: {:?}", instances.list_all().await?);
            Ok(())
        }
        Commands::Remove { widget_id } => {
            let instances = open_instances(&config.db_path).await?;
            if !instances.unregister(widget_id).await? {
                anyhow::bail!("no widget with id {} is placed", widget_id);
            }
            println!("Placed widgets: {:?}", instances.list_all().await?);
            Ok(())
        }
        Commands::Serve | Commands::Run => {
            if config.request_access_on_start && !cli.skip_setup {
                if let Err(e) = setup::request_access() {
                    tracing::warn!("Startup access check failed: {:#}", e);
                }
            }

            let services = Services::start(&config, session).await?;
            if command == Commands::Serve {
                serve(services).await
            } else {
                run_window(services)
            }
        }
    }
}

/// Console output plus an optional daily rolling file
fn init_logging(log_dir: Option<&Path>) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "nowplaying.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nowplaying=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn print_info(session: Arc<dyn MediaSession>) -> Result<()> {
    let snapshot = tokio::task::spawn_blocking(move || read_now_playing(session.as_ref())).await?;
    println!("{}", serde_json::to_string_pretty(&MediaInfo::from(&snapshot))?);
    Ok(())
}

async fn run_action(session: Arc<dyn MediaSession>, action: String) -> Result<()> {
    let result = tokio::task::spawn_blocking(move || dispatch_action(session.as_ref(), &action)).await?;
    if let Err(e) = &result {
        if e.is_permission_denied() {
            tracing::warn!("Run `nowplaying setup` to grant media session access");
        }
    }
    result.context("failed to perform media action")
}

async fn open_instances(db_path: &Path) -> Result<WidgetInstanceRepository> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(WidgetInstanceRepository::new(init_db(db_path).await?))
}

/// Everything the window and headless modes share
struct Services {
    registry: Arc<WidgetRegistry>,
    provider: WidgetProvider,
    publisher: Arc<SnapshotPublisher>,
    server: ControlServer,
}

impl Services {
    async fn start(config: &AppConfig, session: Arc<dyn MediaSession>) -> Result<Self> {
        tracing::info!("Database path: {}", config.db_path.display());
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let pool = init_db(&config.db_path).await?;

        // Configured widgets are only placed while nothing is placed yet
        let instances = WidgetInstanceRepository::new(pool.clone());
        let mut widget_ids = instances.list_all().await?;
        if widget_ids.is_empty() {
            for widget_id in &config.widget_ids {
                instances.register(*widget_id).await?;
            }
            widget_ids = instances.list_all().await?;
        }
        tracing::info!("Placed widgets: {:?}", widget_ids);

        let store: Arc<dyn KeyValueStore> = Arc::new(WidgetDataRepository::new(pool));
        let registry = Arc::new(WidgetRegistry::with_widgets(widget_ids.iter().copied()));
        let provider = WidgetProvider::new(store.clone(), session.clone(), registry.clone());
        let publisher = Arc::new(SnapshotPublisher::new(session.clone(), store, provider.clone()));

        // Paint whatever was stored by the previous run before the first poll
        provider.on_update(&widget_ids).await;

        let mut server = ControlServer::new(config.control_api_addr, session);
        server.start().await?;

        tokio::spawn(
            publisher
                .clone()
                .run(Duration::from_secs(config.refresh_interval_secs), server.refresh_signal()),
        );

        Ok(Self {
            registry,
            provider,
            publisher,
            server,
        })
    }
}

async fn serve(mut services: Services) -> Result<()> {
    tracing::info!("Serving command channel on {} (Ctrl+C to stop)", services.server.addr());
    tokio::signal::ctrl_c().await?;
    services.server.stop().await;
    Ok(())
}

fn run_window(services: Services) -> Result<()> {
    tracing::info!("Launching widget window...");

    let Services {
        registry,
        provider,
        publisher,
        server,
    } = services;
    let app = WidgetApp::new(registry, provider, publisher, tokio::runtime::Handle::current());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([360.0, 140.0])
            .with_min_inner_size([280.0, 110.0])
            .with_title("Now Playing"),
        ..Default::default()
    };

    eframe::run_native("Now Playing", native_options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    drop(server);
    Ok(())
}
