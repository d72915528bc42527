//! Command channel server
use crate::routes::{create_router, AppState};
use anyhow::Result;
use nowplaying_media_session::MediaSession;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// HTTP command channel server
pub struct ControlServer {
    addr: SocketAddr,
    session: Arc<dyn MediaSession>,
    refresh: Arc<Notify>,
    server_handle: Option<JoinHandle<()>>,
}

impl ControlServer {
    /// Create a new control server
    ///
    /// # Arguments
    /// * `addr` - Address to bind to (e.g., "127.0.0.1:8765"); port 0 picks a free port
    /// * `session` - Media session the channel reads and drives
    pub fn new(addr: SocketAddr, session: Arc<dyn MediaSession>) -> Self {
        Self {
            addr,
            session,
            refresh: Arc::new(Notify::new()),
            server_handle: None,
        }
    }

    /// Signal raised after every successful media action
    pub fn refresh_signal(&self) -> Arc<Notify> {
        self.refresh.clone()
    }

    /// Start the control server
    pub async fn start(&mut self) -> Result<()> {
        let state = AppState {
            session: self.session.clone(),
            refresh: self.refresh.clone(),
        };

        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        self.addr = listener.local_addr()?;
        info!("Command channel listening on {}", self.addr);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Command channel server error: {}", e);
            }
        });

        self.server_handle = Some(handle);

        Ok(())
    }

    /// Stop the control server
    pub async fn stop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            info!("Stopping command channel");
            handle.abort();
        }
    }

    /// Get the server address; the bound address once started
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_running(&self) -> bool {
        self.server_handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}
