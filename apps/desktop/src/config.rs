use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "nowplaying";

/// Settings read from `<config_dir>/nowplaying/config.toml`; every field is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between session polls
    pub refresh_interval_secs: u64,
    pub control_api_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Widgets placed on first start
    pub widget_ids: Vec<u32>,
    pub request_access_on_start: bool,
    /// Also write a daily rolling log file here
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 2,
            control_api_addr: SocketAddr::from(([127, 0, 0, 1], 8765)),
            db_path: app_dir().join("widget.db"),
            widget_ids: vec![1],
            request_access_on_start: true,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load `path`, or the default location; a missing file yields the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be at least 1");
        }
        Ok(config)
    }
}

fn app_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}
