//! Cover art retrieval from the locations media players advertise
//!
//! MPRIS players usually point at a local `file://` path; streaming players
//! (and Spotify on macOS) hand out `http(s)://` URLs.

use crate::SessionError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Load the raw bytes behind an artwork location
pub fn fetch_artwork(url: &str) -> Result<Vec<u8>, SessionError> {
    if let Some(path) = file_url_path(url) {
        debug!("Reading artwork from {}", path.display());
        return Ok(std::fs::read(path)?);
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        debug!("Fetching artwork from {}", url);
        return fetch_remote(url);
    }

    Err(SessionError::Backend(format!("unsupported artwork location: {}", url)))
}

/// Local path of a `file://` URL, percent-decoded
fn file_url_path(url: &str) -> Option<PathBuf> {
    let raw = url.strip_prefix("file://")?;
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(PathBuf::from(decoded))
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, SessionError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| SessionError::Backend(format!("failed to build HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| SessionError::Backend(format!("artwork request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(SessionError::Backend(format!(
            "artwork request returned {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| SessionError::Backend(format!("failed to read artwork body: {}", e)))?;
    Ok(bytes.to_vec())
}
