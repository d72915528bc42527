//! One-time check of the platform prerequisites for reading media sessions

use anyhow::Result;

/// Result of the startup access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessStatus {
    /// Nothing to do on this platform
    Ready,
    /// The user was sent to a settings screen to grant access
    Requested,
    /// A prerequisite is missing; reads will fall back to defaults
    Unavailable(String),
}

/// Verify access to media sessions and, where the platform has a settings
/// screen for it, open that screen.
pub fn request_access() -> Result<AccessStatus> {
    let status = platform::request_access()?;
    match &status {
        AccessStatus::Ready => tracing::info!("Media session access available"),
        AccessStatus::Requested => tracing::info!("Opened system settings to grant media session access"),
        AccessStatus::Unavailable(reason) => tracing::warn!("Media session access unavailable: {}", reason),
    }
    Ok(status)
}

#[cfg(target_os = "linux")]
mod platform {
    use super::AccessStatus;
    use anyhow::Result;
    use std::process::Command;

    pub fn request_access() -> Result<AccessStatus> {
        // MPRIS is read over the session bus through dbus-send
        match Command::new("dbus-send").arg("--help").output() {
            Ok(_) => {}
            Err(e) => return Ok(AccessStatus::Unavailable(format!("dbus-send not found: {}", e))),
        }

        if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_none() {
            return Ok(AccessStatus::Unavailable("no D-Bus session bus".to_string()));
        }

        Ok(AccessStatus::Ready)
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::AccessStatus;
    use anyhow::{Context, Result};
    use std::process::Command;

    const AUTOMATION_PANE: &str = "x-apple.systempreferences:com.apple.preference.security?Privacy_Automation";

    pub fn request_access() -> Result<AccessStatus> {
        if !needs_automation_consent()? {
            return Ok(AccessStatus::Ready);
        }

        let status = Command::new("open")
            .arg(AUTOMATION_PANE)
            .status()
            .context("failed to open System Settings")?;
        if !status.success() {
            return Ok(AccessStatus::Unavailable("could not open the Automation privacy pane".to_string()));
        }
        Ok(AccessStatus::Requested)
    }

    /// Apple Events consent exists since 10.14
    fn needs_automation_consent() -> Result<bool> {
        let output = Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .context("failed to run sw_vers")?;
        let version = String::from_utf8_lossy(&output.stdout);
        Ok(super::version_at_least(version.trim(), (10, 14)))
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::AccessStatus;
    use anyhow::Result;

    pub fn request_access() -> Result<AccessStatus> {
        tracing::debug!("SMTC sessions need no user consent");
        Ok(AccessStatus::Ready)
    }
}

/// Compare a dotted version string against `(major, minor)`; unparsable is treated as new
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
fn version_at_least(version: &str, (major, minor): (u32, u32)) -> bool {
    let mut parts = version.split('.').map(|p| p.parse::<u32>());
    match (parts.next(), parts.next()) {
        (Some(Ok(v_major)), Some(Ok(v_minor))) => (v_major, v_minor) >= (major, minor),
        (Some(Ok(v_major)), None) => v_major > major || (v_major == major && minor == 0),
        _ => true,
    }
}
