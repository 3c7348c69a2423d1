// src/services/releases.rs

//! Update checks against `/latest-release`.

use semver::Version;

use crate::error::{AppError, Result};
use crate::services::BackendClient;

/// Parse a version, tolerating a leading `v`.
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(bare).map_err(|e| AppError::validation(format!("invalid version {raw:?}: {e}")))
}

#[derive(Clone)]
pub struct ReleaseChecker {
    backend: BackendClient,
}

impl ReleaseChecker {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn latest_release(&self) -> Result<String> {
        self.backend.latest_release().await
    }

    /// `Some(latest)` when the published release is newer than `current`.
    pub async fn check_for_update(&self, current: &str) -> Result<Option<String>> {
        let current_version = parse_version(current)?;
        let latest = self.latest_release().await?;
        let latest_version = parse_version(&latest)?;

        if latest_version > current_version {
            log::info!("Update available: {} -> {}", current_version, latest_version);
            Ok(Some(latest))
        } else {
            Ok(None)
        }
    }
}
