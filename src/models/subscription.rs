//! Subscription requests and backend acknowledgements.

use serde::{Deserialize, Serialize};

use crate::models::TrackedType;

/// Body of `POST /subscribes/add`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest<'a> {
    pub token: &'a str,
    pub tracked_name: &'a str,
    pub tracked_type: TrackedType,
}

/// `{success, message}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl Default for Ack {
    /// An empty body counts as accepted.
    fn default() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

/// Entry of `GET /subscribes/{token}`: a bare name or an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionEntry {
    Name(String),
    Record {
        #[serde(alias = "name")]
        tracked_name: String,
    },
}

impl SubscriptionEntry {
    pub fn into_name(self) -> String {
        match self {
            SubscriptionEntry::Name(name) => name,
            SubscriptionEntry::Record { tracked_name } => tracked_name,
        }
    }
}

/// `GET /latest-release`: a bare version string or `{version}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReleaseInfo {
    Version(String),
    Record { version: String },
}

impl ReleaseInfo {
    pub fn into_version(self) -> String {
        match self {
            ReleaseInfo::Version(v) => v,
            ReleaseInfo::Record { version } => version,
        }
    }
}
