//! Server-delivered notifications and their cached form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A notification about a schedule change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server identifier (number or string, kept as sent)
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub couple: Option<Value>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub lesson: Option<String>,
    #[serde(default)]
    pub cabinet: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub combined: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Notification as persisted locally, stamped for expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedNotification {
    #[serde(flatten)]
    pub notification: Notification,

    /// Epoch milliseconds when the entry was written
    #[serde(rename = "cachedAt")]
    pub cached_at: i64,
}

impl CachedNotification {
    pub fn new(notification: Notification, cached_at: i64) -> Self {
        Self {
            notification,
            cached_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cached_form_is_flat() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 7,
            "name": "ИС-21",
            "couple": 2,
            "lesson": "Физика",
            "cabinet": "214",
        }))
        .unwrap();

        let cached = CachedNotification::new(notification.clone(), 1_700_000_000_000);
        let value = serde_json::to_value(&cached).unwrap();
        assert_eq!(value["cachedAt"], json!(1_700_000_000_000i64));
        assert_eq!(value["lesson"], json!("Физика"));

        let back: CachedNotification = serde_json::from_value(value).unwrap();
        assert_eq!(back.notification, notification);
    }
}
