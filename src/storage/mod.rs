//! Key-value persistence for offline caches.
//!
//! Values are strings, JSON-encoded where structured. The helpers at the
//! bottom of this module implement the local-state policy: a read or parse
//! failure is a cache miss and a write failure is logged, never surfaced.
//!
//! ## Keys
//!
//! ```text
//! groupsCache / teachersCache / cabinetsCache   sorted name lists
//! scheduleCache                                  {"{type}:{name}": [day, ...]}
//! lastTarget                                     {"type": ..., "name": ...}
//! notificationsCache                             [{..., "cachedAt": ms}, ...]
//! favorites                                      [target, ...]
//! deviceToken / webPushToken                     plain strings
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::models::DirectoryKind;

pub use local::FileStore;
pub use memory::MemoryStore;

/// Persisted key names.
pub mod keys {
    pub const GROUPS: &str = "groupsCache";
    pub const TEACHERS: &str = "teachersCache";
    pub const CABINETS: &str = "cabinetsCache";
    pub const SCHEDULE: &str = "scheduleCache";
    pub const LAST_TARGET: &str = "lastTarget";
    pub const NOTIFICATIONS: &str = "notificationsCache";
    pub const FAVORITES: &str = "favorites";
    pub const DEVICE_TOKEN: &str = "deviceToken";
    pub const WEB_PUSH_TOKEN: &str = "webPushToken";

    use crate::models::DirectoryKind;

    pub fn directory(kind: DirectoryKind) -> &'static str {
        match kind {
            DirectoryKind::Groups => GROUPS,
            DirectoryKind::Teachers => TEACHERS,
            DirectoryKind::Cabinets => CABINETS,
        }
    }
}

/// Trait for string key-value backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and parse a JSON value. Any failure reads as a miss.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            log::warn!("Cache read failed for {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Cache entry {} is corrupt, ignoring: {}", key, e);
            None
        }
    }
}

/// Serialize and write a JSON value. Returns whether the write landed.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> bool {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Cache entry {} could not be encoded: {}", key, e);
            return false;
        }
    };

    match store.set(key, &raw).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Cache write failed for {}: {}", key, e);
            false
        }
    }
}

/// Read a plain string value. Failures read as a miss.
pub async fn load_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            log::warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

/// Write a plain string value, logging failures.
pub async fn save_string(store: &dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Cache write failed for {}: {}", key, e);
            false
        }
    }
}

/// Delete a key, logging failures.
pub async fn remove_key(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key).await {
        log::warn!("Cache remove failed for {}: {}", key, e);
    }
}

/// Cached directory list for a kind.
pub async fn load_directory(store: &dyn KeyValueStore, kind: DirectoryKind) -> Option<Vec<String>> {
    load_json(store, keys::directory(kind)).await
}

#[cfg(test)]
pub mod testing {
    //! Store that fails every operation.

    use super::*;
    use crate::error::AppError;

    pub struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Err(AppError::storage(key, "disk unavailable"))
        }

        async fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(AppError::storage(key, "disk unavailable"))
        }

        async fn remove(&self, key: &str) -> Result<()> {
            Err(AppError::storage(key, "disk unavailable"))
        }
    }
}
