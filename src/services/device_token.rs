// src/services/device_token.rs

//! Push token acquisition.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::{self, KeyValueStore, keys};

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Authorized | Self::Provisional)
    }
}

/// Platform push service.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Register the device for remote notifications.
    async fn register_for_remote(&self) -> Result<()>;

    async fn permission_status(&self) -> Result<PermissionStatus>;

    /// Prompt for permission and return the resulting status.
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Current device token.
    async fn token(&self) -> Result<String>;
}

/// Caches the device token across runs.
#[derive(Clone)]
pub struct DeviceTokenCache {
    store: Arc<dyn KeyValueStore>,
    provider: Option<Arc<dyn PushProvider>>,
}

impl DeviceTokenCache {
    /// `provider` is `None` on platforms without native push.
    pub fn new(store: Arc<dyn KeyValueStore>, provider: Option<Arc<dyn PushProvider>>) -> Self {
        Self { store, provider }
    }

    /// Cached token, or a freshly acquired one.
    pub async fn acquire(&self) -> Result<String> {
        if let Some(token) = storage::load_string(self.store.as_ref(), keys::DEVICE_TOKEN).await {
            return Ok(token);
        }

        let Some(provider) = &self.provider else {
            return Ok(self.web_token().await);
        };

        provider.register_for_remote().await.map_err(provider_error)?;

        let mut status = provider.permission_status().await.map_err(provider_error)?;
        if !status.is_granted() {
            status = provider.request_permission().await.map_err(provider_error)?;
        }
        if !status.is_granted() {
            log::warn!("Push permission not granted ({:?})", status);
            return Err(AppError::PermissionDenied);
        }

        let token = provider.token().await.map_err(provider_error)?;
        storage::save_string(self.store.as_ref(), keys::DEVICE_TOKEN, &token).await;
        log::info!("Acquired device token");
        Ok(token)
    }

    /// Pseudo-token for web clients, generated once.
    async fn web_token(&self) -> String {
        if let Some(token) = storage::load_string(self.store.as_ref(), keys::WEB_PUSH_TOKEN).await {
            return token;
        }
        let token = format!("web-{}", Uuid::new_v4());
        storage::save_string(self.store.as_ref(), keys::WEB_PUSH_TOKEN, &token).await;
        log::info!("Generated web push token");
        token
    }
}

fn provider_error(err: AppError) -> AppError {
    match err {
        AppError::PushProvider(_) | AppError::PermissionDenied => err,
        other => AppError::push_provider(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::testing::BrokenStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        status: PermissionStatus,
        after_prompt: PermissionStatus,
        token: Option<String>,
        prompts: AtomicUsize,
        token_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(status: PermissionStatus, after_prompt: PermissionStatus) -> Self {
            Self {
                status,
                after_prompt,
                token: Some("apns-123".to_string()),
                prompts: AtomicUsize::new(0),
                token_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PushProvider for FakeProvider {
        async fn register_for_remote(&self) -> Result<()> {
            Ok(())
        }

        async fn permission_status(&self) -> Result<PermissionStatus> {
            Ok(self.status)
        }

        async fn request_permission(&self) -> Result<PermissionStatus> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.after_prompt)
        }

        async fn token(&self) -> Result<String> {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            self.token
                .clone()
                .ok_or_else(|| AppError::Unexpected("no token".into()))
        }
    }

    #[tokio::test]
    async fn authorized_provider_token_is_cached() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(FakeProvider::new(
            PermissionStatus::Authorized,
            PermissionStatus::Authorized,
        ));
        let cache = DeviceTokenCache::new(store.clone(), Some(provider.clone()));

        assert_eq!(cache.acquire().await.unwrap(), "apns-123");
        assert_eq!(cache.acquire().await.unwrap(), "apns-123");
        assert_eq!(provider.token_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prompts_when_not_determined() {
        let provider = Arc::new(FakeProvider::new(
            PermissionStatus::NotDetermined,
            PermissionStatus::Provisional,
        ));
        let cache = DeviceTokenCache::new(Arc::new(MemoryStore::new()), Some(provider.clone()));

        assert_eq!(cache.acquire().await.unwrap(), "apns-123");
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn denied_permission_fails() {
        let provider = Arc::new(FakeProvider::new(
            PermissionStatus::NotDetermined,
            PermissionStatus::Denied,
        ));
        let cache = DeviceTokenCache::new(Arc::new(MemoryStore::new()), Some(provider.clone()));

        assert!(matches!(cache.acquire().await, Err(AppError::PermissionDenied)));
        assert_eq!(provider.token_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_push_provider_error() {
        let mut fake = FakeProvider::new(PermissionStatus::Authorized, PermissionStatus::Authorized);
        fake.token = None;
        let cache = DeviceTokenCache::new(Arc::new(MemoryStore::new()), Some(Arc::new(fake)));

        assert!(matches!(cache.acquire().await, Err(AppError::PushProvider(_))));
    }

    #[tokio::test]
    async fn web_fallback_is_generated_once() {
        let store = Arc::new(MemoryStore::new());
        let cache = DeviceTokenCache::new(store.clone(), None);

        let first = cache.acquire().await.unwrap();
        assert!(first.starts_with("web-"));
        assert_eq!(first.len(), "web-".len() + 36);
        assert_eq!(cache.acquire().await.unwrap(), first);
        assert_eq!(
            store.get(keys::WEB_PUSH_TOKEN).await.unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn cached_device_token_wins() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::DEVICE_TOKEN, "stored").await.unwrap();
        let cache = DeviceTokenCache::new(store, None);

        assert_eq!(cache.acquire().await.unwrap(), "stored");
    }

    #[tokio::test]
    async fn write_failure_still_returns_token() {
        let provider = Arc::new(FakeProvider::new(
            PermissionStatus::Authorized,
            PermissionStatus::Authorized,
        ));
        let cache = DeviceTokenCache::new(Arc::new(BrokenStore), Some(provider));

        assert_eq!(cache.acquire().await.unwrap(), "apns-123");
    }
}
