// src/client.rs

//! Entry point wiring configuration, transport and store into services.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{
    BackendClient, DeviceTokenCache, DirectoryService, NotificationCache, NotificationService,
    Preferences, PushProvider, ReleaseChecker, ScheduleLoader, ScheduleService,
    SubscriptionManager,
};
use crate::storage::{FileStore, KeyValueStore};
use crate::utils::http::{ReqwestTransport, Transport};

/// Schedule backend client with offline caches.
#[derive(Clone)]
pub struct ScheduleClient {
    config: Arc<Config>,
    backend: BackendClient,
    store: Arc<dyn KeyValueStore>,
    schedules: ScheduleLoader,
}

impl ScheduleClient {
    pub fn new(config: Config, transport: Arc<dyn Transport>, store: Arc<dyn KeyValueStore>) -> Self {
        let backend = BackendClient::new(transport);
        let schedules = ScheduleLoader::new(ScheduleService::new(
            backend.clone(),
            Arc::clone(&store),
            config.schedule.clone(),
        ));
        Self {
            config: Arc::new(config),
            backend,
            store,
            schedules,
        }
    }

    /// reqwest transport and a file store under `config.storage.dir`.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::from_config(&config.backend)?);
        let store = Arc::new(FileStore::new(&config.storage.dir));
        log::debug!(
            "Backend {} with cache in {}",
            config.backend.base_url,
            config.storage.dir.display()
        );
        Ok(Self::new(config, transport, store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn directory(&self) -> DirectoryService {
        DirectoryService::new(self.backend.clone(), self.store())
    }

    /// Shared loader; every load through it supersedes the previous one.
    pub fn schedules(&self) -> &ScheduleLoader {
        &self.schedules
    }

    pub fn notifications(&self) -> NotificationService {
        let cache = NotificationCache::new(self.store(), self.config.notifications.retention_days);
        NotificationService::new(self.backend.clone(), cache)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.store())
    }

    pub fn releases(&self) -> ReleaseChecker {
        ReleaseChecker::new(self.backend.clone())
    }

    pub fn subscriptions(&self, token: impl Into<String>) -> SubscriptionManager {
        SubscriptionManager::new(self.backend.clone(), token)
    }

    pub fn device_tokens(&self, provider: Option<Arc<dyn PushProvider>>) -> DeviceTokenCache {
        DeviceTokenCache::new(self.store(), provider)
    }
}
