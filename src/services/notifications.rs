// src/services/notifications.rs

//! Time-bounded local copy of server notifications.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::models::{CachedNotification, Notification};
use crate::services::BackendClient;
use crate::storage::{self, KeyValueStore, keys};

/// Notification cache with wall-clock expiry.
#[derive(Clone)]
pub struct NotificationCache {
    store: Arc<dyn KeyValueStore>,
    retention: Duration,
}

impl NotificationCache {
    pub fn new(store: Arc<dyn KeyValueStore>, retention_days: u32) -> Self {
        Self {
            store,
            retention: Duration::days(i64::from(retention_days)),
        }
    }

    /// Surviving notifications as of `now`. Expired entries are dropped and
    /// the cache is rewritten without them.
    pub async fn read_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let entries: Vec<CachedNotification> =
            storage::load_json(self.store.as_ref(), keys::NOTIFICATIONS)
                .await
                .unwrap_or_default();

        let total = entries.len();
        let cutoff = self.retention.num_milliseconds();
        let now_ms = now.timestamp_millis();
        let survivors: Vec<CachedNotification> = entries
            .into_iter()
            .filter(|e| {
                now_ms
                    .checked_sub(e.cached_at)
                    .is_some_and(|age| age < cutoff)
            })
            .collect();

        if survivors.len() != total {
            log::info!(
                "Dropped {} expired notification(s)",
                total - survivors.len()
            );
            storage::save_json(self.store.as_ref(), keys::NOTIFICATIONS, &survivors).await;
        }

        survivors.into_iter().map(|e| e.notification).collect()
    }

    pub async fn read(&self) -> Vec<Notification> {
        self.read_at(Utc::now()).await
    }

    /// Stamp every notification with `now` and replace the whole cache.
    pub async fn write_at(&self, notifications: &[Notification], now: DateTime<Utc>) {
        let stamp = now.timestamp_millis();
        let entries: Vec<CachedNotification> = notifications
            .iter()
            .cloned()
            .map(|n| CachedNotification::new(n, stamp))
            .collect();
        storage::save_json(self.store.as_ref(), keys::NOTIFICATIONS, &entries).await;
    }

    pub async fn write(&self, notifications: &[Notification]) {
        self.write_at(notifications, Utc::now()).await
    }
}

/// Notification history with cache fallback.
#[derive(Clone)]
pub struct NotificationService {
    backend: BackendClient,
    cache: NotificationCache,
}

impl NotificationService {
    pub fn new(backend: BackendClient, cache: NotificationCache) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &NotificationCache {
        &self.cache
    }

    /// Fetch the history for a device and cache it. On failure serve the
    /// cache; fail only when it holds nothing.
    pub async fn load(&self, token: &str) -> Result<Vec<Notification>> {
        match self.backend.fetch_notifications(token).await {
            Ok(notifications) => {
                self.cache.write(&notifications).await;
                Ok(notifications)
            }
            Err(err) => {
                let cached = self.cache.read().await;
                if cached.is_empty() {
                    Err(err)
                } else {
                    log::warn!("Notifications unavailable ({}), using cache", err);
                    Ok(cached)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::utils::http::mock::MockTransport;
    use crate::utils::http::{Method, Transport};
    use serde_json::json;

    fn notification(id: i64, lesson: &str) -> Notification {
        serde_json::from_value(json!({
            "id": id,
            "name": "ИС-21",
            "couple": 2,
            "time_start": "10:10",
            "time_end": "11:40",
            "lesson": lesson,
            "cabinet": "214",
            "teacher": "Иванов И.И.",
            "group": "ИС-21",
            "combined": null,
            "created_at": "2026-10-15T09:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let cache = NotificationCache::new(Arc::new(MemoryStore::new()), 7);
        let items = vec![notification(1, "Физика"), notification(2, "Химия")];

        cache.write(&items).await;
        let mut read = cache.read().await;
        read.sort_by_key(|n| n.id.as_i64());
        assert_eq!(read, items);
    }

    #[tokio::test]
    async fn read_strips_cached_at() {
        let store = Arc::new(MemoryStore::new());
        let cache = NotificationCache::new(store.clone(), 7);
        cache.write(&[notification(1, "Физика")]).await;

        let raw = store.get(keys::NOTIFICATIONS).await.unwrap().unwrap();
        assert!(raw.contains("cachedAt"));

        let value = serde_json::to_value(&cache.read().await).unwrap();
        assert!(value[0].get("cachedAt").is_none());
    }

    #[tokio::test]
    async fn eight_day_old_entry_is_dropped_and_rewritten() {
        let store = Arc::new(MemoryStore::new());
        let cache = NotificationCache::new(store.clone(), 7);
        let now = Utc::now();

        let old = CachedNotification::new(
            notification(1, "Старое"),
            (now - Duration::days(8)).timestamp_millis(),
        );
        let fresh = CachedNotification::new(
            notification(2, "Новое"),
            (now - Duration::days(1)).timestamp_millis(),
        );
        storage::save_json(store.as_ref(), keys::NOTIFICATIONS, &vec![old, fresh]).await;

        let read = cache.read_at(now).await;
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].lesson.as_deref(), Some("Новое"));

        let raw = store.get(keys::NOTIFICATIONS).await.unwrap().unwrap();
        let stored: Vec<CachedNotification> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!raw.contains("Старое"));
    }

    #[tokio::test]
    async fn exactly_seven_days_is_expired() {
        let store = Arc::new(MemoryStore::new());
        let cache = NotificationCache::new(store, 7);
        let now = Utc::now();

        cache
            .write_at(&[notification(1, "Граница")], now - Duration::days(7))
            .await;
        assert!(cache.read_at(now).await.is_empty());
    }

    #[tokio::test]
    async fn extreme_cached_at_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::NOTIFICATIONS,
                r#"[{"id":1,"name":"x","cachedAt":-9223372036854775808}]"#,
            )
            .await
            .unwrap();
        let cache = NotificationCache::new(store.clone(), 7);

        assert!(cache.read().await.is_empty());
        let raw = store.get(keys::NOTIFICATIONS).await.unwrap().unwrap();
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn write_replaces_instead_of_appending() {
        let cache = NotificationCache::new(Arc::new(MemoryStore::new()), 7);
        cache.write(&[notification(1, "А"), notification(2, "Б")]).await;
        cache.write(&[notification(3, "В")]).await;

        let read = cache.read().await;
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, json!(3));
    }

    #[tokio::test]
    async fn service_falls_back_to_cache() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(Method::Get, "/notifications/tok", 200, json!([
            { "id": 1, "name": "ИС-21", "lesson": "Физика" }
        ]));
        mock.fail(Method::Get, "/notifications/tok", "offline");

        let backend = BackendClient::new(Arc::clone(&mock) as Arc<dyn Transport>);
        let cache = NotificationCache::new(Arc::new(MemoryStore::new()), 7);
        let svc = NotificationService::new(backend, cache);

        assert_eq!(svc.load("tok").await.unwrap().len(), 1);
        let offline = svc.load("tok").await.unwrap();
        assert_eq!(offline[0].lesson.as_deref(), Some("Физика"));
    }

    #[tokio::test]
    async fn service_propagates_without_cache() {
        let mock = Arc::new(MockTransport::new());
        let backend = BackendClient::new(Arc::clone(&mock) as Arc<dyn Transport>);
        let svc = NotificationService::new(
            backend,
            NotificationCache::new(Arc::new(MemoryStore::new()), 7),
        );

        assert!(svc.load("tok").await.unwrap_err().is_network());
    }
}
