// src/services/subscriptions.rs

//! Push subscriptions for one device.
//!
//! The local list is optimistic: `add` and `remove` change it before the
//! backend answers and keep the change even if the call fails. A failed
//! call marks the manager as diverged until the next [`SubscriptionManager::resync`].

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::TargetType;
use crate::services::BackendClient;

#[derive(Debug, Default)]
struct State {
    names: Vec<String>,
    diverged: bool,
}

/// Optimistic subscription list bound to a device token.
pub struct SubscriptionManager {
    backend: BackendClient,
    token: String,
    state: Mutex<State>,
}

impl SubscriptionManager {
    pub fn new(backend: BackendClient, token: impl Into<String>) -> Self {
        Self {
            backend,
            token: token.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fetch the server list. Always hits the backend.
    pub async fn load(&self) -> Result<Vec<String>> {
        self.resync().await
    }

    /// Replace the local list with the server list and clear divergence.
    pub async fn resync(&self) -> Result<Vec<String>> {
        let names = self.backend.get_subscribers(&self.token).await?;
        let mut state = self.state.lock().await;
        state.names = names.clone();
        state.diverged = false;
        log::debug!("Synced {} subscription(s)", names.len());
        Ok(names)
    }

    /// Subscribe to `name`. Returns whether the backend confirmed it.
    pub async fn add(&self, name: &str, kind: TargetType) -> bool {
        {
            let mut state = self.state.lock().await;
            if !state.names.iter().any(|n| n == name) {
                state.names.push(name.to_string());
            }
        }

        match self.backend.subscribe(&self.token, name, kind).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Subscribe to {} {} failed: {}", kind, name, e);
                self.state.lock().await.diverged = true;
                false
            }
        }
    }

    /// Unsubscribe from `name`. Returns whether the backend confirmed it.
    pub async fn remove(&self, name: &str) -> bool {
        self.state.lock().await.names.retain(|n| n != name);

        match self.backend.delete_subscription(&self.token, name).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Unsubscribe from {} failed: {}", name, e);
                self.state.lock().await.diverged = true;
                false
            }
        }
    }

    /// Local view of the subscription list.
    pub async fn names(&self) -> Vec<String> {
        self.state.lock().await.names.clone()
    }

    pub async fn is_subscribed(&self, name: &str) -> bool {
        self.state.lock().await.names.iter().any(|n| n == name)
    }

    /// True after a mutation failed and before the next resync.
    pub async fn is_diverged(&self) -> bool {
        self.state.lock().await.diverged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::mock::MockTransport;
    use crate::utils::http::{Method, Transport};
    use serde_json::json;
    use std::sync::Arc;

    fn manager(mock: &Arc<MockTransport>) -> SubscriptionManager {
        let backend = BackendClient::new(Arc::clone(mock) as Arc<dyn Transport>);
        SubscriptionManager::new(backend, "tok")
    }

    #[tokio::test]
    async fn load_reads_server_list() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(Method::Get, "/subscribes/tok", 200, json!(["ИС-21", { "tracked_name": "214" }]));
        let subs = manager(&mock);

        assert_eq!(subs.load().await.unwrap(), vec!["ИС-21", "214"]);
        assert_eq!(subs.names().await, vec!["ИС-21", "214"]);
        assert!(!subs.is_diverged().await);
    }

    #[tokio::test]
    async fn add_is_optimistic_and_confirmed() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(Method::Post, "/subscribes/add", 200, json!({ "success": true }));
        let subs = manager(&mock);

        assert!(subs.add("ИС-21", TargetType::Group).await);
        assert!(subs.is_subscribed("ИС-21").await);
        assert!(!subs.is_diverged().await);
    }

    #[tokio::test]
    async fn failed_add_keeps_local_change_and_diverges() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(Method::Post, "/subscribes/add", "offline");
        let subs = manager(&mock);

        assert!(!subs.add("214", TargetType::Cabinet).await);
        assert_eq!(subs.names().await, vec!["214"]);
        assert!(subs.is_diverged().await);
    }

    #[tokio::test]
    async fn rejected_remove_diverges() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(Method::Get, "/subscribes/tok", 200, json!(["ИС-21"]));
        mock.reply(
            Method::Delete,
            "/subscribes/tok/ИС-21",
            200,
            json!({ "success": false, "message": "not found" }),
        );
        let subs = manager(&mock);
        subs.load().await.unwrap();

        assert!(!subs.remove("ИС-21").await);
        assert!(subs.names().await.is_empty());
        assert!(subs.is_diverged().await);
    }

    #[tokio::test]
    async fn resync_restores_server_state() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(Method::Post, "/subscribes/add", "offline");
        mock.reply(Method::Get, "/subscribes/tok", 200, json!(["Иванов И.И."]));
        let subs = manager(&mock);

        subs.add("ИС-21", TargetType::Group).await;
        assert!(subs.is_diverged().await);

        subs.resync().await.unwrap();
        assert_eq!(subs.names().await, vec!["Иванов И.И."]);
        assert!(!subs.is_diverged().await);
    }

    #[tokio::test]
    async fn duplicate_add_is_not_listed_twice() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(Method::Post, "/subscribes/add", 200, json!({ "success": true }));
        let subs = manager(&mock);

        subs.add("ИС-21", TargetType::Group).await;
        subs.add("ИС-21", TargetType::Group).await;
        assert_eq!(subs.names().await, vec!["ИС-21"]);
        assert_eq!(mock.count(Method::Post, "/subscribes/add"), 2);
    }
}
