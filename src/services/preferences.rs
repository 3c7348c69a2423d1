// src/services/preferences.rs

//! Favorites and the last viewed target.

use std::sync::Arc;

use crate::models::Target;
use crate::storage::{self, KeyValueStore, keys};

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn favorites(&self) -> Vec<Target> {
        storage::load_json(self.store.as_ref(), keys::FAVORITES)
            .await
            .unwrap_or_default()
    }

    /// Add a favorite. Returns false if it was already present.
    pub async fn add_favorite(&self, target: Target) -> bool {
        let mut favorites = self.favorites().await;
        if favorites.contains(&target) {
            return false;
        }
        favorites.push(target);
        storage::save_json(self.store.as_ref(), keys::FAVORITES, &favorites).await;
        true
    }

    /// Remove a favorite. Returns false if it was not present.
    pub async fn remove_favorite(&self, target: &Target) -> bool {
        let mut favorites = self.favorites().await;
        let before = favorites.len();
        favorites.retain(|t| t != target);
        if favorites.len() == before {
            return false;
        }
        storage::save_json(self.store.as_ref(), keys::FAVORITES, &favorites).await;
        true
    }

    pub async fn last_target(&self) -> Option<Target> {
        storage::load_json(self.store.as_ref(), keys::LAST_TARGET).await
    }

    pub async fn set_last_target(&self, target: &Target) {
        storage::save_json(self.store.as_ref(), keys::LAST_TARGET, target).await;
    }
}
