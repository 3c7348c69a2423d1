// src/services/directory.rs

//! Group, teacher and cabinet directories with offline fallback.

use std::sync::Arc;

use crate::error::Result;
use crate::models::DirectoryKind;
use crate::services::BackendClient;
use crate::storage::{self, KeyValueStore, keys};
use crate::utils::sort_directory;

/// Result of refreshing all three directories at once.
#[derive(Debug)]
pub struct DirectoryRefresh {
    pub groups: Result<Vec<String>>,
    pub teachers: Result<Vec<String>>,
    pub cabinets: Result<Vec<String>>,
}

/// Service for directory lists.
#[derive(Clone)]
pub struct DirectoryService {
    backend: BackendClient,
    store: Arc<dyn KeyValueStore>,
}

impl DirectoryService {
    pub fn new(backend: BackendClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self { backend, store }
    }

    /// Fetch, sort and cache a directory. Falls back to the cached list
    /// when the fetch fails; fails only when there is no cache.
    pub async fn get(&self, kind: DirectoryKind) -> Result<Vec<String>> {
        match self.backend.fetch_directory(kind).await {
            Ok(mut names) => {
                sort_directory(kind, &mut names);
                self.save(kind, &names).await;
                log::info!("Fetched {} {}", names.len(), kind);
                Ok(names)
            }
            Err(err) => match self.cached(kind).await {
                Some(names) => {
                    log::warn!(
                        "Fetching {} failed ({}), serving {} cached entries",
                        kind,
                        err,
                        names.len()
                    );
                    Ok(names)
                }
                None => Err(err),
            },
        }
    }

    pub async fn get_groups(&self) -> Result<Vec<String>> {
        self.get(DirectoryKind::Groups).await
    }

    pub async fn get_teachers(&self) -> Result<Vec<String>> {
        self.get(DirectoryKind::Teachers).await
    }

    pub async fn get_cabinets(&self) -> Result<Vec<String>> {
        self.get(DirectoryKind::Cabinets).await
    }

    /// Refresh all directories concurrently.
    pub async fn refresh_all(&self) -> DirectoryRefresh {
        let (groups, teachers, cabinets) = futures::join!(
            self.get(DirectoryKind::Groups),
            self.get(DirectoryKind::Teachers),
            self.get(DirectoryKind::Cabinets),
        );
        DirectoryRefresh {
            groups,
            teachers,
            cabinets,
        }
    }

    /// Last cached (already sorted) list, if any.
    pub async fn cached(&self, kind: DirectoryKind) -> Option<Vec<String>> {
        storage::load_directory(self.store.as_ref(), kind).await
    }

    /// Overwrite the cached list for a kind.
    async fn save(&self, kind: DirectoryKind, names: &[String]) {
        storage::save_json(self.store.as_ref(), keys::directory(kind), names).await;
    }
}
