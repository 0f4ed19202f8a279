// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide database handle.
//!
//! The store is connected at most once per process. The first caller of
//! [`Database::connection`] loads the seed (if any); concurrent callers wait
//! on the same initialisation and every later caller reuses the result.
//! A failed initialisation leaves the cell empty so the next call retries.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

use crate::store::{InMemoryStore, StoreResult};

pub type StoreHandle = Arc<RwLock<InMemoryStore>>;

#[derive(Debug, Default)]
pub struct Database {
    seed_path: Option<PathBuf>,
    store: OnceCell<StoreHandle>,
}

impl Database {
    /// Handle that seeds from `seed_path` on first connection.
    pub fn new(seed_path: Option<PathBuf>) -> Self {
        Self {
            seed_path,
            store: OnceCell::new(),
        }
    }

    /// Handle that is already connected to `store`.
    pub fn with_store(store: InMemoryStore) -> Self {
        Self {
            seed_path: None,
            store: OnceCell::new_with(Some(Arc::new(RwLock::new(store)))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// The shared store, connecting on first use.
    pub async fn connection(&self) -> StoreResult<StoreHandle> {
        self.store
            .get_or_try_init(|| self.connect())
            .await
            .cloned()
    }

    async fn connect(&self) -> StoreResult<StoreHandle> {
        let store = match &self.seed_path {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let store = InMemoryStore::from_seed_json(&bytes)?;
                tracing::info!(seed = %path.display(), "Store connected from seed file");
                store
            }
            None => {
                tracing::info!("Store connected (empty, no seed file configured)");
                InMemoryStore::new()
            }
        };
        Ok(Arc::new(RwLock::new(store)))
    }
}
