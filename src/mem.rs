//! # In-memory Storage
//!
//! A [`StorageProvider`] backed by concurrent hash maps. Suitable for tests,
//! examples and short-lived processes.

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;

use crate::provider::{StorageProvider, Store};

/// Storage provider holding every opened store in memory.
///
/// Opening the same name twice returns handles to the same underlying data.
#[derive(Clone, Debug, Default)]
pub struct MemProvider {
    stores: Arc<DashMap<String, MemStore>>,
}

impl MemProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemProvider {
    type Store = MemStore;

    fn open_store(&self, name: &str) -> Result<MemStore> {
        let store = self.stores.entry(name.to_string()).or_default();
        Ok(store.clone())
    }
}

/// An in-memory key-value store.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    data: Arc<DashMap<String, Vec<u8>>>,
}

impl Store for MemStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    async fn iterate(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let all = self.data.iter().map(|r| (r.key().clone(), r.value().clone())).collect();
        Ok(all)
    }
}
