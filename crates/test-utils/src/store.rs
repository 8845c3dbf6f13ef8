use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use vercre_verifiable::{StorageProvider, Store};

/// Storage provider handing out a single shared [`MockStore`].
#[derive(Clone, Debug, Default)]
pub struct MockStorageProvider {
    store: MockStore,
    err_open: Option<String>,
}

impl MockStorageProvider {
    /// Create a provider over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given store.
    #[must_use]
    pub fn with_store(mut self, store: MockStore) -> Self {
        self.store = store;
        self
    }

    /// Fail every attempt to open a store.
    #[must_use]
    pub fn err_open(mut self, msg: impl Into<String>) -> Self {
        self.err_open = Some(msg.into());
        self
    }

    /// The shared store.
    #[must_use]
    pub const fn store(&self) -> &MockStore {
        &self.store
    }
}

impl StorageProvider for MockStorageProvider {
    type Store = MockStore;

    fn open_store(&self, _name: &str) -> Result<MockStore> {
        if let Some(e) = &self.err_open {
            return Err(anyhow!("{e}"));
        }
        Ok(self.store.clone())
    }
}

/// In-memory store with injectable failures.
#[derive(Clone, Debug, Default)]
pub struct MockStore {
    data: Arc<DashMap<String, Vec<u8>>>,
    err_put: Option<String>,
    err_put_after: Option<(usize, String)>,
    err_get: Option<String>,
    err_iterate: Option<String>,
    puts: Arc<AtomicUsize>,
}

impl MockStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write.
    #[must_use]
    pub fn err_put(mut self, msg: impl Into<String>) -> Self {
        self.err_put = Some(msg.into());
        self
    }

    /// Allow `ok_puts` writes, then fail every write after.
    #[must_use]
    pub fn err_put_after(mut self, ok_puts: usize, msg: impl Into<String>) -> Self {
        self.err_put_after = Some((ok_puts, msg.into()));
        self
    }

    /// Fail every read.
    #[must_use]
    pub fn err_get(mut self, msg: impl Into<String>) -> Self {
        self.err_get = Some(msg.into());
        self
    }

    /// Fail every listing.
    #[must_use]
    pub fn err_iterate(mut self, msg: impl Into<String>) -> Self {
        self.err_iterate = Some(msg.into());
        self
    }

    /// Write directly, bypassing injected failures.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.data.insert(key.into(), value.into());
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Store for MockStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(e) = &self.err_put {
            return Err(anyhow!("{e}"));
        }
        let count = self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some((ok_puts, e)) = &self.err_put_after {
            if count >= *ok_puts {
                return Err(anyhow!("{e}"));
            }
        }
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(e) = &self.err_get {
            return Err(anyhow!("{e}"));
        }
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    async fn iterate(&self) -> Result<Vec<(String, Vec<u8>)>> {
        if let Some(e) = &self.err_iterate {
            return Err(anyhow!("{e}"));
        }
        Ok(self.data.iter().map(|r| (r.key().clone(), r.value().clone())).collect())
    }
}
