//! Mock providers and sample data for testing

pub mod data;
mod registry;
mod store;

use anyhow::{anyhow, Result};
use vercre_verifiable::{Algorithm, DidRegistry, KeySigner, Signer, StorageProvider};

pub use crate::registry::MockRegistry;
pub use crate::store::{MockStorageProvider, MockStore};

/// Provider combining mock storage, a mock registry and an in-memory key.
#[derive(Clone, Debug)]
pub struct Provider {
    storage: MockStorageProvider,
    registry: MockRegistry,
    signer: KeySigner,
    sign_error: Option<String>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Create a provider with empty storage, a registry that resolves any DID
    /// to [`data::DOC`], and an Ed25519 signer.
    ///
    /// # Panics
    ///
    /// Panics if the key cannot be generated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: MockStorageProvider::new(),
            registry: MockRegistry::new(data::DOC),
            signer: KeySigner::generate(Algorithm::EdDSA).expect("should generate key"),
            sign_error: None,
        }
    }

    /// Use the given storage provider.
    #[must_use]
    pub fn storage(mut self, storage: MockStorageProvider) -> Self {
        self.storage = storage;
        self
    }

    /// Use the given registry.
    #[must_use]
    pub fn registry(mut self, registry: MockRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sign with the given key.
    #[must_use]
    pub fn signer(mut self, signer: KeySigner) -> Self {
        self.signer = signer;
        self
    }

    /// Fail every signing request with `msg`.
    #[must_use]
    pub fn sign_error(mut self, msg: impl Into<String>) -> Self {
        self.sign_error = Some(msg.into());
        self
    }

    /// The signing key.
    #[must_use]
    pub const fn key(&self) -> &KeySigner {
        &self.signer
    }

    /// The store shared by every name opened from this provider.
    #[must_use]
    pub const fn store(&self) -> &MockStore {
        self.storage.store()
    }
}

impl StorageProvider for Provider {
    type Store = MockStore;

    fn open_store(&self, name: &str) -> Result<MockStore> {
        self.storage.open_store(name)
    }
}

impl DidRegistry for Provider {
    async fn resolve_did(&self, did: &str) -> Result<Vec<u8>> {
        self.registry.resolve_did(did).await
    }
}

impl Signer for Provider {
    fn algorithm(&self) -> Algorithm {
        self.signer.algorithm()
    }

    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        if let Some(e) = &self.sign_error {
            return Err(anyhow!("{e}"));
        }
        self.signer.try_sign(msg).await
    }
}
