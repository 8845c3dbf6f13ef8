//! # Provider Traits
//!
//! Collaborators consumed by the credential store, the DID resolution facade
//! and presentation signing. Implementers supply storage, DID registry and
//! signing capability; this crate supplies the orchestration.

use std::future::Future;

use anyhow::Result;

use crate::keys::Algorithm;

/// `Provider` bundles the capabilities required by [`crate::Command`].
pub trait Provider: StorageProvider + DidRegistry + Signer {}

/// A blanket implementation for `Provider` trait so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: StorageProvider + DidRegistry + Signer {}

/// `StorageProvider` opens named key-value stores.
pub trait StorageProvider: Send + Sync {
    /// The store type opened by this provider.
    type Store: Store;

    /// Open (or create) the store with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    fn open_store(&self, name: &str) -> Result<Self::Store>;
}

/// `Store` is a durable key-value collaborator.
///
/// Implementations are expected to make each `put` atomic and to be safe for
/// concurrent use by unrelated requests.
pub trait Store: Send + Sync {
    /// Insert or overwrite the value held under `key`.
    fn put(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the value held under `key`, returning `None` if there is no
    /// such key.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Fetch every key-value pair held by the store. Order is unspecified.
    fn iterate(&self) -> impl Future<Output = Result<Vec<(String, Vec<u8>)>>> + Send;
}

/// `DidRegistry` resolves DIDs using an external registry (VDR).
pub trait DidRegistry: Send + Sync {
    /// Resolve the DID, returning the raw DID document.
    fn resolve_did(&self, did: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// `Signer` provides signing capability for presentation proofs.
pub trait Signer: Send + Sync {
    /// The algorithm the signer's signatures are produced with.
    fn algorithm(&self) -> Algorithm;

    /// Sign the message.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
