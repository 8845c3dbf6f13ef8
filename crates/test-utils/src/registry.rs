use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use vercre_verifiable::DidRegistry;

use crate::data::INVALID_DID;

/// DID registry resolving registered DIDs to their documents and any other
/// well-formed DID to a fallback document.
///
/// [`INVALID_DID`] and strings that are not DIDs never resolve.
#[derive(Clone, Debug, Default)]
pub struct MockRegistry {
    documents: Arc<DashMap<String, Vec<u8>>>,
    fallback: Option<Vec<u8>>,
}

impl MockRegistry {
    /// Create a registry resolving unregistered DIDs to `fallback`.
    #[must_use]
    pub fn new(fallback: impl Into<Vec<u8>>) -> Self {
        Self {
            documents: Arc::default(),
            fallback: Some(fallback.into()),
        }
    }

    /// Create a registry that resolves nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a document for `did`.
    #[must_use]
    pub fn with_document(self, did: impl Into<String>, doc: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(did.into(), doc.into());
        self
    }
}

impl DidRegistry for MockRegistry {
    async fn resolve_did(&self, did: &str) -> Result<Vec<u8>> {
        if did == INVALID_DID || !did.starts_with("did:") {
            return Err(anyhow!("invalid"));
        }
        if let Some(doc) = self.documents.get(did) {
            return Ok(doc.value().clone());
        }
        self.fallback.clone().ok_or_else(|| anyhow!("{did} is not registered"))
    }
}
