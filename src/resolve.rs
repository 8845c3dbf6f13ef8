//! # DID Resolution
//!
//! Resolves a DID to its DID document. A document stored under the DID as
//! key takes precedence; otherwise the external registry is asked. Absence
//! from the store is not an error, only absence from both sources is.
//!
//! Nothing is cached here: each call reads the store and, on a miss, the
//! registry afresh.

use anyhow::anyhow;

use crate::document::Document;
use crate::error::Err;
use crate::provider::{DidRegistry, Store};
use crate::Result;

/// Resolve `did` to a DID document.
///
/// # Errors
///
/// Returns a [`Err::DidNotFound`] error, carrying the DID and the underlying
/// cause, if the registry cannot resolve the DID or the document found cannot
/// be parsed. Returns a [`Err::StorageError`] error if the store cannot be
/// read; the registry is not consulted in that case.
pub async fn resolve(
    did: &str, store: &impl Store, registry: &impl DidRegistry,
) -> Result<Document> {
    if did.is_empty() {
        return Err(not_found(did, anyhow!("DID is empty")));
    }

    let raw = match store.get(did).await {
        Ok(Some(raw)) => {
            tracing::debug!(did, "DID document found in store");
            raw
        }
        Ok(None) => {
            tracing::debug!(did, "DID document not in store, resolving with registry");
            registry.resolve_did(did).await.map_err(|e| not_found(did, e))?
        }
        Err(e) => {
            tracing::error!(did, "DID document store read failed: {e:#}");
            return Err(e.context(Err::StorageError).context(format!("resolve {did}")).into());
        }
    };

    let doc = Document::parse(&raw).map_err(|e| not_found(did, e))?;
    Ok(doc)
}

fn not_found(did: &str, cause: anyhow::Error) -> crate::Error {
    tracing::error!(did, "DID resolution failed: {cause:#}");
    cause.context(Err::DidNotFound).context(format!("resolve {did}")).into()
}
