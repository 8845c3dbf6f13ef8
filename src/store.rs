//! # Credential Store
//!
//! Durable mapping from credential ID, and from an optional name, to the
//! credential text exactly as it was supplied.
//!
//! Keys used in the underlying store:
//!
//! | key                | value                                        |
//! |--------------------|----------------------------------------------|
//! | `vcrecord_<id>`    | `{"id", "name", "verifiableCredential"}`     |
//! | `vcname_<name>`    | credential id                                |
//!
//! The record is the only key a reader trusts for content and name, so a save
//! commits with a single put. The name index is written before the record and
//! is ignored unless the record it points at carries the same name.
//!
//! DID documents may share the store, keyed by DID. Credential text put
//! directly under its ID, without a record, is readable by ID but unnamed and
//! unlisted.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::Err;
use crate::provider::Store;
use crate::{tracerr, Result};

const RECORD_PREFIX: &str = "vcrecord_";
const NAME_PREFIX: &str = "vcname_";

/// A stored credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialRecord {
    /// The credential's `id`.
    pub id: String,

    /// Optional name the credential can also be retrieved by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The credential text.
    #[serde(rename = "verifiableCredential", default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// Credential store over a [`Store`] collaborator.
#[derive(Clone, Debug)]
pub struct CredentialStore<S: Store> {
    store: S,
}

impl<S: Store> CredentialStore<S> {
    /// Create a credential store over an opened store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store, shared with DID resolution.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Save a credential, replacing any record with the same ID.
    ///
    /// A failed save leaves any previous record for the ID untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Err::MandatoryFieldMissing`] if the record has no ID, or
    /// [`Err::StorageError`] if a write fails.
    pub async fn save(&self, record: &CredentialRecord) -> Result<()> {
        if record.id.is_empty() {
            tracerr!(Err::MandatoryFieldMissing, "credential id is mandatory");
        }
        let record = CredentialRecord {
            name: record.name.clone().filter(|n| !n.is_empty()),
            ..record.clone()
        };
        let value = serde_json::to_vec(&record).map_err(|e| storage_error(e.into()))?;

        // index first: it stays dormant until the record names it
        if let Some(name) = &record.name {
            self.put(&format!("{NAME_PREFIX}{name}"), record.id.as_bytes()).await?;
        }
        self.put(&format!("{RECORD_PREFIX}{}", record.id), &value).await?;

        tracing::debug!(id = %record.id, name = ?record.name, "saved credential");
        Ok(())
    }

    /// Fetch a credential by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Err::NotFound`] if there is no credential with the ID, or
    /// [`Err::StorageError`] if a read fails or the stored value is corrupt.
    pub async fn get_by_id(&self, id: &str) -> Result<CredentialRecord> {
        if let Some(raw) = self.get(&format!("{RECORD_PREFIX}{id}")).await? {
            return parse_record(&raw);
        }

        let Some(content) = self.get(id).await? else {
            tracerr!(Err::NotFound, "no credential with id {id}");
        };
        Ok(CredentialRecord {
            id: id.to_string(),
            name: None,
            content: utf8(content)?,
        })
    }

    /// Fetch a credential by name.
    ///
    /// The most recent credential saved with the name is returned, provided
    /// it still carries that name.
    ///
    /// # Errors
    ///
    /// Returns [`Err::NotFound`] if no credential carries the name, or
    /// [`Err::StorageError`] if a read fails.
    pub async fn get_by_name(&self, name: &str) -> Result<CredentialRecord> {
        let Some(id) = self.get(&format!("{NAME_PREFIX}{name}")).await? else {
            tracerr!(Err::NotFound, "no credential named {name}");
        };
        let id = utf8(id)?;

        let record = self.get_by_id(&id).await?;
        if record.name.as_deref() != Some(name) {
            tracerr!(Err::NotFound, "credential {id} is no longer named {name}");
        }
        Ok(record)
    }

    /// List all saved credentials, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Err::StorageError`] if the store cannot be read or a record
    /// is corrupt.
    pub async fn list(&self) -> Result<Vec<CredentialRecord>> {
        let entries = self.store.iterate().await.map_err(storage_error)?;

        let mut records = entries
            .iter()
            .filter(|(key, _)| key.starts_with(RECORD_PREFIX))
            .map(|(_, value)| parse_record(value))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(records)
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.store.put(key, value).await.map_err(storage_error)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await.map_err(storage_error)
    }
}

fn parse_record(raw: &[u8]) -> Result<CredentialRecord> {
    serde_json::from_slice(raw)
        .map_err(|e| storage_error(anyhow!("invalid credential record: {e}")))
}

fn utf8(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| storage_error(anyhow!("invalid credential text: {e}")))
}

fn storage_error(cause: anyhow::Error) -> crate::Error {
    tracing::error!("storage error: {cause:#}");
    cause.context(Err::StorageError).into()
}
