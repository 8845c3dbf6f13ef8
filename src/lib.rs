//! # Verifiable
//!
//! Validation, storage and presentation of W3C Verifiable Credentials.
//!
//! Credentials are checked against the minimal structural contract of the VC
//! Data Model before they are saved or presented. Presentations are signed for
//! a holder DID: the DID is resolved (stored document first, registry second),
//! a verification method matching the holder's signer is chosen, and a
//! linked-data proof is attached.
//!
//! Storage, DID resolution and signing are supplied by the caller through the
//! traits in [`provider`]. [`Command`] binds JSON request and response buffers
//! to each operation.
//!
//! # Example
//!
//! ```rust,ignore
//! let cmd = Command::new(provider)?;
//!
//! let req = serde_json::json!({"verifiableCredential": vc, "name": "degree"});
//! cmd.save_credential(&mut vec![], req.to_string().as_bytes()).await?;
//! ```

pub mod command;
pub mod core;
pub mod credential;
pub mod document;
pub mod error;
pub mod keys;
pub mod mem;
pub mod presentation;
pub mod provider;
pub mod resolve;
pub mod select;
pub mod store;

pub use command::{Command, Config};
pub use credential::Credential;
pub use document::{Document, VerificationMethod};
pub use error::Error;
pub use keys::{Algorithm, KeySigner};
pub use presentation::{verify_presentation, Presentation, Proof, ProofOptions};
pub use provider::{DidRegistry, Provider, Signer, StorageProvider, Store};
pub use store::{CredentialRecord, CredentialStore};

/// Result type for credential and presentation operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
