//! # Errors
//!
//! Error kinds and the public error type returned by credential and
//! presentation operations.
//!
//! Each failure carries exactly one [`Err`] kind somewhere in its chain. Stage
//! prefixes are layered on top using [`anyhow::Context`] so the rendered
//! message reads outermost stage first and deepest cause last, for example
//! `prepare vp: failed to sign vp: failed to add linked data proof: ...`.

use std::fmt::Display;

use thiserror::Error;

/// Log an error with tracing and return it from the enclosing function.
///
/// # Example
/// ```
/// use vercre_verifiable::error::Err;
/// use vercre_verifiable::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::MandatoryFieldMissing, "credential id is mandatory")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::NoCredential)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        ::tracing::error!($($msg)*);
        return Err(::anyhow::Error::new($code).context(format!($($msg)*)).into());
        }
    };
    // no context
    ($code:expr) => {
        {
        ::tracing::error!("{}", $code);
        return Err(::anyhow::Error::new($code).into());
        }
    }
}

/// Public error type.
///
/// Renders the complete context chain when displayed.
#[derive(Error, Debug)]
#[error("{0:#}")]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// The kind of failure carried by this error, if any.
    #[must_use]
    pub fn kind(&self) -> Option<Err> {
        self.0.downcast_ref::<Err>().copied()
    }

    /// Returns true if the error carries the specified kind.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.kind() == Some(err)
    }

    /// Structured error result suitable for returning to a caller.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let code = self.kind().map_or_else(|| "server_error".to_string(), |k| k.code().to_string());
        serde_json::json!({
            "error": code,
            "error_description": self.to_string(),
        })
    }

    /// Wrap the error with an outer stage prefix, keeping its kind.
    #[must_use]
    pub fn context<C>(self, context: C) -> Self
    where
        C: Display + Send + Sync + 'static,
    {
        Self(self.0.context(context))
    }

    /// The deepest cause in the chain.
    #[must_use]
    pub fn root_cause(&self) -> String {
        self.0.root_cause().to_string()
    }
}

/// Kinds of failure.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// The request envelope could not be decoded.
    #[error("request decode")]
    RequestDecode,

    /// The response could not be encoded.
    #[error("response encode")]
    ResponseEncode,

    /// The credential failed structural validation.
    #[error("build new credential")]
    MalformedCredential,

    /// A presentation was requested without any credentials.
    #[error("no credential found")]
    NoCredential,

    /// A required request field was empty or absent.
    #[error("mandatory field missing")]
    MandatoryFieldMissing,

    /// The requested item does not exist in the store.
    #[error("not found")]
    NotFound,

    /// The underlying store failed.
    #[error("storage error")]
    StorageError,

    /// The DID could not be resolved from the store or the registry.
    #[error("did document not found")]
    DidNotFound,

    /// The resolved DID document has no verification method usable by the
    /// signer.
    #[error("public key not found in DID Document")]
    NoVerificationMethod,

    /// The signer does not support the requested algorithm or key.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// The signer failed or the proof could not be constructed.
    #[error("add linked data proof")]
    SigningError,

    /// A proof did not verify.
    #[error("invalid proof")]
    InvalidProof,

    /// The command method is not supported.
    #[error("unsupported method")]
    UnsupportedMethod,
}

impl Err {
    /// Stable, machine-readable code for the kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RequestDecode => "request_decode",
            Self::ResponseEncode => "response_encode",
            Self::MalformedCredential => "malformed_credential",
            Self::NoCredential => "no_credential",
            Self::MandatoryFieldMissing => "mandatory_field_missing",
            Self::NotFound => "not_found",
            Self::StorageError => "storage_error",
            Self::DidNotFound => "did_not_found",
            Self::NoVerificationMethod => "no_verification_method",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::SigningError => "signing_error",
            Self::InvalidProof => "invalid_proof",
            Self::UnsupportedMethod => "unsupported_method",
        }
    }
}
