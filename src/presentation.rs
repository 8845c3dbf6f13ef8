//! # Verifiable Presentation
//!
//! Assembles validated credentials into a presentation for a holder and
//! attaches a linked-data proof made by the holder's signer.
//!
//! The proof signs `sha256(JCS(proof options)) || sha256(JCS(presentation))`,
//! where the proof options are the proof without its `proofValue` and the
//! presentation is taken without its `proof`. The signature is carried as a
//! base58btc multibase string.

use chrono::{DateTime, SubsecRound, Utc};
use multibase::Base;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::core::{Kind, OneMany};
use crate::credential::{Credential, CREDENTIALS_V1};
use crate::document::Document;
use crate::error::Err;
use crate::keys::{self, Algorithm};
use crate::provider::Signer;
use crate::{tracerr, Result};

/// The `type` of every presentation.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Proof purpose used when none is requested.
pub const DEFAULT_PROOF_PURPOSE: &str = "authentication";

/// Stages a presentation passes through while being generated. A failure at
/// any stage ends the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Request accepted.
    Start,

    /// Credentials validated or fetched.
    CredentialsReady,

    /// Holder DID resolved to a document.
    DidResolved,

    /// Verification method chosen.
    MethodSelected,

    /// Proof attached.
    Signed,

    /// Presentation returned.
    Done,
}

/// A Verifiable Presentation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// Presentation identifier, a `urn:uuid` URI.
    pub id: String,

    /// Presentation type(s).
    #[serde(rename = "type")]
    pub type_: OneMany<String>,

    /// The presented credentials, as validated.
    pub verifiable_credential: Vec<Value>,

    /// DID of the holder.
    pub holder: String,

    /// Linked-data proof made by the holder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// A linked-data proof.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Signature suite, e.g. `Ed25519Signature2018`.
    #[serde(rename = "type")]
    pub type_: String,

    /// When the proof was made.
    pub created: DateTime<Utc>,

    /// ID of the verification method that verifies the signature.
    pub verification_method: String,

    /// Why the proof was made, e.g. `authentication`.
    pub proof_purpose: String,

    /// Domain the proof is bound to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Challenge supplied by the verifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Signature, multibase encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

/// Caller preferences for a proof. Unset fields take defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofOptions {
    /// Verification method to sign with. Must be present in the holder's DID
    /// document and match the signer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,

    /// Domain to bind the proof to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Verifier challenge to include.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Proof creation time. Defaults to now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Proof purpose. Defaults to `authentication`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
}

/// Signature suite for proofs made with `alg`.
#[must_use]
pub const fn signature_suite(alg: Algorithm) -> &'static str {
    match alg {
        Algorithm::EdDSA => "Ed25519Signature2018",
        Algorithm::ES256K => "EcdsaSecp256k1Signature2019",
        Algorithm::RS256 => "RsaSignature2018",
        Algorithm::PS256 => "RsaPssSignature2018",
    }
}

fn suite_algorithm(suite: &str) -> Option<Algorithm> {
    match suite {
        "Ed25519Signature2018" => Some(Algorithm::EdDSA),
        "EcdsaSecp256k1Signature2019" => Some(Algorithm::ES256K),
        "RsaSignature2018" => Some(Algorithm::RS256),
        "RsaPssSignature2018" => Some(Algorithm::PS256),
        _ => None,
    }
}

/// Builds a [`Presentation`]. A presentation can only be built once it holds
/// at least one credential.
#[derive(Debug)]
pub struct PresentationBuilder<C> {
    context: Vec<Kind<Value>>,
    holder: String,
    credentials: C,
}

/// Builder has no credentials (can't build).
#[derive(Debug)]
pub struct NoCredentials;

/// Builder has at least one credential (can build).
#[derive(Debug)]
pub struct WithCredentials(Vec<Credential>);

impl Default for PresentationBuilder<NoCredentials> {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationBuilder<NoCredentials> {
    /// Create a builder using the VC Data Model v1.1 context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: vec![Kind::String(CREDENTIALS_V1.to_string())],
            holder: String::new(),
            credentials: NoCredentials,
        }
    }

    /// Add the first credential.
    #[must_use]
    pub fn credential(self, credential: Credential) -> PresentationBuilder<WithCredentials> {
        PresentationBuilder {
            context: self.context,
            holder: self.holder,
            credentials: WithCredentials(vec![credential]),
        }
    }

    /// Add a batch of credentials.
    ///
    /// # Errors
    ///
    /// Returns an [`Err::NoCredential`] error if `credentials` is empty.
    pub fn credentials(
        self, credentials: impl IntoIterator<Item = Credential>,
    ) -> Result<PresentationBuilder<WithCredentials>> {
        let credentials: Vec<Credential> = credentials.into_iter().collect();
        if credentials.is_empty() {
            tracerr!(Err::NoCredential);
        }
        Ok(PresentationBuilder {
            context: self.context,
            holder: self.holder,
            credentials: WithCredentials(credentials),
        })
    }
}

impl<C> PresentationBuilder<C> {
    /// Replace the JSON-LD contexts.
    #[must_use]
    pub fn context(mut self, context: Vec<Kind<Value>>) -> Self {
        self.context = context;
        self
    }

    /// Set the holder's DID.
    #[must_use]
    pub fn holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }
}

impl PresentationBuilder<WithCredentials> {
    /// Add another credential.
    #[must_use]
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credentials.0.push(credential);
        self
    }

    /// Build the unsigned presentation.
    #[must_use]
    pub fn build(self) -> Presentation {
        Presentation {
            context: self.context,
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            type_: OneMany::One(PRESENTATION_TYPE.to_string()),
            verifiable_credential: self
                .credentials
                .0
                .into_iter()
                .map(Credential::into_json)
                .collect(),
            holder: self.holder,
            proof: None,
        }
    }
}

impl Presentation {
    /// Sign the presentation, replacing any existing proof.
    ///
    /// The caller is responsible for `verification_method` belonging to the
    /// holder and matching the signer's algorithm.
    ///
    /// # Errors
    ///
    /// Returns an [`Err::SigningError`] error if the presentation cannot be
    /// canonicalized or the signer fails.
    pub async fn sign(
        &mut self, signer: &impl Signer, verification_method: &str, options: &ProofOptions,
    ) -> Result<()> {
        self.proof = None;

        let mut proof = Proof {
            type_: signature_suite(signer.algorithm()).to_string(),
            created: options.created.unwrap_or_else(|| Utc::now().trunc_subsecs(0)),
            verification_method: verification_method.to_string(),
            proof_purpose: options
                .proof_purpose
                .clone()
                .unwrap_or_else(|| DEFAULT_PROOF_PURPOSE.to_string()),
            domain: options.domain.clone(),
            challenge: options.challenge.clone(),
            proof_value: None,
        };

        let payload = signing_input(self, &proof).map_err(signing_error)?;
        let signature = signer.try_sign(&payload).await.map_err(signing_error)?;
        proof.proof_value = Some(multibase::encode(Base::Base58Btc, signature));

        tracing::debug!(id = %self.id, verification_method, suite = %proof.type_, "signed");
        self.proof = Some(proof);
        Ok(())
    }
}

/// Verify the presentation's proof against the holder's DID document.
///
/// # Errors
///
/// Returns an [`Err::InvalidProof`] error if the presentation has no proof,
/// the proof's suite is not supported, its verification method is not in
/// `doc`, or the signature does not verify.
pub fn verify_presentation(presentation: &Presentation, doc: &Document) -> Result<()> {
    let Some(proof) = &presentation.proof else {
        tracerr!(Err::InvalidProof, "presentation has no proof");
    };
    let Some(alg) = suite_algorithm(&proof.type_) else {
        tracerr!(Err::InvalidProof, "unsupported signature suite {}", proof.type_);
    };
    let Some(vm) = doc.verification_method(&proof.verification_method) else {
        tracerr!(
            Err::InvalidProof,
            "verification method {} is not in {}",
            proof.verification_method,
            doc.id
        );
    };
    let Some(proof_value) = &proof.proof_value else {
        tracerr!(Err::InvalidProof, "proof value is missing");
    };

    let (base, signature) = multibase::decode(proof_value)
        .map_err(|e| invalid_proof(anyhow::anyhow!("decode proof value: {e}")))?;
    if base != Base::Base58Btc {
        tracerr!(Err::InvalidProof, "proof value is not base58btc encoded");
    }

    let mut unsigned = presentation.clone();
    unsigned.proof = None;
    let mut config = proof.clone();
    config.proof_value = None;

    let payload = signing_input(&unsigned, &config).map_err(invalid_proof)?;
    keys::verify(vm, alg, &payload, &signature).map_err(invalid_proof)
}

fn signing_input(unsigned: &Presentation, config: &Proof) -> anyhow::Result<Vec<u8>> {
    let config_data = serde_json_canonicalizer::to_string(config)?;
    let config_hash = Sha256::digest(config_data.as_bytes());
    let unsigned_data = serde_json_canonicalizer::to_string(unsigned)?;
    let unsigned_hash = Sha256::digest(unsigned_data.as_bytes());
    Ok([config_hash.as_slice(), unsigned_hash.as_slice()].concat())
}

fn signing_error(cause: anyhow::Error) -> crate::Error {
    tracing::error!("failed to add linked data proof: {cause:#}");
    cause.context(Err::SigningError).context("failed to add linked data proof").into()
}

fn invalid_proof(cause: anyhow::Error) -> crate::Error {
    tracing::error!("invalid proof: {cause:#}");
    cause.context(Err::InvalidProof).into()
}
