//! # Command
//!
//! Binds request and response buffers to credential and presentation
//! operations. Requests and responses are JSON. Every failure is returned as
//! an [`Error`](crate::Error) whose message is prefixed by the stage that
//! failed, for example `get vc: no credential with id ...: not found`.

use std::fmt::{self, Debug, Formatter};
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::Kind;
use crate::credential::{Credential, CREDENTIALS_V1};
use crate::document::Document;
use crate::error::Err;
use crate::presentation::{
    Presentation, PresentationBuilder, ProofOptions, Stage, DEFAULT_PROOF_PURPOSE,
};
use crate::provider::{Provider, Signer, StorageProvider};
use crate::resolve::resolve;
use crate::select::select_verification_method;
use crate::store::{CredentialRecord, CredentialStore};
use crate::{tracerr, Result};

/// Name the operations are registered under.
pub const COMMAND_NAME: &str = "verifiable";

/// Validate a credential.
pub const VALIDATE_CREDENTIAL: &str = "ValidateCredential";
/// Validate and save a credential.
pub const SAVE_CREDENTIAL: &str = "SaveCredential";
/// Get a credential by ID.
pub const GET_CREDENTIAL: &str = "GetCredential";
/// Get a credential by name.
pub const GET_CREDENTIAL_BY_NAME: &str = "GetCredentialByName";
/// List saved credentials.
pub const GET_CREDENTIALS: &str = "GetCredentials";
/// Generate a presentation from supplied credentials.
pub const GENERATE_PRESENTATION: &str = "GeneratePresentation";
/// Generate a presentation from a saved credential.
pub const GENERATE_PRESENTATION_BY_ID: &str = "GeneratePresentationByID";

/// A registered operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handler {
    /// Command name.
    pub command: &'static str,

    /// Method name.
    pub method: &'static str,
}

const HANDLERS: [Handler; 7] = [
    handler(VALIDATE_CREDENTIAL),
    handler(SAVE_CREDENTIAL),
    handler(GET_CREDENTIAL),
    handler(GET_CREDENTIAL_BY_NAME),
    handler(GET_CREDENTIALS),
    handler(GENERATE_PRESENTATION),
    handler(GENERATE_PRESENTATION_BY_ID),
];

const fn handler(method: &'static str) -> Handler {
    Handler {
        command: COMMAND_NAME,
        method,
    }
}

/// Command configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Store opened from the storage provider.
    pub store_name: String,

    /// Proof purpose used when a request does not set one.
    pub proof_purpose: String,

    /// JSON-LD contexts of generated presentations.
    pub context: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_name: COMMAND_NAME.to_string(),
            proof_purpose: DEFAULT_PROOF_PURPOSE.to_string(),
            context: vec![CREDENTIALS_V1.to_string()],
        }
    }
}

impl Config {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the store to open.
    #[must_use]
    pub fn store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = store_name.into();
        self
    }

    /// Set the default proof purpose.
    #[must_use]
    pub fn proof_purpose(mut self, proof_purpose: impl Into<String>) -> Self {
        self.proof_purpose = proof_purpose.into();
        self
    }

    /// Add a JSON-LD context to generated presentations.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }
}

/// Request to validate or save a credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// Raw credential text.
    #[serde(default)]
    pub verifiable_credential: String,

    /// Name to save the credential under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Request identifying a credential by ID.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IdRequest {
    /// Credential ID.
    #[serde(default)]
    pub id: String,
}

/// Request identifying a credential by name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NameRequest {
    /// Credential name.
    #[serde(default)]
    pub name: String,
}

/// Response carrying a credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    /// Raw credential text.
    pub verifiable_credential: String,
}

/// Response listing saved credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialRecordResult {
    /// Saved credentials.
    pub result: Vec<CredentialRecord>,
}

/// Request to generate a presentation from supplied credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequest {
    /// Raw credential texts.
    #[serde(default)]
    pub verifiable_credential: Vec<String>,

    /// Holder DID.
    #[serde(default)]
    pub did: String,

    /// Proof preferences.
    #[serde(default)]
    pub proof_options: ProofOptions,
}

/// Request to generate a presentation from a saved credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationRequestById {
    /// Saved credential ID.
    #[serde(default)]
    pub id: String,

    /// Holder DID.
    #[serde(default)]
    pub did: String,
}

/// Response carrying a signed presentation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresentationResponse {
    /// The presentation.
    pub verifiable_presentation: Presentation,
}

/// Credential and presentation operations over a [`Provider`].
pub struct Command<P: Provider> {
    provider: P,
    store: CredentialStore<<P as StorageProvider>::Store>,
    config: Config,
}

impl<P: Provider> Debug for Command<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<P: Provider> Command<P> {
    /// Create a command using the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be opened.
    pub fn new(provider: P) -> Result<Self> {
        Self::with_config(provider, Config::default())
    }

    /// Create a command using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be opened.
    pub fn with_config(provider: P, config: Config) -> Result<Self> {
        let store = match provider.open_store(&config.store_name) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(store = %config.store_name, "new vc store: {e:#}");
                return Err(e.context(Err::StorageError).context("new vc store").into());
            }
        };

        Ok(Self {
            provider,
            store: CredentialStore::new(store),
            config,
        })
    }

    /// The operations this command handles.
    #[must_use]
    pub const fn handlers(&self) -> &'static [Handler] {
        &HANDLERS
    }

    /// Run the operation named by `method`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err::UnsupportedMethod`] error for unknown methods, or
    /// the operation's error.
    #[tracing::instrument(level = "debug", skip(self, rw, req))]
    pub async fn execute(&self, method: &str, rw: &mut impl Write, req: impl Read) -> Result<()> {
        match method {
            VALIDATE_CREDENTIAL => self.validate_credential(rw, req).await,
            SAVE_CREDENTIAL => self.save_credential(rw, req).await,
            GET_CREDENTIAL => self.get_credential(rw, req).await,
            GET_CREDENTIAL_BY_NAME => self.get_credential_by_name(rw, req).await,
            GET_CREDENTIALS => self.get_credentials(rw).await,
            GENERATE_PRESENTATION => self.generate_presentation(rw, req).await,
            GENERATE_PRESENTATION_BY_ID => self.generate_presentation_by_id(rw, req).await,
            _ => tracerr!(Err::UnsupportedMethod, "{COMMAND_NAME} has no method {method}"),
        }
    }

    /// Validate a credential. Nothing is written on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded or the credential is
    /// malformed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn validate_credential(&self, _rw: &mut impl Write, req: impl Read) -> Result<()> {
        let request: CredentialRequest = decode(req)?;
        Credential::parse(&request.verifiable_credential)
            .map_err(|e| e.context("new credential"))?;
        Ok(())
    }

    /// Validate a credential and save it under its ID and, optionally, a
    /// name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded, the credential is
    /// malformed, or the store fails.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn save_credential(&self, _rw: &mut impl Write, req: impl Read) -> Result<()> {
        let request: CredentialRequest = decode(req)?;
        let credential = Credential::parse(&request.verifiable_credential)
            .map_err(|e| e.context("new credential"))?;

        let record = CredentialRecord {
            id: credential.id,
            name: request.name.filter(|n| !n.is_empty()),
            content: request.verifiable_credential,
        };
        self.store.save(&record).await.map_err(|e| e.context("save vc"))
    }

    /// Fetch a saved credential by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded, has no ID, or the
    /// credential cannot be fetched.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn get_credential(&self, rw: &mut impl Write, req: impl Read) -> Result<()> {
        let request: IdRequest = decode(req)?;
        if request.id.is_empty() {
            tracerr!(Err::MandatoryFieldMissing, "credential id is mandatory");
        }

        let record = self.store.get_by_id(&request.id).await.map_err(|e| e.context("get vc"))?;
        respond(
            rw,
            &CredentialResponse {
                verifiable_credential: record.content,
            },
        )
    }

    /// Fetch a saved credential by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded, has no name, or the
    /// credential cannot be fetched.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn get_credential_by_name(&self, rw: &mut impl Write, req: impl Read) -> Result<()> {
        let request: NameRequest = decode(req)?;
        if request.name.is_empty() {
            tracerr!(Err::MandatoryFieldMissing, "credential name is mandatory");
        }

        let record =
            self.store.get_by_name(&request.name).await.map_err(|e| e.context("get vc by name"))?;
        respond(rw, &record)
    }

    /// List saved credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn get_credentials(&self, rw: &mut impl Write) -> Result<()> {
        let result = self.store.list().await.map_err(|e| e.context("get vcs"))?;
        respond(rw, &CredentialRecordResult { result })
    }

    /// Generate a signed presentation of the supplied credentials for the
    /// holder DID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded, a credential is
    /// malformed or none are supplied, the DID cannot be resolved, or signing
    /// fails.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn generate_presentation(&self, rw: &mut impl Write, req: impl Read) -> Result<()> {
        let request: PresentationRequest = decode(req)?;
        tracing::debug!(stage = ?Stage::Start, did = %request.did);

        let credentials = parse_credentials(&request.verifiable_credential)
            .map_err(|e| e.context("generate vp - parse presentation request"))?;
        tracing::debug!(stage = ?Stage::CredentialsReady, count = credentials.len());

        let doc = resolve(&request.did, self.store.inner(), &self.provider)
            .await
            .map_err(|e| e.context("generate vp - failed to get did doc from store or vdri"))?;
        tracing::debug!(stage = ?Stage::DidResolved, did = %doc.id);

        let presentation = self
            .create_presentation(credentials, &request.did, &doc, request.proof_options)
            .await
            .map_err(|e| e.context("failed to sign vp").context("prepare vp"))?;

        respond(
            rw,
            &PresentationResponse {
                verifiable_presentation: presentation,
            },
        )?;
        tracing::debug!(stage = ?Stage::Done);
        Ok(())
    }

    /// Generate a signed presentation of a saved credential for the holder
    /// DID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded or lacks an ID or
    /// DID, the credential cannot be fetched, the DID cannot be resolved, or
    /// signing fails.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn generate_presentation_by_id(
        &self, rw: &mut impl Write, req: impl Read,
    ) -> Result<()> {
        let request: PresentationRequestById = decode(req)?;
        if request.id.is_empty() {
            tracerr!(Err::MandatoryFieldMissing, "credential id is mandatory");
        }
        if request.did.is_empty() {
            tracerr!(Err::MandatoryFieldMissing, "did is mandatory");
        }
        tracing::debug!(stage = ?Stage::Start, id = %request.id, did = %request.did);

        let record = self.store.get_by_id(&request.id).await.map_err(|e| e.context("get vc"))?;
        let credential = Credential::parse(&record.content)
            .map_err(|e| e.context("parse vc failed").context("get vc"))?;
        tracing::debug!(stage = ?Stage::CredentialsReady, count = 1);

        let doc = resolve(&request.did, self.store.inner(), &self.provider)
            .await
            .map_err(|e| e.context("generate vp by id - failed to get did doc from store"))?;
        tracing::debug!(stage = ?Stage::DidResolved, did = %doc.id);

        let presentation = self
            .create_presentation(vec![credential], &request.did, &doc, ProofOptions::default())
            .await
            .map_err(|e| e.context("failed to sign vp by ID").context("prepare vp by id"))?;

        respond(
            rw,
            &PresentationResponse {
                verifiable_presentation: presentation,
            },
        )?;
        tracing::debug!(stage = ?Stage::Done);
        Ok(())
    }

    /// Assemble the credentials into a presentation for `holder` and sign it
    /// with a verification method from the holder's resolved document.
    ///
    /// # Errors
    ///
    /// Returns an [`Err::NoCredential`] error if `credentials` is empty, an
    /// [`Err::NoVerificationMethod`] error if `doc` has no method usable by
    /// the signer, or an [`Err::SigningError`] error if signing fails.
    pub async fn create_presentation(
        &self, credentials: Vec<Credential>, holder: &str, doc: &Document,
        mut options: ProofOptions,
    ) -> Result<Presentation> {
        let builder = PresentationBuilder::new()
            .context(self.config.context.iter().map(|c| Kind::String(c.clone())).collect())
            .holder(holder)
            .credentials(credentials)?;

        let verification_method = select_verification_method(
            doc,
            self.provider.algorithm(),
            options.verification_method.as_deref(),
        )
        .map_err(|e| e.context("get verification method"))?;
        tracing::debug!(stage = ?Stage::MethodSelected, %verification_method);

        if options.proof_purpose.is_none() {
            options.proof_purpose = Some(self.config.proof_purpose.clone());
        }

        let mut presentation = builder.build();
        presentation.sign(&self.provider, &verification_method, &options).await?;
        tracing::debug!(stage = ?Stage::Signed, id = %presentation.id);

        Ok(presentation)
    }
}

// first invalid credential fails the batch
fn parse_credentials(raw: &[String]) -> Result<Vec<Credential>> {
    if raw.is_empty() {
        tracerr!(Err::NoCredential);
    }
    raw.iter()
        .map(|vc| Credential::parse(vc).map_err(|e| e.context("parse vc failed")))
        .collect()
}

fn decode<T: DeserializeOwned>(req: impl Read) -> Result<T> {
    serde_json::from_reader(req).map_err(|e| {
        tracing::error!("request decode: {e}");
        anyhow::Error::new(e).context(Err::RequestDecode).into()
    })
}

fn respond(rw: &mut impl Write, body: &impl Serialize) -> Result<()> {
    serde_json::to_writer(rw, body).map_err(|e| {
        tracing::error!("response encode: {e}");
        anyhow::Error::new(e).context(Err::ResponseEncode).into()
    })
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::keys::{Algorithm, KeySigner};
    use crate::mem::{MemProvider, MemStore};
    use crate::provider::DidRegistry;

    const VC: &str = r#"{
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": "http://example.edu/credentials/1989",
        "type": "VerifiableCredential",
        "credentialSubject": {"id": "did:example:iuajk1f712ebc6f1c276e12ec21"},
        "issuer": {"id": "did:example:09s12ec712ebc6f1c671ebfeb1f", "name": "Example University"},
        "issuanceDate": "2020-01-01T10:54:01Z"
    }"#;

    const NO_KEY_DOC: &str = r#"{
        "@context": ["https://w3id.org/did/v1","https://w3id.org/did/v2"],
        "id": "did:peer:21tDAKCERh95uGgKbJNHYp"
    }"#;

    struct TestProvider {
        storage: MemProvider,
        signer: KeySigner,
    }

    impl TestProvider {
        fn new() -> Self {
            Self {
                storage: MemProvider::new(),
                signer: KeySigner::generate(Algorithm::EdDSA).unwrap(),
            }
        }
    }

    impl StorageProvider for TestProvider {
        type Store = MemStore;

        fn open_store(&self, name: &str) -> anyhow::Result<MemStore> {
            self.storage.open_store(name)
        }
    }

    impl DidRegistry for TestProvider {
        async fn resolve_did(&self, did: &str) -> anyhow::Result<Vec<u8>> {
            Err(anyhow!("{did} is not registered"))
        }
    }

    impl Signer for TestProvider {
        fn algorithm(&self) -> Algorithm {
            self.signer.algorithm()
        }

        async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
            self.signer.try_sign(msg).await
        }
    }

    #[test]
    fn handlers() {
        let cmd = Command::new(TestProvider::new()).unwrap();
        assert_eq!(cmd.handlers().len(), 7);
        assert!(cmd.handlers().iter().all(|h| h.command == "verifiable"));
    }

    #[test]
    fn config() {
        let config = Config::new().store_name("vc").proof_purpose("assertionMethod");
        assert_eq!(config.store_name, "vc");
        assert_eq!(config.context, vec![CREDENTIALS_V1]);
    }

    #[tokio::test]
    async fn unsupported_method() {
        let cmd = Command::new(TestProvider::new()).unwrap();
        let mut rw = Vec::<u8>::new();
        let err = cmd.execute("DeleteCredential", &mut rw, "{}".as_bytes()).await.unwrap_err();
        assert!(err.is(Err::UnsupportedMethod));
    }

    #[tokio::test]
    async fn no_credentials() {
        let cmd = Command::new(TestProvider::new()).unwrap();
        let doc = Document::parse(NO_KEY_DOC.as_bytes()).unwrap();

        let err = cmd
            .create_presentation(vec![], &doc.id, &doc, ProofOptions::default())
            .await
            .expect_err("should fail");
        assert_eq!(err.to_string(), "no credential found");
    }

    #[tokio::test]
    async fn no_public_key() {
        let cmd = Command::new(TestProvider::new()).unwrap();
        let doc = Document::parse(NO_KEY_DOC.as_bytes()).unwrap();
        let vc = Credential::parse(VC).unwrap();

        let err = cmd
            .create_presentation(vec![vc], &doc.id, &doc, ProofOptions::default())
            .await
            .expect_err("should fail");
        assert!(err.is(Err::NoVerificationMethod));
        assert_eq!(
            err.to_string(),
            "get verification method: public key not found in DID Document"
        );
    }

    #[tokio::test]
    async fn config_applies() {
        let provider = TestProvider::new();
        let holder = "did:example:holder";
        let doc = Document {
            id: holder.to_string(),
            verification_method: vec![
                provider.signer.verification_method(holder, "key-1").unwrap(),
            ],
            ..Document::default()
        };
        let config = Config::new()
            .proof_purpose("assertionMethod")
            .context("https://w3id.org/security/suites/ed25519-2018/v1");
        let cmd = Command::with_config(provider, config).unwrap();

        let vc = Credential::parse(VC).unwrap();
        let vp = cmd
            .create_presentation(vec![vc], holder, &doc, ProofOptions::default())
            .await
            .expect("should create");

        assert_eq!(vp.context.len(), 2);
        let proof = vp.proof.expect("should have proof");
        assert_eq!(proof.proof_purpose, "assertionMethod");
        assert_eq!(proof.verification_method, "did:example:holder#key-1");
    }
}
