//! # Verifiable Credential
//!
//! The structural contract a credential must satisfy before it can be saved
//! or presented. Validation checks shape only: proofs on the credential, its
//! revocation status and full JSON-LD semantics are not evaluated.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Kind, OneMany};
use crate::error::Err;
use crate::Result;

/// Base context of the W3C VC Data Model v1.1.
pub const CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Base context of the W3C VC Data Model v2.0.
pub const CREDENTIALS_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// The `type` every credential must declare.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// A structurally valid Verifiable Credential.
///
/// The typed fields are a read-only view. The document as it was validated is
/// kept alongside and is what gets presented, so dates and any issuer proof
/// reach the verifier unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// JSON-LD contexts. The first entry must be a recognized base context.
    #[serde(rename = "@context")]
    pub context: OneMany<Kind<Map<String, Value>>>,

    /// The credential's identifier (URI).
    #[serde(default)]
    pub id: String,

    /// Credential type(s). Must include `VerifiableCredential`.
    #[serde(rename = "type")]
    pub type_: OneMany<String>,

    /// The issuer, as a URI or an object with an `id`.
    pub issuer: Kind<Issuer>,

    /// When the credential was issued. Required for v1.1 credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,

    /// When the credential expires (v1.1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Start of the validity period (v2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity period (v2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    /// Claims about the subject(s) of the credential: an object or an array
    /// of objects.
    pub credential_subject: Value,

    /// Status information, such as a revocation list entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<Value>,

    /// Any additional properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    source: Value,
}

/// Issuer expressed as an object.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Issuer {
    /// The issuer's identifier.
    pub id: String,

    /// Any additional properties, such as a display name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Parse and validate raw credential text.
    ///
    /// Deterministic and free of side effects: identical input always
    /// produces the same verdict.
    ///
    /// # Errors
    ///
    /// Returns a [`Err::MalformedCredential`] error if the input is not a JSON
    /// object, or is missing a recognized `@context`, a non-empty `id`, a
    /// `type` including `VerifiableCredential`, an issuer, an issuance date
    /// (v1.1 only) or a credential subject.
    pub fn parse(raw: impl AsRef<[u8]>) -> Result<Self> {
        Self::build(raw.as_ref()).context(Err::MalformedCredential).map_err(Into::into)
    }

    fn build(raw: &[u8]) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_slice(raw).context("decode credential")?;
        let Some(object) = value.as_object() else {
            return Err(anyhow!("credential is not a JSON object"));
        };

        // check required members up front for clearer messages than serde's
        if !object.contains_key("@context") {
            return Err(anyhow!("@context is required"));
        }
        match object.get("id") {
            Some(Value::String(id)) if !id.is_empty() => {}
            _ => return Err(anyhow!("id is required")),
        }
        if !object.contains_key("type") {
            return Err(anyhow!("type is required"));
        }

        let mut credential: Self =
            serde_json::from_value(value.clone()).context("unmarshal credential")?;
        credential.check()?;
        credential.source = value;
        Ok(credential)
    }

    fn check(&self) -> anyhow::Result<()> {
        let Some(Kind::String(base)) = self.context.iter().next() else {
            return Err(anyhow!("@context must begin with a base context URI"));
        };
        match base.as_str() {
            CREDENTIALS_V1 if self.issuance_date.is_none() => {
                return Err(anyhow!("issuanceDate is required"));
            }
            CREDENTIALS_V1 | CREDENTIALS_V2 => {}
            _ => return Err(anyhow!("unrecognized base context: {base}")),
        }
        if !self.type_.contains(&CREDENTIAL_TYPE.to_string()) {
            return Err(anyhow!("type must include {CREDENTIAL_TYPE}"));
        }
        if self.issuer_id().is_empty() {
            return Err(anyhow!("issuer is required"));
        }
        let has_subject = match &self.credential_subject {
            Value::Object(_) => true,
            Value::Array(subjects) => !subjects.is_empty() && subjects.iter().all(Value::is_object),
            _ => false,
        };
        if !has_subject {
            return Err(anyhow!("credentialSubject must be an object or a list of objects"));
        }
        Ok(())
    }

    /// The credential document as validated.
    #[must_use]
    pub const fn as_json(&self) -> &Value {
        &self.source
    }

    /// Consume the credential, returning the document as validated.
    #[must_use]
    pub fn into_json(self) -> Value {
        self.source
    }

    /// The issuer's identifier.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Kind::String(id) => id,
            Kind::Object(issuer) => &issuer.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const VC: &str = r#"{
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": "http://example.edu/credentials/1989",
        "type": "VerifiableCredential",
        "credentialSubject": {"id": "did:example:iuajk1f712ebc6f1c276e12ec21"},
        "issuer": {"id": "did:example:09s12ec712ebc6f1c671ebfeb1f", "name": "Example University"},
        "issuanceDate": "2020-01-01T10:54:01Z",
        "credentialStatus": {
            "id": "https://example.gov/status/65",
            "type": "CredentialStatusList2017"
        }
    }"#;

    fn without(field: &str) -> String {
        let mut value: Value = serde_json::from_str(VC).unwrap();
        value.as_object_mut().unwrap().remove(field);
        value.to_string()
    }

    #[test]
    fn valid() {
        let vc = Credential::parse(VC).expect("should parse");
        assert_eq!(vc.id, "http://example.edu/credentials/1989");
        assert_eq!(vc.issuer_id(), "did:example:09s12ec712ebc6f1c671ebfeb1f");
        assert!(vc.credential_status.is_some());

        // verdict is reproducible
        assert_eq!(Credential::parse(VC).unwrap(), vc);
    }

    #[test]
    fn issuer_name_preserved() {
        let vc = Credential::parse(VC).expect("should parse");
        let ser = serde_json::to_value(&vc).unwrap();
        assert_eq!(ser["issuer"]["name"], json!("Example University"));
    }

    #[test]
    fn missing_context() {
        let err = Credential::parse(without("@context")).expect_err("should fail");
        assert!(err.is(Err::MalformedCredential));
        assert!(err.to_string().starts_with("build new credential"));
    }

    #[test]
    fn missing_id() {
        let err = Credential::parse(without("id")).expect_err("should fail");
        assert!(err.is(Err::MalformedCredential));
        assert!(err.to_string().contains("id is required"));
    }

    #[test]
    fn missing_type() {
        let err = Credential::parse(without("type")).expect_err("should fail");
        assert!(err.to_string().contains("type is required"));
    }

    #[test]
    fn unrecognized_context() {
        let raw = VC.replace(CREDENTIALS_V1, "https://example.com/context/v1");
        let err = Credential::parse(raw).expect_err("should fail");
        assert!(err.to_string().contains("unrecognized base context"));
    }

    #[test]
    fn empty_subject() {
        let mut value: Value = serde_json::from_str(VC).unwrap();
        value["credentialSubject"] = json!([]);
        let err = Credential::parse(value.to_string()).expect_err("should fail");
        assert!(err.to_string().contains("credentialSubject"));
    }

    #[test]
    fn context_forms() {
        let mut value: Value = serde_json::from_str(VC).unwrap();
        value["@context"] = json!(CREDENTIALS_V1);
        Credential::parse(value.to_string()).expect("should parse single context");

        value["@context"] = json!([CREDENTIALS_V1, {"@vocab": "https://example.com/vocab#"}]);
        let vc = Credential::parse(value.to_string()).expect("should parse mixed contexts");
        assert_eq!(vc.context.len(), 2);

        value["@context"] = json!([{"@vocab": "https://example.com/vocab#"}]);
        let err = Credential::parse(value.to_string()).expect_err("should fail");
        assert!(err.to_string().contains("must begin with a base context URI"));
    }

    // the validated document is kept byte-for-byte in meaning
    #[test]
    fn source_preserved() {
        let mut value: Value = serde_json::from_str(VC).unwrap();
        value["issuanceDate"] = json!("2010-01-01T19:23:24.000+01:00");
        value["proof"] = json!({
            "type": "Ed25519Signature2018",
            "jws": "eyJhbGciOiJFZERTQSJ9..c2ln"
        });

        let vc = Credential::parse(value.to_string()).expect("should parse");
        assert_eq!(vc.as_json(), &value);
        assert_eq!(vc.into_json()["issuanceDate"], "2010-01-01T19:23:24.000+01:00");
    }

    #[test]
    fn v2_valid_from() {
        let vc = json!({
            "@context": [CREDENTIALS_V2],
            "id": "urn:uuid:58172aac-d8ba-11ed-83dd-0b3aef56cc33",
            "type": ["VerifiableCredential", "ExampleAlumniCredential"],
            "issuer": "did:example:2g55q912ec3476eba2l9812ecbfe",
            "validFrom": "2023-01-01T00:00:00Z",
            "credentialSubject": {"id": "did:example:ebfeb1f712ebc6f1c276e12ec21"}
        });
        let parsed = Credential::parse(vc.to_string()).expect("should parse");
        assert!(parsed.issuance_date.is_none());
        assert!(parsed.valid_from.is_some());
    }

    #[test]
    fn v1_requires_issuance_date() {
        let mut value: Value = serde_json::from_str(VC).unwrap();
        value.as_object_mut().unwrap().remove("issuanceDate");
        value["validFrom"] = json!("2023-01-01T00:00:00Z");

        let err = Credential::parse(value.to_string()).expect_err("should fail");
        assert!(err.is(Err::MalformedCredential));
        assert!(err.to_string().contains("issuanceDate is required"));
    }

    #[test]
    fn empty_input() {
        let err = Credential::parse("").expect_err("should fail");
        assert!(err.is(Err::MalformedCredential));
    }

    #[test]
    fn not_an_object() {
        let err = Credential::parse("[]").expect_err("should fail");
        assert!(err.to_string().contains("not a JSON object"));
    }
}
