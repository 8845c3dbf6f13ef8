//! # DID Document
//!
//! A DID Document is a JSON-LD document that contains information related to a
//! DID. Only the parts needed to select and use a verification method are
//! modelled; everything else is carried through untouched.

use std::fmt::{self, Display, Formatter};

use anyhow::{anyhow, Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Kind, OneMany};
use crate::keys::Algorithm;

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OneMany<Kind<Map<String, Value>>>>,

    /// The DID for a particular DID subject.
    pub id: String,

    /// Verification methods of the DID subject, in document order.
    ///
    /// Documents produced against early drafts of DID Core list these under
    /// `publicKey`; both spellings are accepted.
    #[serde(default, alias = "publicKey", skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Any additional properties (services, verification relationships, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Parse a raw DID document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON DID document or the
    /// document has no `id`.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let doc: Self = serde_json::from_slice(raw).context("unmarshal DID document")?;
        if doc.id.is_empty() {
            return Err(anyhow!("DID document id is empty"));
        }
        Ok(doc)
    }

    /// Retrieve a verification method by its ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

/// A verification method binds a key identifier to public key material.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// A DID URL that identifies the verification method.
    pub id: String,

    /// The key type tag, e.g. `Ed25519VerificationKey2018`.
    #[serde(rename = "type")]
    pub type_: KeyType,

    /// The DID of the controller of the verification method.
    #[serde(default)]
    pub controller: String,

    /// The public key material. `None` when the method carries key material
    /// in an encoding this crate does not read, such as `blockchainAccountId`.
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub key: Option<PublicKeyFormat>,
}

impl VerificationMethod {
    /// Infer the DID from the key ID.
    #[must_use]
    pub fn did(&self) -> String {
        self.id.split('#').next().unwrap_or_default().to_string()
    }

    /// The method's public key material.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or in an unreadable encoding.
    pub fn public_key(&self) -> Result<&PublicKeyFormat> {
        self.key.as_ref().ok_or_else(|| anyhow!("{} has no readable public key", self.id))
    }

    /// The algorithm(s) a signature verifiable by this method can be
    /// produced with. Empty for unrecognized key types and for methods
    /// without readable key material.
    #[must_use]
    pub fn algorithms(&self) -> Vec<Algorithm> {
        let Some(key) = &self.key else {
            return vec![];
        };
        match &self.type_ {
            KeyType::Ed25519VerificationKey2018 | KeyType::Ed25519VerificationKey2020 => {
                vec![Algorithm::EdDSA]
            }
            KeyType::EcdsaSecp256k1VerificationKey2019 | KeyType::Secp256k1VerificationKey2018 => {
                vec![Algorithm::ES256K]
            }
            KeyType::RsaVerificationKey2018 => vec![Algorithm::RS256, Algorithm::PS256],
            KeyType::JsonWebKey2020 | KeyType::Multikey => key.algorithms(),
            KeyType::Other(_) => vec![],
        }
    }

    /// Whether signatures produced with `alg` can be verified using this
    /// method.
    #[must_use]
    pub fn supports(&self, alg: Algorithm) -> bool {
        self.algorithms().contains(&alg)
    }
}

/// Key type tags recognized on verification methods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum KeyType {
    /// Ed25519 public key (2018 suite).
    #[default]
    Ed25519VerificationKey2018,

    /// Ed25519 public key (2020 suite).
    Ed25519VerificationKey2020,

    /// secp256k1 public key.
    EcdsaSecp256k1VerificationKey2019,

    /// secp256k1 public key (legacy tag).
    Secp256k1VerificationKey2018,

    /// RSA public key.
    RsaVerificationKey2018,

    /// Any key expressed as a JWK.
    JsonWebKey2020,

    /// Any key expressed as a multicodec-prefixed multibase value.
    Multikey,

    /// A key type this crate cannot use.
    Other(String),
}

impl From<String> for KeyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Ed25519VerificationKey2018" => Self::Ed25519VerificationKey2018,
            "Ed25519VerificationKey2020" => Self::Ed25519VerificationKey2020,
            "EcdsaSecp256k1VerificationKey2019" => Self::EcdsaSecp256k1VerificationKey2019,
            "Secp256k1VerificationKey2018" => Self::Secp256k1VerificationKey2018,
            "RsaVerificationKey2018" => Self::RsaVerificationKey2018,
            "JsonWebKey2020" => Self::JsonWebKey2020,
            "Multikey" => Self::Multikey,
            _ => Self::Other(s),
        }
    }
}

impl From<KeyType> for String {
    fn from(kt: KeyType) -> Self {
        kt.to_string()
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519VerificationKey2018 => write!(f, "Ed25519VerificationKey2018"),
            Self::Ed25519VerificationKey2020 => write!(f, "Ed25519VerificationKey2020"),
            Self::EcdsaSecp256k1VerificationKey2019 => {
                write!(f, "EcdsaSecp256k1VerificationKey2019")
            }
            Self::Secp256k1VerificationKey2018 => write!(f, "Secp256k1VerificationKey2018"),
            Self::RsaVerificationKey2018 => write!(f, "RsaVerificationKey2018"),
            Self::JsonWebKey2020 => write!(f, "JsonWebKey2020"),
            Self::Multikey => write!(f, "Multikey"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The encoding of the public key material.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum PublicKeyFormat {
    /// Raw key bytes encoded as base58 (bitcoin alphabet).
    Base58 {
        /// The public key.
        public_key_base58: String,
    },

    /// Key encoded as a multibase string.
    Multibase {
        /// The public key.
        public_key_multibase: String,
    },

    /// Key encoded as a PEM `PUBLIC KEY` block.
    Pem {
        /// The public key.
        public_key_pem: String,
    },

    /// Key encoded as a JWK.
    Jwk {
        /// The public key.
        public_key_jwk: PublicKeyJwk,
    },

    /// Raw key bytes encoded as hex.
    Hex {
        /// The public key.
        public_key_hex: String,
    },
}

impl Default for PublicKeyFormat {
    fn default() -> Self {
        Self::Base58 {
            public_key_base58: String::new(),
        }
    }
}

impl PublicKeyFormat {
    /// Infer signature algorithms from self-describing encodings (JWK and
    /// multicodec-prefixed multibase).
    fn algorithms(&self) -> Vec<Algorithm> {
        match self {
            Self::Jwk { public_key_jwk } => public_key_jwk.algorithms(),
            Self::Multibase { public_key_multibase } => {
                if public_key_multibase.starts_with("z6Mk") {
                    vec![Algorithm::EdDSA]
                } else if public_key_multibase.starts_with("zQ3s") {
                    vec![Algorithm::ES256K]
                } else {
                    vec![]
                }
            }
            Self::Base58 { .. } | Self::Pem { .. } | Self::Hex { .. } => vec![],
        }
    }

    /// Decode the key to raw bytes.
    ///
    /// For multibase keys with a multicodec prefix the prefix is stripped.
    /// PEM keys are returned as DER.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be decoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Base58 { public_key_base58 } => {
                // decode using the multibase base58btc prefix
                let (_, bytes) = multibase::decode(format!("z{public_key_base58}"))
                    .context("decode publicKeyBase58")?;
                Ok(bytes)
            }
            Self::Multibase { public_key_multibase } => {
                let (_, bytes) =
                    multibase::decode(public_key_multibase).context("decode publicKeyMultibase")?;
                match bytes.as_slice() {
                    [0xed, 0x01, key @ ..] | [0xe7, 0x01, key @ ..] => Ok(key.to_vec()),
                    _ => Ok(bytes),
                }
            }
            Self::Pem { public_key_pem } => {
                let (_, der) = rsa::pkcs8::Document::from_pem(public_key_pem)
                    .map_err(|e| anyhow!("decode publicKeyPem: {e}"))?;
                Ok(der.as_bytes().to_vec())
            }
            Self::Jwk { public_key_jwk } => public_key_jwk.to_bytes(),
            Self::Hex { public_key_hex } => {
                hex::decode(public_key_hex).context("decode publicKeyHex")
            }
        }
    }
}

/// Simplified JSON Web Key (public part only).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type: `OKP`, `EC` or `RSA`.
    pub kty: String,

    /// Curve for `OKP` and `EC` keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// Public key (`OKP`) or x coordinate (`EC`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// y coordinate (`EC`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Modulus (`RSA`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// Exponent (`RSA`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl PublicKeyJwk {
    fn algorithms(&self) -> Vec<Algorithm> {
        match (self.kty.as_str(), self.crv.as_deref()) {
            ("OKP", Some("Ed25519")) => vec![Algorithm::EdDSA],
            ("EC", Some("secp256k1")) => vec![Algorithm::ES256K],
            ("RSA", _) => vec![Algorithm::RS256, Algorithm::PS256],
            _ => vec![],
        }
    }

    /// Raw public key bytes: the `x` value for `OKP` keys, the uncompressed
    /// SEC1 point for `EC` keys.
    ///
    /// # Errors
    ///
    /// Returns an error for RSA keys, which have no single raw encoding, or if
    /// a member is missing or not base64url encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let member = |m: &Option<String>, name: &str| -> Result<Vec<u8>> {
            let encoded = m.as_deref().ok_or_else(|| anyhow!("JWK is missing {name}"))?;
            Base64UrlUnpadded::decode_vec(encoded).map_err(|e| anyhow!("invalid JWK {name}: {e}"))
        };
        match self.kty.as_str() {
            "OKP" => member(&self.x, "x"),
            "EC" => {
                let mut point = vec![0x04];
                point.extend(member(&self.x, "x")?);
                point.extend(member(&self.y, "y")?);
                Ok(point)
            }
            kty => Err(anyhow!("no raw encoding for JWK key type {kty}")),
        }
    }

    /// The RSA modulus and exponent as big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if either member is missing or not base64url encoded.
    pub fn rsa_components(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let n = self.n.as_deref().ok_or_else(|| anyhow!("JWK is missing n"))?;
        let e = self.e.as_deref().ok_or_else(|| anyhow!("JWK is missing e"))?;
        let n = Base64UrlUnpadded::decode_vec(n).map_err(|e| anyhow!("invalid JWK n: {e}"))?;
        let e = Base64UrlUnpadded::decode_vec(e).map_err(|e| anyhow!("invalid JWK e: {e}"))?;
        Ok((n, e))
    }
}
