//! # Keys
//!
//! Signature algorithms and an in-process signer for each supported key type.
//!
//! [`KeySigner`] is a closed set of signer variants behind the
//! [`Signer`](crate::provider::Signer) capability. Callers that keep keys
//! elsewhere (an HSM, a cloud KMS) implement the trait directly instead.

use std::fmt::{self, Debug, Display, Formatter};

use anyhow::{anyhow, Context, Result};
use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::{Signer as _, Verifier as _};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::document::{KeyType, PublicKeyFormat, VerificationMethod};
use crate::provider::Signer;

const RSA_BITS: usize = 2048;

/// Signature algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Algorithm {
    /// Ed25519 (EdDSA).
    #[default]
    EdDSA,

    /// ECDSA over secp256k1 with SHA-256.
    ES256K,

    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RS256,

    /// RSASSA-PSS with SHA-256 and a salt the length of the hash.
    PS256,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EdDSA => write!(f, "EdDSA"),
            Self::ES256K => write!(f, "ES256K"),
            Self::RS256 => write!(f, "RS256"),
            Self::PS256 => write!(f, "PS256"),
        }
    }
}

/// A signer holding its private key in process memory.
#[derive(Clone)]
pub enum KeySigner {
    /// Ed25519 key.
    Ed25519(ed25519_dalek::SigningKey),

    /// secp256k1 key.
    Secp256k1(k256::ecdsa::SigningKey),

    /// RSA key used with PKCS#1 v1.5 padding.
    Rs256(RsaPrivateKey),

    /// RSA key used with PSS padding.
    Ps256(RsaPrivateKey),
}

impl KeySigner {
    /// Generate a new key for the specified algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if RSA key generation fails.
    pub fn generate(alg: Algorithm) -> Result<Self> {
        let signer = match alg {
            Algorithm::EdDSA => Self::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng)),
            Algorithm::ES256K => Self::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng)),
            Algorithm::RS256 => Self::Rs256(
                RsaPrivateKey::new(&mut OsRng, RSA_BITS).context("generate RSA key")?,
            ),
            Algorithm::PS256 => Self::Ps256(
                RsaPrivateKey::new(&mut OsRng, RSA_BITS).context("generate RSA key")?,
            ),
        };
        Ok(signer)
    }

    /// The key's public material in the encoding conventionally used with its
    /// key type: base58 for Ed25519 and secp256k1 (compressed point), PEM for
    /// RSA.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSA public key cannot be PEM encoded.
    pub fn public_key(&self) -> Result<PublicKeyFormat> {
        let key = match self {
            Self::Ed25519(sk) => PublicKeyFormat::Base58 {
                public_key_base58: base58(sk.verifying_key().as_bytes()),
            },
            Self::Secp256k1(sk) => PublicKeyFormat::Base58 {
                public_key_base58: base58(sk.verifying_key().to_encoded_point(true).as_bytes()),
            },
            Self::Rs256(sk) | Self::Ps256(sk) => PublicKeyFormat::Pem {
                public_key_pem: sk
                    .to_public_key()
                    .to_public_key_pem(LineEnding::LF)
                    .map_err(|e| anyhow!("encode RSA public key: {e}"))?,
            },
        };
        Ok(key)
    }

    /// A verification method for this key, identified as `<did>#<fragment>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be encoded.
    pub fn verification_method(&self, did: &str, fragment: &str) -> Result<VerificationMethod> {
        let type_ = match self {
            Self::Ed25519(_) => KeyType::Ed25519VerificationKey2018,
            Self::Secp256k1(_) => KeyType::EcdsaSecp256k1VerificationKey2019,
            Self::Rs256(_) | Self::Ps256(_) => KeyType::RsaVerificationKey2018,
        };
        Ok(VerificationMethod {
            id: format!("{did}#{fragment}"),
            type_,
            controller: did.to_string(),
            key: Some(self.public_key()?),
        })
    }

    fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(sk) => sk.sign(msg).to_bytes().to_vec(),
            Self::Secp256k1(sk) => {
                let sig: k256::ecdsa::Signature = sk.sign(msg);
                sig.to_bytes().to_vec()
            }
            Self::Rs256(sk) => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new(sk.clone());
                signing_key.sign_with_rng(&mut OsRng, msg).to_vec()
            }
            Self::Ps256(sk) => {
                let signing_key = rsa::pss::BlindedSigningKey::<Sha256>::new(sk.clone());
                signing_key.sign_with_rng(&mut OsRng, msg).to_vec()
            }
        }
    }
}

impl Debug for KeySigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeySigner").field(&self.algorithm()).finish()
    }
}

impl Signer for KeySigner {
    fn algorithm(&self) -> Algorithm {
        match self {
            Self::Ed25519(_) => Algorithm::EdDSA,
            Self::Secp256k1(_) => Algorithm::ES256K,
            Self::Rs256(_) => Algorithm::RS256,
            Self::Ps256(_) => Algorithm::PS256,
        }
    }

    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign(msg))
    }
}

/// Verify `signature` over `msg` using the public key held by the
/// verification method.
///
/// # Errors
///
/// Returns an error if the method cannot verify signatures of the given
/// algorithm, its key cannot be decoded, or the signature is invalid.
pub fn verify(vm: &VerificationMethod, alg: Algorithm, msg: &[u8], signature: &[u8]) -> Result<()> {
    if !vm.supports(alg) {
        return Err(anyhow!("verification method {} does not support {alg}", vm.id));
    }

    match alg {
        Algorithm::EdDSA => {
            let bytes: [u8; 32] = vm
                .public_key()?
                .to_bytes()?
                .try_into()
                .map_err(|_| anyhow!("Ed25519 public key must be 32 bytes"))?;
            let vk = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map_err(|e| anyhow!("invalid Ed25519 public key: {e}"))?;
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|e| anyhow!("invalid Ed25519 signature: {e}"))?;
            vk.verify_strict(msg, &sig).map_err(|e| anyhow!("signature verification failed: {e}"))
        }
        Algorithm::ES256K => {
            let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(&vm.public_key()?.to_bytes()?)
                .map_err(|e| anyhow!("invalid secp256k1 public key: {e}"))?;
            let sig = k256::ecdsa::Signature::from_slice(signature)
                .map_err(|e| anyhow!("invalid secp256k1 signature: {e}"))?;
            vk.verify(msg, &sig).map_err(|e| anyhow!("signature verification failed: {e}"))
        }
        Algorithm::RS256 => {
            let vk = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(rsa_public_key(vm.public_key()?)?);
            let sig = rsa::pkcs1v15::Signature::try_from(signature)
                .map_err(|e| anyhow!("invalid RSA signature: {e}"))?;
            rsa::signature::Verifier::verify(&vk, msg, &sig)
                .map_err(|e| anyhow!("signature verification failed: {e}"))
        }
        Algorithm::PS256 => {
            let vk = rsa::pss::VerifyingKey::<Sha256>::new(rsa_public_key(vm.public_key()?)?);
            let sig = rsa::pss::Signature::try_from(signature)
                .map_err(|e| anyhow!("invalid RSA signature: {e}"))?;
            rsa::signature::Verifier::verify(&vk, msg, &sig)
                .map_err(|e| anyhow!("signature verification failed: {e}"))
        }
    }
}

fn rsa_public_key(key: &PublicKeyFormat) -> Result<RsaPublicKey> {
    match key {
        PublicKeyFormat::Pem { public_key_pem } => RsaPublicKey::from_public_key_pem(public_key_pem)
            .map_err(|e| anyhow!("invalid RSA public key: {e}")),
        PublicKeyFormat::Jwk { public_key_jwk } => {
            let (n, e) = public_key_jwk.rsa_components()?;
            RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
                .map_err(|e| anyhow!("invalid RSA public key: {e}"))
        }
        other => RsaPublicKey::from_public_key_der(&other.to_bytes()?)
            .map_err(|e| anyhow!("invalid RSA public key: {e}")),
    }
}

fn base58(bytes: &[u8]) -> String {
    // drop the multibase prefix
    multibase::encode(multibase::Base::Base58Btc, bytes)[1..].to_string()
}
