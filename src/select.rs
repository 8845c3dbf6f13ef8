//! # Verification Method Selection
//!
//! Picks the verification method a presentation proof will reference, given
//! the holder's resolved DID document and the algorithm of the active signer.

use crate::document::Document;
use crate::error::Err;
use crate::keys::Algorithm;
use crate::{tracerr, Result};

/// Select the verification method used to sign with `alg`.
///
/// Methods are considered in document order and the first one whose key type
/// is compatible with `alg` is returned. Methods with unrecognized key types
/// are skipped.
///
/// When `requested` is set, that method must be present in the document and
/// compatible with `alg`; no other method is considered.
///
/// # Errors
///
/// Returns an [`Err::NoVerificationMethod`] error if the document has no
/// verification methods, none are compatible, or the requested method is
/// absent or incompatible.
pub fn select_verification_method(
    doc: &Document, alg: Algorithm, requested: Option<&str>,
) -> Result<String> {
    if doc.verification_method.is_empty() {
        tracerr!(Err::NoVerificationMethod);
    }

    if let Some(id) = requested {
        let Some(vm) = doc.verification_method(id) else {
            tracerr!(Err::NoVerificationMethod, "verification method {id} is not in {}", doc.id);
        };
        if !vm.supports(alg) {
            tracerr!(Err::NoVerificationMethod, "verification method {id} cannot verify {alg}");
        }
        return Ok(vm.id.clone());
    }

    let Some(vm) = doc.verification_method.iter().find(|vm| vm.supports(alg)) else {
        tracerr!(Err::NoVerificationMethod, "no verification method in {} supports {alg}", doc.id);
    };
    tracing::debug!(verification_method = %vm.id, %alg, "selected verification method");

    Ok(vm.id.clone())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> Document {
        let doc = json!({
            "id": "did:peer:123456789abcdefghi",
            "publicKey": [
                {
                    "id": "did:peer:123456789abcdefghi#keys-9",
                    "type": "X25519KeyAgreementKey2019",
                    "controller": "did:peer:123456789abcdefghi",
                    "publicKeyBase58": "JhNWeSVLMYccCk7iopQW4guaSJTojqpMEELgSLhKwRr"
                },
                {
                    "id": "did:peer:123456789abcdefghi#keys-1",
                    "type": "Secp256k1VerificationKey2018",
                    "controller": "did:peer:123456789abcdefghi",
                    "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
                },
                {
                    "id": "did:peer:123456789abcdefghi#signing-key",
                    "type": "Ed25519VerificationKey2018",
                    "controller": "did:peer:123456789abcdefghi",
                    "publicKeyBase58": "GUXiqNHCdirb6NKpH6wYG4px3YfMjiCh6dQhU3zxQVQ7"
                },
                {
                    "id": "did:peer:123456789abcdefghi#signing-key-2",
                    "type": "Ed25519VerificationKey2020",
                    "controller": "did:peer:123456789abcdefghi",
                    "publicKeyMultibase": "z6MkmM42vxfqZQsv4ehtTjFFxQ4sQKS2w6WR7emozFAn5cxu"
                }
            ]
        });
        serde_json::from_value(doc).expect("should deserialize")
    }

    #[test]
    fn first_compatible() {
        let doc = document();
        let id = select_verification_method(&doc, Algorithm::EdDSA, None).expect("should select");
        assert_eq!(id, "did:peer:123456789abcdefghi#signing-key");

        let id = select_verification_method(&doc, Algorithm::ES256K, None).expect("should select");
        assert_eq!(id, "did:peer:123456789abcdefghi#keys-1");
    }

    #[test]
    fn no_methods() {
        let doc = Document {
            id: "did:peer:21tDAKCERh95uGgKbJNHYp".to_string(),
            ..Document::default()
        };
        let err =
            select_verification_method(&doc, Algorithm::EdDSA, None).expect_err("should fail");
        assert!(err.is(Err::NoVerificationMethod));
        assert_eq!(err.to_string(), "public key not found in DID Document");
    }

    #[test]
    fn none_compatible() {
        let doc = document();
        let err =
            select_verification_method(&doc, Algorithm::RS256, None).expect_err("should fail");
        assert!(err.is(Err::NoVerificationMethod));
        assert!(err.to_string().contains("public key not found in DID Document"));
    }

    #[test]
    fn requested() {
        let doc = document();
        let requested = Some("did:peer:123456789abcdefghi#signing-key-2");
        let id =
            select_verification_method(&doc, Algorithm::EdDSA, requested).expect("should select");
        assert_eq!(id, "did:peer:123456789abcdefghi#signing-key-2");

        // present but incompatible
        let requested = Some("did:peer:123456789abcdefghi#keys-1");
        let err = select_verification_method(&doc, Algorithm::EdDSA, requested)
            .expect_err("should fail");
        assert!(err.is(Err::NoVerificationMethod));

        // absent
        let requested = Some("did:peer:123456789abcdefghi#missing");
        let err = select_verification_method(&doc, Algorithm::EdDSA, requested)
            .expect_err("should fail");
        assert!(err.to_string().starts_with("verification method did:peer:123456789abcdefghi#"));
    }
}
