//! Sample credentials and DID documents.

/// ID of [`VC`].
pub const SAMPLE_VC_ID: &str = "http://example.edu/credentials/1989";

/// Name used when saving [`VC`].
pub const SAMPLE_VC_NAME: &str = "sampleVCName";

/// DID the mock registry refuses to resolve.
pub const INVALID_DID: &str = "did:error:123";

/// DID [`INVALID_DOC`] and [`NO_PUBLIC_KEY_DOC`] are identified by.
pub const PEER_DID: &str = "did:peer:21tDAKCERh95uGgKbJNHYp";

/// A structurally valid credential.
pub const VC: &str = r#"{
    "@context": [
        "https://www.w3.org/2018/credentials/v1"
    ],
    "id": "http://example.edu/credentials/1989",
    "type": "VerifiableCredential",
    "credentialSubject": {
        "id": "did:example:iuajk1f712ebc6f1c276e12ec21"
    },
    "issuer": {
        "id": "did:example:09s12ec712ebc6f1c671ebfeb1f",
        "name": "Example University"
    },
    "issuanceDate": "2020-01-01T10:54:01Z",
    "credentialStatus": {
        "id": "https://example.gov/status/65",
        "type": "CredentialStatusList2017"
    }
}"#;

/// [`VC`] without `@context`.
pub const INVALID_VC: &str = r#"{
    "id": "http://example.edu/credentials/1989",
    "type": "VerifiableCredential",
    "credentialSubject": {
        "id": "did:example:iuajk1f712ebc6f1c276e12ec21"
    },
    "issuer": {
        "id": "did:example:09s12ec712ebc6f1c671ebfeb1f",
        "name": "Example University"
    },
    "issuanceDate": "2020-01-01T10:54:01Z",
    "credentialStatus": {
        "id": "https://example.gov/status/65",
        "type": "CredentialStatusList2017"
    }
}"#;

/// DID document with secp256k1, RSA and Ed25519 verification methods, listed
/// under the legacy `publicKey` member.
pub const DOC: &str = r#"{
    "@context": [
        "https://w3id.org/did/v1",
        "https://w3id.org/did/v2"
    ],
    "id": "did:peer:123456789abcdefghi#inbox",
    "publicKey": [
        {
            "id": "did:peer:123456789abcdefghi#keys-1",
            "type": "Secp256k1VerificationKey2018",
            "controller": "did:peer:123456789abcdefghi",
            "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
        },
        {
            "id": "did:peer:123456789abcdefghw#key2",
            "type": "RsaVerificationKey2018",
            "controller": "did:peer:123456789abcdefghw",
            "publicKeyPem": "-----BEGIN PUBLIC KEY-----\nMIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAryQICCl6NZ5gDKrnSztO\n3Hy8PEUcuyvg/ikC+VcIo2SFFSf18a3IMYldIugqqqZCs4/4uVW3sbdLs/6PfgdX\n7O9D22ZiFWHPYA2k2N744MNiCD1UE+tJyllUhSblK48bn+v1oZHCM0nYQ2NqUkvS\nj+hwUU3RiWl7x3D2s9wSdNt7XUtW05a/FXehsPSiJfKvHJJnGOX0BgTvkLnkAOTd\nOrUZ/wK69Dzu4IvrN4vs9Nes8vbwPa/ddZEzGR0cQMt0JBkhk9kU/qwqUseP1QRJ\n5I1jR4g8aYPL/ke9K35PxZWuDp3U0UPAZ3PjFAh+5T+fc7gzCs9dPzSHloruU+gl\nFQIDAQAB\n-----END PUBLIC KEY-----"
        },
        {
            "type": "Ed25519VerificationKey2018",
            "publicKeyBase58": "GUXiqNHCdirb6NKpH6wYG4px3YfMjiCh6dQhU3zxQVQ7",
            "id": "did:sample:EiAiSE10ugVUHXsOp4pm86oN6LnjuCdrkt3s12rcVFkilQ#signing-key",
            "controller": "did:sample:EiAiSE10ugVUHXsOp4pm86oN6LnjuCdrkt3s12rcVFkilQ"
        }
    ]
}"#;

/// DID document with secp256k1 and RSA verification methods only.
pub const INVALID_DOC: &str = r#"{
    "@context": [
        "https://w3id.org/did/v1",
        "https://w3id.org/did/v2"
    ],
    "id": "did:peer:21tDAKCERh95uGgKbJNHYp",
    "publicKey": [
        {
            "id": "did:peer:123456789abcdefghi#keys-1",
            "type": "Secp256k1VerificationKey2018",
            "controller": "did:peer:123456789abcdefghi",
            "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
        },
        {
            "id": "did:peer:123456789abcdefghw#key2",
            "type": "RsaVerificationKey2018",
            "controller": "did:peer:123456789abcdefghw",
            "publicKeyPem": "-----BEGIN PUBLIC KEY-----\nMIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAryQICCl6NZ5gDKrnSztO\n3Hy8PEUcuyvg/ikC+VcIo2SFFSf18a3IMYldIugqqqZCs4/4uVW3sbdLs/6PfgdX\n7O9D22ZiFWHPYA2k2N744MNiCD1UE+tJyllUhSblK48bn+v1oZHCM0nYQ2NqUkvS\nj+hwUU3RiWl7x3D2s9wSdNt7XUtW05a/FXehsPSiJfKvHJJnGOX0BgTvkLnkAOTd\nOrUZ/wK69Dzu4IvrN4vs9Nes8vbwPa/ddZEzGR0cQMt0JBkhk9kU/qwqUseP1QRJ\n5I1jR4g8aYPL/ke9K35PxZWuDp3U0UPAZ3PjFAh+5T+fc7gzCs9dPzSHloruU+gl\nFQIDAQAB\n-----END PUBLIC KEY-----"
        }
    ]
}"#;

/// DID document without verification methods.
pub const NO_PUBLIC_KEY_DOC: &str = r#"{
    "@context": [
        "https://w3id.org/did/v1",
        "https://w3id.org/did/v2"
    ],
    "id": "did:peer:21tDAKCERh95uGgKbJNHYp"
}"#;
