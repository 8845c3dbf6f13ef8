//! Tests for validating, saving and fetching credentials.

use std::io::sink;

use serde_json::{json, Value};
use test_utils::data::{INVALID_VC, SAMPLE_VC_ID, SAMPLE_VC_NAME, VC};
use test_utils::{MockStorageProvider, MockStore, Provider};
use vercre_verifiable::command::{CredentialRecordResult, CredentialResponse};
use vercre_verifiable::error::Err;
use vercre_verifiable::{Command, CredentialRecord};

fn command() -> Command<Provider> {
    Command::new(Provider::new()).expect("should create command")
}

fn save_request(vc: &str, name: &str) -> String {
    json!({"verifiableCredential": vc, "name": name}).to_string()
}

// Validation writes nothing and gives the same verdict every time.
#[tokio::test]
async fn validate() {
    let cmd = command();
    let req = json!({"verifiableCredential": VC}).to_string();

    for _ in 0..2 {
        let mut rw = Vec::<u8>::new();
        cmd.validate_credential(&mut rw, req.as_bytes()).await.expect("should validate");
        assert!(rw.is_empty());
    }
}

#[tokio::test]
async fn validate_invalid_request() {
    let err = command().validate_credential(&mut sink(), "--".as_bytes()).await.unwrap_err();
    assert!(err.is(Err::RequestDecode));
    assert!(err.to_string().starts_with("request decode"));
}

#[tokio::test]
async fn validate_missing_context() {
    let cmd = command();
    let req = json!({"verifiableCredential": INVALID_VC}).to_string();

    for _ in 0..2 {
        let err = cmd.validate_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
        assert!(err.is(Err::MalformedCredential));
        assert!(err.to_string().starts_with("new credential: build new credential"));
    }
}

// Saved content is returned byte for byte.
#[tokio::test]
async fn save_and_get() {
    let cmd = command();
    let req = save_request(VC, SAMPLE_VC_NAME);
    cmd.save_credential(&mut sink(), req.as_bytes()).await.expect("should save");

    let req = json!({"id": SAMPLE_VC_ID}).to_string();
    let mut rw = Vec::<u8>::new();
    cmd.get_credential(&mut rw, req.as_bytes()).await.expect("should get");

    let resp: CredentialResponse = serde_json::from_slice(&rw).expect("should deserialize");
    assert_eq!(resp.verifiable_credential, VC);
}

#[tokio::test]
async fn save_invalid_request() {
    let err = command().save_credential(&mut sink(), "--".as_bytes()).await.unwrap_err();
    assert!(err.to_string().contains("request decode"));
}

// Nothing is written for a credential that fails validation.
#[tokio::test]
async fn save_invalid_credential() {
    let provider = Provider::new();
    let store = provider.store().clone();
    let cmd = Command::new(provider).expect("should create command");

    let req = save_request(INVALID_VC, SAMPLE_VC_NAME);
    let err = cmd.save_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.to_string().contains("new credential"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn save_store_error() {
    let storage = MockStorageProvider::new().with_store(MockStore::new().err_put("put error"));
    let cmd = Command::new(Provider::new().storage(storage)).expect("should create command");

    let req = save_request(VC, SAMPLE_VC_NAME);
    let err = cmd.save_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.is(Err::StorageError));
    assert_eq!(err.to_string(), "save vc: storage error: put error");
}

// A save interrupted after its first write leaves nothing readable.
#[tokio::test]
async fn save_interrupted() {
    let store = MockStore::new().err_put_after(1, "disk full");
    let storage = MockStorageProvider::new().with_store(store);
    let cmd = Command::new(Provider::new().storage(storage)).expect("should create command");

    let req = save_request(VC, SAMPLE_VC_NAME);
    let err = cmd.save_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert_eq!(err.to_string(), "save vc: storage error: disk full");

    let req = json!({"id": SAMPLE_VC_ID}).to_string();
    let err = cmd.get_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.is(Err::NotFound));

    let req = json!({"name": SAMPLE_VC_NAME}).to_string();
    let err = cmd.get_credential_by_name(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.is(Err::NotFound));

    let mut rw = Vec::<u8>::new();
    cmd.get_credentials(&mut rw).await.expect("should list");
    let resp: Value = serde_json::from_slice(&rw).expect("should deserialize");
    assert_eq!(resp, json!({"result": []}));
}

#[tokio::test]
async fn get_invalid_request() {
    let err = command().get_credential(&mut sink(), "--".as_bytes()).await.unwrap_err();
    assert!(err.to_string().contains("request decode"));
}

#[tokio::test]
async fn get_no_id() {
    let err = command().get_credential(&mut sink(), "{}".as_bytes()).await.unwrap_err();
    assert!(err.is(Err::MandatoryFieldMissing));
    assert!(err.to_string().contains("credential id is mandatory"));
}

#[tokio::test]
async fn get_not_found() {
    let req = json!({"id": SAMPLE_VC_ID}).to_string();
    let err = command().get_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.is(Err::NotFound));
    assert!(err.to_string().starts_with("get vc"));
}

#[tokio::test]
async fn get_store_error() {
    let storage = MockStorageProvider::new().with_store(MockStore::new().err_get("get error"));
    let cmd = Command::new(Provider::new().storage(storage)).expect("should create command");

    let req = json!({"id": SAMPLE_VC_ID}).to_string();
    let err = cmd.get_credential(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.is(Err::StorageError));
    assert_eq!(err.to_string(), "get vc: storage error: get error");
}

#[tokio::test]
async fn get_by_name() {
    let cmd = command();
    let req = save_request(VC, SAMPLE_VC_NAME);
    cmd.save_credential(&mut sink(), req.as_bytes()).await.expect("should save");

    let req = json!({"name": SAMPLE_VC_NAME}).to_string();
    let mut rw = Vec::<u8>::new();
    cmd.get_credential_by_name(&mut rw, req.as_bytes()).await.expect("should get");

    let record: CredentialRecord = serde_json::from_slice(&rw).expect("should deserialize");
    assert_eq!(record.id, SAMPLE_VC_ID);
    assert_eq!(record.name.as_deref(), Some(SAMPLE_VC_NAME));
}

#[tokio::test]
async fn get_by_name_invalid_request() {
    let err = command().get_credential_by_name(&mut sink(), "--".as_bytes()).await.unwrap_err();
    assert!(err.to_string().contains("request decode"));
}

#[tokio::test]
async fn get_by_name_no_name() {
    let err = command().get_credential_by_name(&mut sink(), "{}".as_bytes()).await.unwrap_err();
    assert!(err.is(Err::MandatoryFieldMissing));
    assert!(err.to_string().contains("credential name is mandatory"));
}

#[tokio::test]
async fn get_by_name_store_error() {
    let storage = MockStorageProvider::new().with_store(MockStore::new().err_get("get error"));
    let cmd = Command::new(Provider::new().storage(storage)).expect("should create command");

    let req = json!({"name": SAMPLE_VC_NAME}).to_string();
    let err = cmd.get_credential_by_name(&mut sink(), req.as_bytes()).await.unwrap_err();
    assert!(err.to_string().starts_with("get vc by name"));
}

#[tokio::test]
async fn list_empty() {
    let mut rw = Vec::<u8>::new();
    command().get_credentials(&mut rw).await.expect("should list");

    let resp: Value = serde_json::from_slice(&rw).expect("should deserialize");
    assert_eq!(resp, json!({"result": []}));
}

#[tokio::test]
async fn list() {
    let cmd = command();
    let req = save_request(VC, SAMPLE_VC_NAME);
    cmd.save_credential(&mut sink(), req.as_bytes()).await.expect("should save");

    // saving again replaces the first record
    cmd.save_credential(&mut sink(), req.as_bytes()).await.expect("should save");

    let mut rw = Vec::<u8>::new();
    cmd.get_credentials(&mut rw).await.expect("should list");

    let resp: CredentialRecordResult = serde_json::from_slice(&rw).expect("should deserialize");
    assert_eq!(resp.result.len(), 1);
    assert_eq!(resp.result[0].id, SAMPLE_VC_ID);
    assert_eq!(resp.result[0].name.as_deref(), Some(SAMPLE_VC_NAME));
}

#[tokio::test]
async fn list_store_error() {
    let store = MockStore::new().err_iterate("iterate error");
    let storage = MockStorageProvider::new().with_store(store);
    let cmd = Command::new(Provider::new().storage(storage)).expect("should create command");

    let err = cmd.get_credentials(&mut sink()).await.unwrap_err();
    assert_eq!(err.to_string(), "get vcs: storage error: iterate error");
}
