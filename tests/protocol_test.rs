// Golden JSON fixtures for control-plane request bodies

use serde_json::Value;
use tinyfaas_client::protocol::{DeleteRequest, InvokeRequest, UploadLocalRequest, UploadUrlRequest};

fn fixture(contents: &str) -> Value {
    serde_json::from_str(contents).expect("fixture is valid JSON")
}

#[test]
fn test_upload_local_matches_fixture() {
    let request = UploadLocalRequest::new(
        "sieve",
        "nodejs",
        2,
        "UEsFBgAAAAAAAAAAAAAAAAAAAAAAAA==".to_string(),
        vec!["LOG_LEVEL=debug".to_string(), "MAX_PRIME=10000".to_string()],
    )
    .unwrap();

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        fixture(include_str!("fixtures/upload_local.json"))
    );
}

#[test]
fn test_upload_url_with_no_envs_sends_empty_list() {
    let request = UploadUrlRequest::new(
        "sieve",
        "nodejs",
        1,
        "https://github.com/OpenFogStack/tinyFaas/archive/main.zip",
        "tinyFaaS-main/test/fns/sieve-of-eratosthenes",
        Vec::new(),
    )
    .unwrap();

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value, fixture(include_str!("fixtures/upload_url.json")));
    assert_eq!(value["envs"], Value::Array(vec![]));
}

#[test]
fn test_delete_matches_fixture() {
    let request = DeleteRequest::new("sieve");
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        fixture(include_str!("fixtures/delete.json"))
    );
}

#[test]
fn test_invoke_keeps_binary_payload_raw() {
    let payload = vec![0u8, 1, 2, 0xfe, 0xff, b'\n', 0x80];
    let request = InvokeRequest::new("echo", payload.clone());
    assert_eq!(request.payload, payload);
    assert_eq!(request.path(), "/echo");
}
