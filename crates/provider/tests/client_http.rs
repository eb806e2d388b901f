//! HTTP-level tests for the Prism Central client
//!
//! Uses wiremock to stand in for the v3 API.

use nutanix_common::{CategoryKey, Error, ProviderConfig};
use nutanix_provider::diagnostics::has_errors;
use nutanix_provider::state::{get_string_attr, make_state, string_value, DynamicValue};
use nutanix_provider::{NutanixApi, NutanixClient, NutanixProvider};
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NutanixClient {
    let config = ProviderConfig {
        endpoint: server.uri(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        ..Default::default()
    };
    NutanixClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_upsert_puts_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/nutanix/v3/categories/k1"))
        .and(basic_auth("admin", "secret"))
        .and(body_json(serde_json::json!({ "name": "k1", "description": "team" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "k1",
            "description": "team",
            "api_version": "3.1",
            "system_defined": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client
        .create_or_update_category_key(&CategoryKey::new("k1").with_description("team"))
        .await
        .unwrap();

    assert_eq!(status.name(), "k1");
    assert_eq!(status.api_version(), "3.1");
    assert!(!status.system_defined());
}

#[tokio::test]
async fn test_get_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/categories/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).get_category_key("missing").await.unwrap_err();

    match err {
        Error::NotFound { kind, id } => {
            assert_eq!(kind, "category_key");
            assert_eq!(id, "missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_message_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/categories/k1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "state": "ERROR",
            "code": 500,
            "message_list": [{ "message": "Internal error", "reason": "INTERNAL_ERROR" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_category_key("k1").await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nutanix/v3/categories/k1"))
        .respond_with(ResponseTemplate::new(409).set_body_string("category in use"))
        .mount(&server)
        .await;

    let err = client_for(&server).delete_category_key("k1").await.unwrap_err();

    assert_eq!(err.to_string(), "Nutanix API error (409): category in use");
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nutanix/v3/categories/k1"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_category_key("k1").await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/categories/k1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_category_key("k1").await.unwrap_err();

    assert!(matches!(err, Error::Serialization(_)), "{err:?}");
}

#[tokio::test]
async fn test_provider_create_over_http() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "name": "env",
        "description": "",
        "api_version": "3.1",
        "system_defined": false
    });

    Mock::given(method("PUT"))
        .and(path("/api/nutanix/v3/categories/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/nutanix/v3/categories/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let provider = NutanixProvider::new();
    let diags = provider
        .configure_provider(&make_state(vec![("endpoint", string_value(server.uri()))]))
        .await;
    assert!(!has_errors(&diags), "{diags:?}");

    let planned = make_state(vec![("name", string_value("env"))]);
    let resp = provider
        .apply_resource_change("nutanix_category_key", &DynamicValue::Null, &planned)
        .await;

    assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
    let state = resp.new_state.unwrap();
    assert_eq!(get_string_attr(&state, "id"), "env");
    assert_eq!(get_string_attr(&state, "api_version"), "3.1");
}
