//! End-to-end tests of the API client contract against a mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use seagrape_client::{
    ApiError, ApiRequest, CredentialStore, MemoryCredentialStore, Method, MultipartField,
};
use seagrape_integration_tests::{RecordingNavigator, test_client};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get(p: &str) -> ApiRequest {
    ApiRequest::new(Method::GET, p)
}

#[tokio::test]
async fn valid_access_token_succeeds_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account/profile"))
        .and(header("authorization", "Bearer valid_token"))
        .and(header("api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cus_1"})))
        .expect(1)
        .mount(&server)
        .await;

    // A refresh would be a contract violation here.
    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set_credentials(
            SecretString::from("valid_token"),
            3600,
            SecretString::from("refresh_token"),
        )
        .await;
    let client = test_client(&server.uri(), store, Arc::new(RecordingNavigator::new()));

    let response = client
        .request_private(&get("/v1/account/profile"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn expired_token_refreshes_and_retries_exactly_once() {
    let server = MockServer::start().await;

    // Retried request with the fresh token succeeds.
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer new_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "ord_1"}])))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    // Any other credential on this path is rejected.
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .with_priority(5)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .and(body_json(json!({"refresh": "stored_refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new_token"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set_credentials(
            SecretString::from("expired_token"),
            3600,
            SecretString::from("stored_refresh"),
        )
        .await;
    let navigator = Arc::new(RecordingNavigator::new());
    let client = test_client(&server.uri(), store.clone(), navigator.clone());

    let response = client.request_private(&get("/orders")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.body(), r#"[{"id":"ord_1"}]"#);

    // The refreshed token was persisted.
    let access = store.access_token().await.unwrap();
    assert_eq!(access.expose_secret(), "new_token");
    assert_eq!(navigator.redirect_count(), 0);
}

#[tokio::test]
async fn second_401_surfaces_without_another_refresh() {
    let server = MockServer::start().await;

    // Even the refreshed token is rejected by the resource.
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_string("still invalid"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new_token"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set_credentials(
            SecretString::from("expired_token"),
            3600,
            SecretString::from("stored_refresh"),
        )
        .await;
    let client = test_client(&server.uri(), store, Arc::new(RecordingNavigator::new()));

    let err = client.request_private(&get("/orders")).await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "still invalid");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_credentials_fail_without_network_calls() {
    let server = MockServer::start().await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = test_client(&server.uri(), store, Arc::new(RecordingNavigator::new()));

    let err = client
        .request_private(&get("/v1/account/profile"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no network call may be issued");
}

#[tokio::test]
async fn rejected_token_without_refresh_token_fails_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;

    // With no refresh token there is nothing to exchange.
    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .store_access_token(SecretString::from("rejected_token"), 3600)
        .await;
    let navigator = Arc::new(RecordingNavigator::new());
    let client = test_client(&server.uri(), store.clone(), navigator.clone());

    let err = client.request_private(&get("/orders")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));

    // Scoped cleanup, but no navigation: the caller never had a session.
    assert!(store.access_token().await.is_none());
    assert!(store.refresh_token().await.is_none());
    assert_eq!(navigator.redirect_count(), 0);
}

#[tokio::test]
async fn rejected_refresh_clears_credentials_and_redirects_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // Refresh token itself has expired.
    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh expired"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set_refresh_token(SecretString::from("dead_refresh"))
        .await;
    let navigator = Arc::new(RecordingNavigator::new());
    let client = test_client(&server.uri(), store.clone(), navigator.clone());

    let err = client.request_private(&get("/orders")).await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));

    assert!(store.access_token().await.is_none());
    assert!(store.refresh_token().await.is_none());
    assert_eq!(navigator.redirect_count(), 1);
}

#[tokio::test]
async fn non_401_errors_pass_through_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    // No refresh may be attempted for a non-401.
    Mock::given(method("POST"))
        .and(path("/v1/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .set_credentials(
            SecretString::from("valid"),
            3600,
            SecretString::from("refresh"),
        )
        .await;
    let client = test_client(&server.uri(), store, Arc::new(RecordingNavigator::new()));

    let err = client.request_private(&get("/orders")).await.unwrap_err();
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn public_channel_sends_api_key_and_json_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/products/linen-shirt"))
        .and(header("api-key", "test-api-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(
        &server.uri(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(RecordingNavigator::new()),
    );

    let response = client
        .request_public(&get("/v1/products/linen-shirt"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // No bearer header on the public channel.
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn explicit_content_type_override_wins() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/newsletter"))
        .and(header("content-type", "application/vnd.api+json"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(
        &server.uri(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(RecordingNavigator::new()),
    );

    let request = ApiRequest::json(
        Method::POST,
        "/v1/newsletter",
        json!({"email": "a@b.c"}),
    )
    .with_content_type("application/vnd.api+json");

    let response = client.request_public(&request).await.unwrap();
    assert_eq!(response.status().as_u16(), 202);
}

#[tokio::test]
async fn multipart_body_leaves_boundary_to_the_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/uploads"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(
        &server.uri(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(RecordingNavigator::new()),
    );

    let request = ApiRequest::multipart(
        Method::POST,
        "/v1/uploads",
        vec![MultipartField::Bytes {
            name: "file".to_string(),
            data: vec![0x89, 0x50, 0x4E, 0x47],
            file_name: "image.png".to_string(),
        }],
    );

    let response = client.request_public(&request).await.unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // The transport-generated multipart header (with boundary) is intact.
    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
}
