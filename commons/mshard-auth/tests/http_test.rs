mod common;

use std::sync::Arc;

use common::credential;
use mshard_auth::{
    BlobClient, CredentialError, HttpTokenExchanger, LifecycleManager, RemoteError,
    RetryError, TokenClientSettings, TokenExchanger,
};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn exchanger() -> Arc<HttpTokenExchanger> {
    Arc::new(HttpTokenExchanger::new(&TokenClientSettings::default()).unwrap())
}

async fn mount_token_endpoint(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=secret-1"))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn exchange_posts_refresh_grant() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })),
        1,
    )
    .await;

    let token = exchanger()
        .exchange(&credential(&format!("{}/token", server.uri())))
        .await
        .unwrap();
    assert_eq!(token, "fresh");
}

#[tokio::test]
async fn non_success_status_is_a_refresh_failure() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        ResponseTemplate::new(400).set_body_string("invalid_grant"),
        1,
    )
    .await;

    let err = exchanger()
        .exchange(&credential(&format!("{}/token", server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err, CredentialError::refresh_failed(Some(400), "invalid_grant"));
}

async fn mount_item(server: &MockServer, token: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/mediaItems/item-7"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn item_body() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "item-7",
        "filename": "IMG_0007.jpg",
        "mimeType": "image/jpeg"
    }))
}

#[test_log::test(tokio::test)]
async fn unauthorized_call_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "fresh"})),
        1,
    )
    .await;
    mount_item(&server, "old-access", ResponseTemplate::new(401), 1).await;
    mount_item(&server, "fresh", item_body(), 1).await;

    let manager = LifecycleManager::new(credential(&format!("{}/token", server.uri())), exchanger());
    let client = BlobClient::new(server.uri(), &TokenClientSettings::default()).unwrap();
    let meta = client
        .get_item_metadata(&manager, "item-7", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(meta.filename.as_deref(), Some("IMG_0007.jpg"));
    assert_eq!(meta.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(manager.credential().await.access_token, "fresh");
}

#[test_log::test(tokio::test)]
async fn second_unauthorized_is_not_retried_again() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "fresh"})),
        1,
    )
    .await;
    mount_item(&server, "old-access", ResponseTemplate::new(401), 1).await;
    mount_item(&server, "fresh", ResponseTemplate::new(401), 1).await;

    let manager = LifecycleManager::new(credential(&format!("{}/token", server.uri())), exchanger());
    let client = BlobClient::new(server.uri(), &TokenClientSettings::default()).unwrap();
    let err = client
        .get_item_metadata(&manager, "item-7", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RetryError::Remote(RemoteError::Unauthorized)));
}

#[test_log::test(tokio::test)]
async fn failed_refresh_is_propagated_without_retry() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, ResponseTemplate::new(500), 1).await;
    mount_item(&server, "old-access", ResponseTemplate::new(401), 1).await;

    let manager = LifecycleManager::new(credential(&format!("{}/token", server.uri())), exchanger());
    let client = BlobClient::new(server.uri(), &TokenClientSettings::default()).unwrap();
    let err = client
        .get_item_metadata(&manager, "item-7", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RetryError::Refresh(CredentialError::RefreshFailed { status: Some(500), .. })
    ));
    assert_eq!(manager.credential().await.access_token, "old-access");
}

#[test_log::test(tokio::test)]
async fn other_failures_skip_the_refresh() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, ResponseTemplate::new(200), 0).await;
    mount_item(&server, "old-access", ResponseTemplate::new(404).set_body_string("gone"), 1).await;

    let manager = LifecycleManager::new(credential(&format!("{}/token", server.uri())), exchanger());
    let client = BlobClient::new(server.uri(), &TokenClientSettings::default()).unwrap();
    let err = client
        .get_item_metadata(&manager, "item-7", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.remote(),
        Some(RemoteError::Status { status: 404, message }) if message == "gone"
    ));
    assert_eq!(manager.refresh_count(), 0);
}
