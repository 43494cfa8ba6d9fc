use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firechat_rust_attestor::admin::AdminDirectory;
use firechat_rust_attestor::tokens::TokenKeys;
use firechat_rust_attestor::{router, AppState};

const TOKEN_SECRET: &str = "test_secret";

fn test_keys() -> TokenKeys {
    TokenKeys::new("demo-project", TOKEN_SECRET)
}

fn test_app(auth_url: &str) -> Router {
    let state = AppState {
        admin: AdminDirectory::new(auth_url, "service-role-key", reqwest::Client::new()),
        keys: test_keys(),
    };
    router(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_service_status() {
    let app = test_app("http://localhost:9999");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "firechat-attestor");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn verify_token_accepts_valid_token() {
    let app = test_app("http://localhost:9999");
    let token = test_keys()
        .create_custom_token("user-42", Some("+4791234567"))
        .unwrap();

    let response = app
        .oneshot(post_json("/api/verify-token", json!({ "idToken": token })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["uid"], "user-42");
    assert_eq!(body["user"]["phoneNumber"], "+4791234567");
    assert_eq!(body["user"]["claims"]["sub"], "user-42");
}

#[tokio::test]
async fn verify_token_requires_a_token() {
    let app = test_app("http://localhost:9999");

    let response = app
        .oneshot(post_json("/api/verify-token", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn verify_token_rejects_garbage() {
    let app = test_app("http://localhost:9999");

    let response = app
        .oneshot(post_json(
            "/api/verify-token",
            json!({ "idToken": "not-a-real-token" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn get_user_by_phone_returns_account_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .and(query_param("phone", "+4791234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "user-42",
            "phone_number": "+4791234567",
            "disabled": false,
            "created_at": "2024-01-01T00:00:00Z",
            "last_sign_in_at": "2024-06-01T12:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let response = app
        .oneshot(post_json(
            "/api/get-user-by-phone",
            json!({ "phoneNumber": "+4791234567" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["uid"], "user-42");
    assert_eq!(body["user"]["phoneNumber"], "+4791234567");
    assert_eq!(body["user"]["disabled"], false);
    assert_eq!(body["user"]["metadata"]["creationTime"], "2024-01-01T00:00:00Z");
    assert_eq!(
        body["user"]["metadata"]["lastSignInTime"],
        "2024-06-01T12:00:00Z"
    );
}

#[tokio::test]
async fn get_user_by_phone_maps_missing_account_to_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let response = app
        .oneshot(post_json(
            "/api/get-user-by-phone",
            json!({ "phoneNumber": "+4700000000" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn get_user_by_phone_requires_phone_number() {
    let app = test_app("http://localhost:9999");

    let response = app
        .oneshot(post_json("/api/get-user-by-phone", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Phone number required");
}

#[tokio::test]
async fn create_custom_token_provisions_missing_account() {
    let mock_server = MockServer::start().await;

    // Lookup misses, so the handler must create the account first
    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "user-fresh",
            "phone_number": "+4791234567",
            "disabled": false,
            "created_at": "2024-06-01T00:00:00Z",
            "last_sign_in_at": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let response = app
        .oneshot(post_json(
            "/api/create-custom-token",
            json!({ "phoneNumber": "+4791234567" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["uid"], "user-fresh");

    // The returned token must verify against the service's own keys
    let claims = test_keys()
        .verify_id_token(body["customToken"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "user-fresh");
    assert_eq!(claims.phone_number.as_deref(), Some("+4791234567"));
}

#[tokio::test]
async fn create_custom_token_reuses_existing_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .and(query_param("phone", "+4791234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "user-42",
            "phone_number": "+4791234567",
            "disabled": false,
            "created_at": "2024-01-01T00:00:00Z",
            "last_sign_in_at": null
        })))
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let response = app
        .oneshot(post_json(
            "/api/create-custom-token",
            json!({ "phoneNumber": "+4791234567" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["uid"], "user-42");
}

#[tokio::test]
async fn revoke_tokens_reports_epoch_watermark() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users/user-42/revoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens_valid_after": "2024-06-01T12:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let response = app
        .oneshot(post_json("/api/revoke-tokens", json!({ "uid": "user-42" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Tokens revoked successfully");
    assert_eq!(body["tokensValidAfterTime"], 1717243200);
}

#[tokio::test]
async fn revoke_tokens_requires_uid() {
    let app = test_app("http://localhost:9999");

    let response = app
        .oneshot(post_json("/api/revoke-tokens", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User ID required");
}
