use firechat_rust::auth::{FlowState, StatusKind};
use firechat_rust::chat::MessageQuery;
use firechat_rust::config::{ClientOptions, ProjectConfig};
use firechat_rust::Firechat;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_client_initialization() {
    let firechat = Firechat::new("https://demo.firechat.app", "test_anon_key");

    assert_eq!(firechat.url, "https://demo.firechat.app");
    assert_eq!(firechat.key, "test_anon_key");
    // デフォルトのページサイズ設定
    assert_eq!(firechat.options.live_page_size, 2);
    assert_eq!(firechat.options.history_page_size, 20);
}

#[test]
fn test_client_with_custom_options() {
    let options = ClientOptions::default()
        .with_auto_refresh_token(false)
        .with_history_page_size(50);

    let firechat = Firechat::new_with_options("https://demo.firechat.app", "key", options);

    assert!(!firechat.options.auto_refresh_token);
    assert_eq!(firechat.options.history_page_size, 50);
}

#[test]
fn test_project_config_defaults_to_unconfigured() {
    let config = ProjectConfig::default();
    assert!(!config.is_configured());

    let config = ProjectConfig {
        api_key: "key".to_string(),
        project_id: "demo".to_string(),
        project_url: "https://demo.firechat.app".to_string(),
    };
    assert!(config.is_configured());
}

#[tokio::test]
async fn test_phone_flow_shares_session_with_auth() {
    // モックサーバーでFirechat認証APIを設定
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "verification_id": "test_verification_id",
            "phone": "+4791234567",
            "expires_at": "2021-01-01T00:05:00Z"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test_access_token",
            "refresh_token": "test_refresh_token",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {
                "id": "test_user_id",
                "phone": "+4791234567",
                "created_at": "2021-01-01T00:00:00Z",
                "updated_at": "2021-01-01T00:00:00Z"
            }
        })))
        .mount(&mock_server)
        .await;

    let firechat = Firechat::new(&mock_server.uri(), "test_anon_key");
    let mut flow = firechat.phone_flow();

    // 電話番号の検証フローを最後まで実行
    flow.captcha_mut().on_solved("captcha_token");
    let status = flow.send_code("+4791234567").await;
    assert_eq!(status.kind, StatusKind::Success);

    let status = flow.verify("123456").await;
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(flow.state(), FlowState::SignedIn);

    // フローで確立したセッションはクライアント本体のauth()からも見える
    let session = firechat.auth().get_session().expect("session after sign-in");
    assert_eq!(session.access_token, "test_access_token");
    assert_eq!(session.user.id, "test_user_id");
}

#[tokio::test]
async fn test_chat_history_via_facade() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {
                    "id": "msg-2",
                    "text": "Hello again",
                    "conversationId": "general",
                    "createdAt": "2024-01-01T00:00:10Z"
                },
                {
                    "id": "msg-1",
                    "text": "Hello",
                    "conversationId": "general",
                    "createdAt": "2024-01-01T00:00:00Z"
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let firechat = Firechat::new(&mock_server.uri(), "test_anon_key");
    let history = firechat.chat().history();

    let page = history
        .fetch_page(&MessageQuery::new("general", 20))
        .await
        .unwrap();

    // 新しい順で返る
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, "msg-2");
    assert_eq!(page[1].id, "msg-1");
}
