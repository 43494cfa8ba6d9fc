use firechat_rust_attestor::admin::AdminDirectory;
use firechat_rust_attestor::config::{AttestorConfig, ServiceAccount};
use firechat_rust_attestor::tokens::TokenKeys;
use firechat_rust_attestor::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let config = AttestorConfig::from_env();
    let account = ServiceAccount::from_file(&config.service_account_path)
        .expect("Failed to load service account");

    let state = AppState {
        admin: AdminDirectory::new(
            &config.auth_url,
            &account.service_role_key,
            reqwest::Client::new(),
        ),
        keys: TokenKeys::new(&account.project_id, &account.token_secret),
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    info!("Attestor listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
