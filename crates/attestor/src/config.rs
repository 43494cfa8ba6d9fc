use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read service account file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed service account file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Service-account credentials granting administrative access
///
/// Loaded from a JSON file whose path comes from the environment; the file
/// must never be checked in.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    /// Key used to verify and sign bearer tokens
    pub token_secret: String,
    /// Key presented to the identity service's admin API
    pub service_role_key: String,
}

impl ServiceAccount {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let account = serde_json::from_str(&raw)?;
        Ok(account)
    }
}

/// Environment-driven service configuration
#[derive(Debug, Clone)]
pub struct AttestorConfig {
    /// Listen port (`PORT`, default 3030)
    pub port: u16,
    /// Path to the service account file (`SERVICE_ACCOUNT_PATH`)
    pub service_account_path: String,
    /// Base URL of the identity service (`FIRECHAT_AUTH_URL`)
    pub auth_url: String,
}

impl AttestorConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);

        Self {
            port,
            service_account_path: std::env::var("SERVICE_ACCOUNT_PATH")
                .unwrap_or_else(|_| "serviceAccount.json".to_string()),
            auth_url: std::env::var("FIRECHAT_AUTH_URL")
                .unwrap_or_else(|_| "http://localhost:9999".to_string()),
        }
    }
}
