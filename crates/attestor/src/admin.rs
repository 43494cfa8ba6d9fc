use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Errors from the identity service's admin API
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("User not found")]
    NotFound,

    #[error("Admin API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Account record as reported by the identity service
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub uid: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    pub created_at: Option<String>,
    pub last_sign_in_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RevokeResponse {
    tokens_valid_after: DateTime<Utc>,
}

/// Administrative client for the identity service
///
/// All calls authenticate with the service-role key; this client must never
/// be reachable from untrusted code.
#[derive(Clone)]
pub struct AdminDirectory {
    url: String,
    service_role_key: String,
    http_client: Client,
}

impl AdminDirectory {
    pub fn new(url: &str, service_role_key: &str, http_client: Client) -> Self {
        Self {
            url: url.to_string(),
            service_role_key: service_role_key.to_string(),
            http_client,
        }
    }

    /// Look up an account by phone number
    pub async fn get_user_by_phone(&self, phone: &str) -> Result<DirectoryUser, AdminError> {
        let url = format!("{}/auth/v1/admin/users", self.url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("phone", phone)])
            .header("apikey", &self.service_role_key)
            .header(
                "Authorization",
                format!("Bearer {}", &self.service_role_key),
            )
            .send()
            .await?;

        Self::user_from_response(response).await
    }

    /// Create an account for a phone number
    pub async fn create_user(&self, phone: &str) -> Result<DirectoryUser, AdminError> {
        let url = format!("{}/auth/v1/admin/users", self.url);

        let payload = serde_json::json!({
            "phone": phone,
            "phone_confirm": true,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.service_role_key)
            .header(
                "Authorization",
                format!("Bearer {}", &self.service_role_key),
            )
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminError::Api(format!(
                "Failed to create user: {}",
                error_text
            )));
        }

        Ok(response.json().await?)
    }

    /// Revoke all outstanding refresh tokens for a user
    ///
    /// Returns the revocation watermark: tokens issued before this instant
    /// are no longer valid.
    pub async fn revoke_refresh_tokens(&self, uid: &str) -> Result<DateTime<Utc>, AdminError> {
        let url = format!("{}/auth/v1/admin/users/{}/revoke", self.url, uid);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.service_role_key)
            .header(
                "Authorization",
                format!("Bearer {}", &self.service_role_key),
            )
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NotFound);
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminError::Api(format!(
                "Failed to revoke tokens: {}",
                error_text
            )));
        }

        let revoked: RevokeResponse = response.json().await?;
        Ok(revoked.tokens_valid_after)
    }

    async fn user_from_response(response: reqwest::Response) -> Result<DirectoryUser, AdminError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NotFound);
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminError::Api(format!("Failed to get user: {}", error_text)));
        }

        Ok(response.json().await?)
    }
}
