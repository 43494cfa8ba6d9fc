use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by Firechat bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from the service account
#[derive(Clone)]
pub struct TokenKeys {
    project_id: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(project_id: &str, secret: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a client-presented id token and return its claims
    ///
    /// Expiry is validated; a token signed with any other key fails.
    pub fn verify_id_token(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        let data = decode::<TokenClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// Sign a custom token for server-side authentication (1 hour expiry)
    pub fn create_custom_token(
        &self,
        uid: &str,
        phone_number: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: uid.to_string(),
            phone_number: phone_number.map(str::to_string),
            iss: format!("firechat-attestor/{}", self.project_id),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }
}
