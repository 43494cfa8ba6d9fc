use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::admin::AdminError;
use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberRequest {
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct RevokeTokensRequest {
    #[serde(default)]
    uid: Option<String>,
}

/// POST /api/verify-token
///
/// Verifies a client-presented id token and returns the decoded identity
/// claims. 400 when the field is absent, 401 when verification fails.
pub async fn verify_token(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyTokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = request.id_token.as_deref().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::BadRequest("No token provided"));
    }

    let claims = state.keys.verify_id_token(token).map_err(|e| {
        warn!("Token verification failed: {}", e);
        ApiError::InvalidToken
    })?;

    info!("Token verified for user {}", claims.sub);

    Ok(Json(json!({
        "success": true,
        "user": {
            "uid": claims.sub.clone(),
            "phoneNumber": claims.phone_number.clone(),
            "claims": claims,
        }
    })))
}

/// POST /api/create-custom-token
///
/// Signs a custom authentication token for a phone number, creating the
/// account first when it does not exist yet.
pub async fn create_custom_token(
    Extension(state): Extension<AppState>,
    Json(request): Json<PhoneNumberRequest>,
) -> Result<Json<Value>, ApiError> {
    let phone = require_field(request.phone_number, "Phone number required")?;

    let user = match state.admin.get_user_by_phone(&phone).await {
        Ok(user) => user,
        Err(AdminError::NotFound) => {
            let created = state.admin.create_user(&phone).await?;
            info!("New user created: {}", created.uid);
            created
        }
        Err(other) => return Err(other.into()),
    };

    let custom_token = state
        .keys
        .create_custom_token(&user.uid, user.phone_number.as_deref())
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "customToken": custom_token,
        "uid": user.uid,
    })))
}

/// POST /api/get-user-by-phone
///
/// 404 when no account exists for the number.
pub async fn get_user_by_phone(
    Extension(state): Extension<AppState>,
    Json(request): Json<PhoneNumberRequest>,
) -> Result<Json<Value>, ApiError> {
    let phone = require_field(request.phone_number, "Phone number required")?;

    let user = state.admin.get_user_by_phone(&phone).await?;

    Ok(Json(json!({
        "success": true,
        "user": {
            "uid": user.uid,
            "phoneNumber": user.phone_number,
            "disabled": user.disabled,
            "metadata": {
                "creationTime": user.created_at,
                "lastSignInTime": user.last_sign_in_at,
            }
        }
    })))
}

/// POST /api/revoke-tokens
///
/// Revokes all refresh tokens for a user and reports the revocation
/// watermark as epoch seconds.
pub async fn revoke_tokens(
    Extension(state): Extension<AppState>,
    Json(request): Json<RevokeTokensRequest>,
) -> Result<Json<Value>, ApiError> {
    let uid = require_field(request.uid, "User ID required")?;

    let valid_after = state.admin.revoke_refresh_tokens(&uid).await?;
    info!("Tokens revoked for user: {}", uid);

    Ok(Json(json!({
        "success": true,
        "message": "Tokens revoked successfully",
        "tokensValidAfterTime": valid_after.timestamp(),
    })))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "firechat-attestor",
    }))
}

fn require_field(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(message)),
    }
}
