use serde::Deserialize;
use thiserror::Error;

/// エラー型
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{message}")]
    Provider {
        code: AuthErrorCode,
        message: String,
    },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,

    #[error("Please request a verification code first")]
    MissingChallenge,

    #[error("{0}")]
    Validation(String),

    #[error("Human verification required")]
    CaptchaRequired,
}

impl AuthError {
    /// ユーザーに表示するメッセージを返す
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Provider { code, message } => code
                .user_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("An error occurred: {}", message)),
            other => other.to_string(),
        }
    }

    /// プロバイダのエラーコードを取得（該当する場合）
    pub fn code(&self) -> Option<AuthErrorCode> {
        match self {
            AuthError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// プロバイダが報告するエラーコードの閉じた集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidPhoneNumber,
    InvalidVerificationCode,
    CodeExpired,
    TooManyRequests,
    /// Anything outside the mapped set; the raw provider message is surfaced
    Other,
}

impl AuthErrorCode {
    /// プロバイダのコード文字列から変換
    pub fn from_code(raw: &str) -> Self {
        // Some providers namespace their codes ("auth/invalid-phone-number")
        let code = raw.strip_prefix("auth/").unwrap_or(raw);
        match code {
            "invalid-phone-number" => Self::InvalidPhoneNumber,
            "invalid-verification-code" => Self::InvalidVerificationCode,
            "code-expired" => Self::CodeExpired,
            "too-many-requests" => Self::TooManyRequests,
            _ => Self::Other,
        }
    }

    /// 固定のユーザー向けメッセージ
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPhoneNumber => Some("Invalid phone number format"),
            Self::InvalidVerificationCode => Some("Invalid verification code"),
            Self::CodeExpired => Some("Code expired. Request a new one"),
            Self::TooManyRequests => Some("Too many attempts. Wait before trying again"),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// エラーレスポンス本文をAuthErrorへ変換
///
/// Falls back to `ApiError` with the raw body when the structured
/// `{error: {code, message}}` shape is not present.
pub(crate) fn error_from_body(body: &str) -> AuthError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => AuthError::Provider {
            code: AuthErrorCode::from_code(&parsed.error.code),
            message: parsed.error.message,
        },
        Err(_) => AuthError::ApiError(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(
            AuthErrorCode::from_code("invalid-phone-number"),
            AuthErrorCode::InvalidPhoneNumber
        );
        assert_eq!(
            AuthErrorCode::from_code("auth/invalid-verification-code"),
            AuthErrorCode::InvalidVerificationCode
        );
        assert_eq!(AuthErrorCode::from_code("code-expired"), AuthErrorCode::CodeExpired);
        assert_eq!(
            AuthErrorCode::from_code("too-many-requests"),
            AuthErrorCode::TooManyRequests
        );
    }

    #[test]
    fn unmapped_code_falls_back_to_raw_message() {
        let err = error_from_body(r#"{"error":{"code":"quota-exceeded","message":"SMS quota exhausted"}}"#);
        assert_eq!(err.code(), Some(AuthErrorCode::Other));
        assert_eq!(err.user_message(), "An error occurred: SMS quota exhausted");
    }

    #[test]
    fn mapped_code_uses_fixed_message() {
        let err = error_from_body(r#"{"error":{"code":"code-expired","message":"grant expired"}}"#);
        assert_eq!(err.user_message(), "Code expired. Request a new one");
    }

    #[test]
    fn unstructured_body_becomes_api_error() {
        let err = error_from_body("gateway timeout");
        assert!(matches!(err, AuthError::ApiError(_)));
    }
}
