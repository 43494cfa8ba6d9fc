//! Firechat Auth client for Rust
//!
//! This crate provides phone-number verification for Firechat: sending a
//! one-time code, confirming it, and managing the resulting session. The
//! [`PhoneAuthFlow`] type drives the whole pipeline as a state machine;
//! [`PhoneAuth`] is the raw provider client underneath it.

mod captcha;
mod error;
mod flow;

pub use captcha::{CaptchaGate, CaptchaState};
pub use error::{AuthError, AuthErrorCode};
pub use flow::{FlowState, PhoneAuthFlow, StatusKind, StatusMessage};

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::RwLock;

use crate::error::error_from_body;

/// ユーザー情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// セッション情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: User,
}

/// 発行済みの電話番号検証チャレンジ
///
/// At most one challenge is live at a time; a new send-code call supersedes
/// the previous one, and a successful confirm consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationChallenge {
    pub verification_id: String,
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

/// クライアントオプション
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub auto_refresh_token: bool,
    pub persist_session: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
        }
    }
}

/// Auth クライアント
#[derive(Clone)]
pub struct PhoneAuth {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: Arc<RwLock<Option<Session>>>,
}

impl PhoneAuth {
    /// 新しいクライアントを作成
    pub fn new(url: &str, key: &str, http_client: Client, options: AuthOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    /// 検証コードを送信
    ///
    /// Requires a solved human-verification token; the provider rejects the
    /// call without one. Returns the challenge handle needed to confirm.
    pub async fn send_verification_code(
        &self,
        phone: &str,
        captcha_token: &str,
    ) -> Result<VerificationChallenge, AuthError> {
        let url = format!("{}/auth/v1/otp", self.url);

        let payload = serde_json::json!({
            "phone": phone,
            "channel": "sms",
            "captcha_token": captcha_token,
        });

        debug!("Sending verification code to {}", phone);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(error_from_body(&error_text));
        }

        let challenge: VerificationChallenge = response.json().await?;
        Ok(challenge)
    }

    /// 電話番号と検証コードでサインイン
    pub async fn verify_phone_code(
        &self,
        challenge: &VerificationChallenge,
        code: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/verify", self.url);

        let payload = serde_json::json!({
            "phone": challenge.phone,
            "verification_id": challenge.verification_id,
            "code": code,
            "type": "sms",
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(error_from_body(&error_text));
        }

        let session: Session = response.json().await?;

        // セッションを保存
        if self.options.persist_session {
            let mut write_guard = self.current_session.write().unwrap();
            *write_guard = Some(session.clone());
        }

        Ok(session)
    }

    /// 現在のセッションを取得
    pub fn get_session(&self) -> Option<Session> {
        let read_guard = self.current_session.read().unwrap();
        read_guard.clone()
    }

    /// 既存のセッションを採用（復元）
    pub fn adopt_session(&self, session: Session) {
        let mut write_guard = self.current_session.write().unwrap();
        *write_guard = Some(session);
    }

    /// セッションをリフレッシュ
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.get_session().ok_or(AuthError::MissingSession)?;

        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.url);

        let payload = serde_json::json!({
            "refresh_token": session.refresh_token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(error_from_body(&error_text));
        }

        let new_session: Session = response.json().await?;

        // セッションを更新
        if self.options.persist_session {
            let mut write_guard = self.current_session.write().unwrap();
            *write_guard = Some(new_session.clone());
        }

        Ok(new_session)
    }

    /// 現在のベアラートークンを取得
    ///
    /// With `force_refresh` the session is refreshed against the provider
    /// before the token is returned, so a verifier never sees a stale one.
    pub async fn current_token(&self, force_refresh: bool) -> Result<String, AuthError> {
        if force_refresh {
            let session = self.refresh_session().await?;
            return Ok(session.access_token);
        }

        self.get_session()
            .map(|s| s.access_token)
            .ok_or(AuthError::MissingSession)
    }

    /// サインアウト
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.get_session().ok_or(AuthError::MissingSession)?;

        let url = format!("{}/auth/v1/logout", self.url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(error_from_body(&error_text));
        }

        // セッションをクリア
        let mut write_guard = self.current_session.write().unwrap();
        *write_guard = None;

        Ok(())
    }
}
