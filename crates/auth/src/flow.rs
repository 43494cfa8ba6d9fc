use log::{error, info, warn};

use crate::captcha::CaptchaGate;
use crate::error::{AuthError, AuthErrorCode};
use crate::{PhoneAuth, Session, VerificationChallenge};

/// 認証フローの画面状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Phone input; no challenge outstanding
    EnterPhone,
    /// A code was sent; waiting for the user to type it
    EnterCode,
    /// A session is established
    SignedIn,
}

/// ステータスメッセージの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// UIに表示するステータスメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// 電話番号認証フロー
///
/// Owns the outstanding challenge, the captcha gate and the current screen.
/// Every operation returns the status message the UI should show.
pub struct PhoneAuthFlow {
    auth: PhoneAuth,
    captcha: CaptchaGate,
    state: FlowState,
    challenge: Option<VerificationChallenge>,
    status: Option<StatusMessage>,
}

impl PhoneAuthFlow {
    pub fn new(auth: PhoneAuth) -> Self {
        Self {
            auth,
            captcha: CaptchaGate::new(),
            state: FlowState::EnterPhone,
            challenge: None,
            status: None,
        }
    }

    /// 検証コードを送信
    ///
    /// Validates the phone number locally before any network call; a solved
    /// captcha is required. On provider failure the captcha is reset so the
    /// next attempt is not blocked by a consumed solution.
    pub async fn send_code(&mut self, phone: &str) -> StatusMessage {
        let phone = match normalize_phone(phone) {
            Ok(p) => p,
            Err(err) => return self.set_status(StatusKind::Error, err.user_message()),
        };

        let token = match self.captcha.token() {
            Some(t) => t.to_string(),
            None => {
                warn!("Send attempted without a solved captcha");
                return self.set_status(
                    StatusKind::Error,
                    AuthError::CaptchaRequired.user_message(),
                );
            }
        };

        match self.auth.send_verification_code(&phone, &token).await {
            Ok(challenge) => {
                info!("Verification code sent to {}", challenge.phone);
                // A new challenge supersedes any previous one
                self.challenge = Some(challenge);
                self.state = FlowState::EnterCode;
                self.set_status(StatusKind::Success, "Verification code sent! Check your phone.")
            }
            Err(err) => {
                error!("Error sending verification code: {}", err);
                // The widget solution was consumed by the failed attempt
                self.captcha.reset();
                self.set_status(StatusKind::Error, err.user_message())
            }
        }
    }

    /// コードを確認してサインイン
    ///
    /// The challenge is kept for retry on a wrong code, but an expired code
    /// invalidates the handle and forces the flow back to the start.
    pub async fn verify(&mut self, code: &str) -> StatusMessage {
        let code = code.trim();
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            let err = AuthError::Validation(
                "Please enter the complete 6-digit verification code".to_string(),
            );
            return self.set_status(StatusKind::Error, err.user_message());
        }

        let challenge = match &self.challenge {
            Some(c) => c.clone(),
            None => {
                warn!("Verify attempted without a challenge");
                self.reset();
                return self
                    .set_status(StatusKind::Error, AuthError::MissingChallenge.user_message());
            }
        };

        match self.auth.verify_phone_code(&challenge, code).await {
            Ok(session) => {
                info!("User signed in: {}", session.user.id);
                self.challenge = None;
                self.state = FlowState::SignedIn;
                self.set_status(StatusKind::Success, "Successfully signed in!")
            }
            Err(err) => {
                error!("Error verifying code: {}", err);
                let message = err.user_message();
                if err.code() == Some(AuthErrorCode::CodeExpired) {
                    // The handle itself is dead; start over from send-code
                    self.reset();
                }
                self.set_status(StatusKind::Error, message)
            }
        }
    }

    /// サインアウトして初期状態へ戻る
    pub async fn sign_out(&mut self) -> StatusMessage {
        match self.auth.sign_out().await {
            Ok(()) => {
                info!("User signed out");
                self.reset();
                self.set_status(StatusKind::Info, "Signed out successfully")
            }
            Err(err) => {
                error!("Error signing out: {}", err);
                self.set_status(StatusKind::Error, format!("Error signing out: {}", err))
            }
        }
    }

    /// 保持済みのプロバイダセッションを採用してサインイン状態にする
    pub fn restore(&mut self, session: Session) -> StatusMessage {
        info!("Restoring session for user {}", session.user.id);
        self.auth.adopt_session(session);
        self.challenge = None;
        self.state = FlowState::SignedIn;
        self.set_status(StatusKind::Info, "Session restored")
    }

    /// フローを初期状態へ戻す
    pub fn reset(&mut self) {
        self.challenge = None;
        self.captcha.reset();
        self.state = FlowState::EnterPhone;
    }

    /// 現在の画面状態
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// 保持中のチャレンジ
    pub fn challenge(&self) -> Option<&VerificationChallenge> {
        self.challenge.as_ref()
    }

    /// 現在のセッション
    pub fn session(&self) -> Option<Session> {
        self.auth.get_session()
    }

    /// 直近のステータスメッセージ
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// 人間検証ゲートへのアクセス（ウィジェットのコールバック配線用）
    pub fn captcha_mut(&mut self) -> &mut CaptchaGate {
        &mut self.captcha
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) -> StatusMessage {
        let message = StatusMessage::new(kind, text);
        self.status = Some(message.clone());
        message
    }
}

/// 電話番号の構文チェックと正規化
///
/// Trims, strips inner spaces, requires a leading "+" and at least eight
/// characters. Rejections happen before any network call.
fn normalize_phone(phone: &str) -> Result<String, AuthError> {
    let p = phone.trim().replace(' ', "");

    if !p.starts_with('+') {
        return Err(AuthError::Validation(
            "Phone number must start with + and include country code".to_string(),
        ));
    }
    if p.len() < 8 {
        return Err(AuthError::Validation(
            "Please enter a valid phone number with country code".to_string(),
        ));
    }
    Ok(p)
}
