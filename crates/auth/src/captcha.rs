use log::{debug, warn};

/// 人間検証ウィジェットの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaState {
    /// Waiting for the user to solve the challenge
    Pending,
    /// Solved; a token is available for one send attempt
    Solved,
    /// The solution expired before it was used
    Expired,
}

/// 送信操作を守る人間検証ゲート
///
/// Wraps the widget's callback lifecycle: `on_solved` and `on_expired` are
/// driven by the embedding UI, `reset` stands in for the widget's
/// destroy-and-reinitialize cycle after a failed send.
#[derive(Debug)]
pub struct CaptchaGate {
    state: CaptchaState,
    token: Option<String>,
}

impl CaptchaGate {
    pub fn new() -> Self {
        Self {
            state: CaptchaState::Pending,
            token: None,
        }
    }

    /// ウィジェットが解決されたときに呼ぶ
    pub fn on_solved(&mut self, token: &str) {
        debug!("Captcha solved");
        self.state = CaptchaState::Solved;
        self.token = Some(token.to_string());
    }

    /// ウィジェットの解答が期限切れになったときに呼ぶ
    pub fn on_expired(&mut self) {
        warn!("Captcha solution expired");
        self.state = CaptchaState::Expired;
        self.token = None;
    }

    /// ゲートを初期状態へ戻す
    pub fn reset(&mut self) {
        self.state = CaptchaState::Pending;
        self.token = None;
    }

    /// 現在の状態
    pub fn state(&self) -> CaptchaState {
        self.state
    }

    /// 送信操作が有効かどうか
    pub fn can_send(&self) -> bool {
        self.state == CaptchaState::Solved
    }

    /// 解決済みトークン（解決されている場合のみ）
    pub fn token(&self) -> Option<&str> {
        match self.state {
            CaptchaState::Solved => self.token.as_deref(),
            _ => None,
        }
    }
}

impl Default for CaptchaGate {
    fn default() -> Self {
        Self::new()
    }
}
