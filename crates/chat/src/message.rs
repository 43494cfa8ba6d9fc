use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// チャットメッセージ1件
///
/// `created_at` is assigned by the server; it is `None` while the record is
/// pending, which the renderer shows as a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// ページネーション用カーソル
///
/// Identifies the oldest fetched message; the next history page is strictly
/// older than this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl PageCursor {
    /// メッセージからカーソルを作成（サーバー時刻が未割当なら None）
    pub fn from_message(message: &Message) -> Option<Self> {
        message.created_at.map(|created_at| Self {
            created_at,
            id: message.id.clone(),
        })
    }
}

/// 履歴ページの問い合わせ条件
///
/// Filter equal on the conversation, order by creation time newest-first,
/// capped to `limit`, optionally strictly older than `before`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    pub conversation_id: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<PageCursor>,
}

impl MessageQuery {
    pub fn new(conversation_id: &str, limit: u32) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            limit,
            before: None,
        }
    }

    /// カーソルより古いページを要求する
    pub fn before(mut self, cursor: PageCursor) -> Self {
        self.before = Some(cursor);
        self
    }
}

/// ライブ購読から届くイベント
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Full replacement page, newest-first as delivered by the provider
    Page(Vec<Message>),
    /// Delivery error; surfaced as a status message, never fatal
    Error(String),
    /// The stream ended
    Closed,
}

/// WebSocket上のフレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StreamFrame {
    pub topic: String,
    pub event: StreamEvent,
    pub payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    pub frame_ref: serde_json::Value,
}

/// ストリームイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum StreamEvent {
    Subscribe,
    Unsubscribe,
    Page,
    Error,
    Heartbeat,
}

/// ページイベントのペイロード
#[derive(Debug, Deserialize)]
pub(crate) struct PagePayload {
    pub documents: Vec<Message>,
}

/// エラーイベントのペイロード
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: String,
}
