//! Firechat conversation stream client for Rust
//!
//! This crate provides the chat side of the Firechat platform: a live
//! subscription to a conversation's messages, backward pagination through
//! history, message sends, and a pure renderer for the held page.

// Declare modules
mod error;
mod history;
mod message;
mod render;
mod store;
mod subscriber;
mod view;

// Re-export key public types
pub use error::ChatError;
pub use history::{HistoryClient, NewMessage};
pub use message::{Message, MessageQuery, PageCursor, PageEvent};
pub use render::{escape_html, render, RenderedMessage, ScrollAnchor};
pub use store::MessageStore;
pub use subscriber::{StreamSubscriber, SubscriptionHandle};
pub use view::{ConversationView, LoadOutcome, ViewOptions};

use reqwest::Client;

/// チャットサービスのエントリポイント
#[derive(Clone)]
pub struct ChatClient {
    url: String,
    key: String,
    http_client: Client,
}

impl ChatClient {
    /// 新しいチャットクライアントを作成
    pub fn new(url: &str, key: &str, http_client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
        }
    }

    /// 履歴と書き込み用のHTTPクライアントを取得
    pub fn history(&self) -> HistoryClient {
        HistoryClient::new(&self.url, &self.key, self.http_client.clone())
    }

    /// ライブ購読用のクライアントを取得
    pub fn subscriber(&self) -> StreamSubscriber {
        StreamSubscriber::new(&self.url, &self.key)
    }

    /// 会話ビューを開く（購読開始まで行う）
    pub async fn open_view(
        &self,
        conversation_id: &str,
        options: ViewOptions,
    ) -> Result<ConversationView, ChatError> {
        ConversationView::open(self.history(), self.subscriber(), conversation_id, options).await
    }
}
