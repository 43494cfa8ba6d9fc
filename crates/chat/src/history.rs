use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::message::{Message, MessageQuery};

/// 書き込み用のメッセージレコード
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub text: String,
    pub conversation_id: String,
}

impl NewMessage {
    pub fn new(text: &str, conversation_id: &str) -> Self {
        Self {
            text: text.to_string(),
            conversation_id: conversation_id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    documents: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    document: Message,
}

/// 履歴取得と書き込みのHTTPクライアント
#[derive(Clone)]
pub struct HistoryClient {
    url: String,
    key: String,
    http_client: Client,
}

impl HistoryClient {
    /// 新しいクライアントを作成
    pub fn new(url: &str, key: &str, http_client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
        }
    }

    /// 1ページ分のメッセージを取得
    ///
    /// The provider returns messages newest-first, filtered to the query's
    /// conversation, capped to its limit, and strictly older than its cursor
    /// when one is set.
    pub async fn fetch_page(&self, query: &MessageQuery) -> Result<Vec<Message>, ChatError> {
        let url = format!("{}/chat/v1/query", self.url);

        let payload = serde_json::json!({
            "collection": "messages",
            "filter": { "conversationId": query.conversation_id },
            "orderBy": { "field": "createdAt", "direction": "desc" },
            "limit": query.limit,
            "startAfter": query.before,
        });

        debug!(
            "Fetching page for conversation {} (limit {}, cursor: {})",
            query.conversation_id,
            query.limit,
            query.before.is_some()
        );

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
            return Err(ChatError::ApiError(error_text));
        }

        let page: QueryResponse = response.json().await?;
        Ok(page.documents)
    }

    /// メッセージを追記
    ///
    /// The server assigns the timestamp; the returned record may still be
    /// pending. There is no local echo, the live subscription delivers the
    /// canonical record.
    pub async fn append(&self, message: &NewMessage) -> Result<Message, ChatError> {
        let url = format!("{}/chat/v1/documents", self.url);

        let payload = serde_json::json!({
            "collection": "messages",
            "document": message,
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
            return Err(ChatError::ApiError(error_text));
        }

        let created: AppendResponse = response.json().await?;
        Ok(created.document)
    }
}
