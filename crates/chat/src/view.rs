use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::error::ChatError;
use crate::history::{HistoryClient, NewMessage};
use crate::message::{Message, MessageQuery, PageEvent};
use crate::render::{render, RenderedMessage};
use crate::store::MessageStore;
use crate::subscriber::StreamSubscriber;

/// ビューの設定
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Messages delivered with the initial live page
    pub live_page_size: u32,
    /// Messages fetched per history page
    pub history_page_size: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            live_page_size: 2,
            history_page_size: 20,
        }
    }
}

/// 履歴ロードの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Older messages were prepended
    Loaded(usize),
    /// The provider returned an empty page; loads are disabled
    NoMoreHistory,
    /// No cursor yet, already exhausted, or a load was in flight
    Skipped,
}

/// 会話ビューの状態
///
/// Holds the current conversation, the live subscription, the message
/// window and the pagination in-flight flag. At most one subscription and
/// at most one history load exist at a time.
pub struct ConversationView {
    history: HistoryClient,
    subscriber: StreamSubscriber,
    store: MessageStore,
    events: mpsc::Receiver<PageEvent>,
    conversation_id: String,
    loading_older: bool,
    options: ViewOptions,
    status: Option<String>,
}

impl ConversationView {
    /// 会話を開いて購読を開始する
    pub async fn open(
        history: HistoryClient,
        mut subscriber: StreamSubscriber,
        conversation_id: &str,
        options: ViewOptions,
    ) -> Result<Self, ChatError> {
        let events = subscriber
            .subscribe(conversation_id, options.live_page_size)
            .await?;

        info!("Opened conversation {}", conversation_id);

        Ok(Self {
            history,
            subscriber,
            store: MessageStore::new(),
            events,
            conversation_id: conversation_id.to_string(),
            loading_older: false,
            options,
            status: Some("Connected".to_string()),
        })
    }

    /// 会話を切り替える
    ///
    /// Tears down the current subscription, clears local state, and
    /// subscribes to the new conversation.
    pub async fn switch_conversation(&mut self, conversation_id: &str) -> Result<(), ChatError> {
        info!(
            "Switching conversation {} -> {}",
            self.conversation_id, conversation_id
        );

        self.subscriber.unsubscribe().await;
        self.store.clear();
        self.loading_older = false;
        self.conversation_id = conversation_id.to_string();

        self.events = self
            .subscriber
            .subscribe(conversation_id, self.options.live_page_size)
            .await?;

        Ok(())
    }

    /// 次のライブイベントを待ち、ストアへ適用する
    ///
    /// Returns `None` when the stream has ended.
    pub async fn next_event(&mut self) -> Option<PageEvent> {
        let event = self.events.recv().await?;
        self.apply_event(&event);
        Some(event)
    }

    /// ライブイベントをストアへ反映する
    pub fn apply_event(&mut self, event: &PageEvent) {
        match event {
            PageEvent::Page(newest_first) => {
                debug!("Applying live page of {} messages", newest_first.len());
                self.store.replace(newest_first.clone());
            }
            PageEvent::Error(message) => {
                // Surfaced as a status line, not fatal
                warn!("Live delivery error: {}", message);
                self.status = Some(message.clone());
            }
            PageEvent::Closed => {
                self.status = Some("Stream closed".to_string());
            }
        }
    }

    /// 古い履歴を1ページ読み込む
    ///
    /// Single-flight: a call while a load is outstanding is ignored, not
    /// queued. Without a cursor, or once history is exhausted, this is a
    /// no-op until a conversation switch resets the state.
    pub async fn load_older(&mut self) -> Result<LoadOutcome, ChatError> {
        if self.loading_older || self.store.is_exhausted() {
            return Ok(LoadOutcome::Skipped);
        }
        let cursor = match self.store.cursor() {
            Some(c) => c.clone(),
            None => return Ok(LoadOutcome::Skipped),
        };

        self.loading_older = true;

        let query = MessageQuery::new(&self.conversation_id, self.options.history_page_size)
            .before(cursor);
        let result = self.history.fetch_page(&query).await;

        self.loading_older = false;

        let page = result?;
        if page.is_empty() {
            self.store.prepend_older(Vec::new());
            self.status = Some("No more messages".to_string());
            return Ok(LoadOutcome::NoMoreHistory);
        }

        let count = page.len();
        self.store.prepend_older(page);
        Ok(LoadOutcome::Loaded(count))
    }

    /// メッセージを送信する
    ///
    /// Trims the input and ignores empty sends. The canonical record comes
    /// back through the live subscription; there is no local echo.
    pub async fn send(&mut self, text: &str) -> Result<Option<Message>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let created = self
            .history
            .append(&NewMessage::new(text, &self.conversation_id))
            .await?;
        Ok(Some(created))
    }

    /// 現在の会話ID
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// 保持中のメッセージウィンドウ
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// 直近のステータスメッセージ
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// ライブ購読が張られているか
    pub fn has_live_subscription(&self) -> bool {
        self.subscriber.is_active()
    }

    /// 現在のウィンドウを描画する
    pub fn render(&self) -> Vec<RenderedMessage> {
        render(&self.store)
    }
}
