use crate::message::{Message, PageCursor};

/// 会話のローカルウィンドウ
///
/// Holds messages in chronological (ascending) order. Pages arrive from the
/// provider newest-first; `replace` and `prepend_older` reverse them into
/// place. The cursor always tracks the oldest fetched record.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    cursor: Option<PageCursor>,
    exhausted: bool,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ライブページでウィンドウ全体を置き換える
    ///
    /// Live updates deliver the canonical newest page; the held window is
    /// replaced wholesale and the cursor moves to the new oldest item.
    /// Exhaustion is untouched; only a conversation switch resets it.
    pub fn replace(&mut self, mut newest_first: Vec<Message>) {
        self.cursor = newest_first.last().and_then(PageCursor::from_message);
        newest_first.reverse();
        self.messages = newest_first;
    }

    /// 古いページを先頭に追加する
    ///
    /// An empty page means there is no more history; further loads are
    /// disabled until the store is cleared.
    pub fn prepend_older(&mut self, mut newest_first: Vec<Message>) {
        if newest_first.is_empty() {
            self.exhausted = true;
            return;
        }

        self.cursor = newest_first.last().and_then(PageCursor::from_message);
        newest_first.reverse();
        newest_first.append(&mut self.messages);
        self.messages = newest_first;
    }

    /// 保持中のメッセージ（古い順）
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 最古レコードを指すカーソル
    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// これ以上の履歴が無いか
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 会話切り替え時の全リセット
    pub fn clear(&mut self) {
        self.messages.clear();
        self.cursor = None;
        self.exhausted = false;
    }
}
