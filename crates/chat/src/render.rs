use crate::message::Message;
use crate::store::MessageStore;

/// Placeholder shown while the server has not assigned a timestamp yet
const PENDING_TIME_LABEL: &str = "Just now";

/// 描画済みメッセージ
///
/// `text` is already escaped; `time` is the human-readable creation time or
/// a placeholder for pending records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub time: String,
}

impl RenderedMessage {
    /// Markup fragment for one message line
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"message\"><div class=\"message-text\">{}</div><div class=\"message-time\">{}</div></div>",
            self.text, self.time
        )
    }
}

/// マークアップ上意味を持つ文字をエスケープする
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_message(message: &Message) -> RenderedMessage {
    let time = message
        .created_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| PENDING_TIME_LABEL.to_string());

    RenderedMessage {
        text: escape_html(&message.text),
        time,
    }
}

/// ストアの内容を描画する（純関数）
pub fn render(store: &MessageStore) -> Vec<RenderedMessage> {
    store.messages().iter().map(render_message).collect()
}

/// スクロール位置の保持
///
/// Captures the view's offset and content height before a prepend; the
/// offset afterwards is the old offset plus the height the new content
/// introduced, so the reader's visual anchor does not move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnchor {
    pub offset: f64,
    pub content_height: f64,
}

impl ScrollAnchor {
    pub fn capture(offset: f64, content_height: f64) -> Self {
        Self {
            offset,
            content_height,
        }
    }

    /// 追加後のスクロールオフセットを計算
    pub fn offset_after_prepend(&self, new_content_height: f64) -> f64 {
        self.offset + (new_content_height - self.content_height)
    }
}
