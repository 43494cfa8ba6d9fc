use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use crate::error::ChatError;
use crate::message::{ErrorPayload, PageEvent, PagePayload, StreamEvent, StreamFrame};

const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30000);

/// ライブ購読クライアント
///
/// Owns at most one live subscription at a time: establishing a new one
/// tears down the previous one first, so two listeners never feed the same
/// view concurrently.
pub struct StreamSubscriber {
    url: String,
    key: String,
    next_ref: AtomicU32,
    active: Option<SubscriptionHandle>,
}

impl StreamSubscriber {
    /// 新しいクライアントを作成
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            next_ref: AtomicU32::new(1),
            active: None,
        }
    }

    /// 会話へのライブ購読を開始
    ///
    /// Returns the receiver of page events. The previous subscription, if
    /// any, is cancelled before the new one is established.
    pub async fn subscribe(
        &mut self,
        conversation_id: &str,
        limit: u32,
    ) -> Result<mpsc::Receiver<PageEvent>, ChatError> {
        if let Some(previous) = self.active.take() {
            debug!("Tearing down previous subscription before resubscribing");
            previous.cancel().await;
        }

        let ws_url = self.websocket_url()?;
        info!("Connecting to conversation stream: {}", ws_url);

        let (ws_stream, _response) = connect_async(ws_url.as_str()).await.map_err(|e| {
            error!("WebSocket connection failed: {}", e);
            ChatError::SubscriptionError(format!("WebSocket connection failed: {}", e))
        })?;

        let (mut write, mut read) = ws_stream.split();

        let (socket_tx, mut socket_rx) = mpsc::channel::<WsMessage>(16);

        // --- Writer task ---
        let writer: JoinHandle<()> = tokio::spawn(async move {
            debug!("Writer task started");
            while let Some(message) = socket_rx.recv().await {
                trace!("Writer task sending frame: {:?}", message);
                if let Err(e) = write.send(message).await {
                    error!("Writer task: WebSocket send error: {}", e);
                    socket_rx.close();
                    break;
                }
            }
            debug!("Writer task finished");
        });

        let topic = format!("conversation:{}", conversation_id);
        let subscribe_frame = json!({
            "topic": topic,
            "event": StreamEvent::Subscribe,
            "payload": { "limit": limit },
            "ref": self.next_ref(),
        });
        socket_tx
            .send(WsMessage::Text(subscribe_frame.to_string()))
            .await
            .map_err(|e| ChatError::SubscriptionError(format!("Failed to send subscribe: {}", e)))?;

        let (page_tx, page_rx) = mpsc::channel::<PageEvent>(32);

        // --- Reader task (also drives the heartbeat) ---
        let reader_topic = topic.clone();
        let heartbeat_tx = socket_tx.clone();
        let reader: JoinHandle<()> = tokio::spawn(async move {
            debug!("Reader task started for {}", reader_topic);
            loop {
                tokio::select! {
                    biased; // Prioritize incoming frames over the heartbeat

                    msg_result = read.next() => {
                        match msg_result {
                            Some(Ok(WsMessage::Text(text))) => {
                                match serde_json::from_str::<StreamFrame>(&text) {
                                    Ok(frame) if frame.topic == reader_topic => {
                                        trace!(
                                            "Frame for {}: event={:?} ref={:?}",
                                            frame.topic, frame.event, frame.frame_ref
                                        );
                                        if !dispatch_frame(frame, &page_tx).await {
                                            break;
                                        }
                                    }
                                    Ok(frame) => {
                                        warn!("Frame for unexpected topic: {}", frame.topic);
                                    }
                                    Err(e) => {
                                        error!("Failed to parse stream frame: {}. Raw: {}", e, text);
                                    }
                                }
                            }
                            Some(Ok(msg)) if msg.is_close() => {
                                debug!("Received Close frame");
                                let _ = page_tx.send(PageEvent::Closed).await;
                                break;
                            }
                            Some(Ok(msg)) => {
                                trace!("Ignoring non-text frame: {:?}", msg);
                            }
                            Some(Err(e)) => {
                                error!("WebSocket read error: {}", e);
                                let _ = page_tx
                                    .send(PageEvent::Error(format!("Stream read error: {}", e)))
                                    .await;
                                break;
                            }
                            None => {
                                debug!("Stream closed by remote");
                                let _ = page_tx.send(PageEvent::Closed).await;
                                break;
                            }
                        }
                    }

                    _ = sleep(HEARTBEAT_INTERVAL) => {
                        trace!("Sending heartbeat");
                        let heartbeat = json!({
                            "topic": reader_topic,
                            "event": StreamEvent::Heartbeat,
                            "payload": {},
                            "ref": serde_json::Value::Null,
                        });
                        if heartbeat_tx.send(WsMessage::Text(heartbeat.to_string())).await.is_err() {
                            error!("Heartbeat send failed, assuming connection lost");
                            let _ = page_tx.send(PageEvent::Closed).await;
                            break;
                        }
                    }
                }
            }
            debug!("Reader task finished for {}", reader_topic);
        });

        self.active = Some(SubscriptionHandle {
            topic,
            socket: socket_tx,
            reader,
            writer,
            cancelled: false,
        });

        Ok(page_rx)
    }

    /// 現在の購読を解除
    pub async fn unsubscribe(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel().await;
        }
    }

    /// ライブ購読が存在するか
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// 購読中のトピック
    pub fn active_topic(&self) -> Option<&str> {
        self.active.as_ref().map(|h| h.topic.as_str())
    }

    fn next_ref(&self) -> String {
        self.next_ref.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn websocket_url(&self) -> Result<Url, ChatError> {
        let base = Url::parse(&self.url)?;
        // Allow ws/wss schemes directly, map http/https
        let scheme = match base.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            s => {
                return Err(ChatError::SubscriptionError(format!(
                    "Unsupported URL scheme: {}",
                    s
                )))
            }
        };

        let mut ws_url = base.join("/chat/v1/stream")?;
        ws_url
            .set_scheme(scheme)
            .map_err(|_| ChatError::SubscriptionError("Failed to set URL scheme".to_string()))?;
        ws_url.set_query(Some(&format!("apikey={}", self.key)));
        Ok(ws_url)
    }
}

/// 購読のキャンセルハンドル
///
/// Sends an unsubscribe frame and stops the reader/writer tasks. Dropping
/// the handle performs a best-effort cancellation.
pub struct SubscriptionHandle {
    topic: String,
    socket: mpsc::Sender<WsMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    cancelled: bool,
}

impl SubscriptionHandle {
    /// 購読を明示的に解除する
    pub async fn cancel(mut self) {
        info!("Unsubscribing from {}", self.topic);
        let _ = self.socket.send(unsubscribe_frame(&self.topic)).await;
        self.reader.abort();
        self.cancelled = true;
        // Dropping the sender lets the writer flush the unsubscribe and exit
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if !self.cancelled {
            let _ = self.socket.try_send(unsubscribe_frame(&self.topic));
            self.reader.abort();
            self.writer.abort();
        }
    }
}

fn unsubscribe_frame(topic: &str) -> WsMessage {
    let frame = json!({
        "topic": topic,
        "event": StreamEvent::Unsubscribe,
        "payload": {},
        "ref": serde_json::Value::Null,
    });
    WsMessage::Text(frame.to_string())
}

/// 受信フレームをページイベントへ変換して配送する
///
/// Returns false when the receiver side is gone and the reader should stop.
async fn dispatch_frame(frame: StreamFrame, page_tx: &mpsc::Sender<PageEvent>) -> bool {
    match frame.event {
        StreamEvent::Page => match serde_json::from_value::<PagePayload>(frame.payload) {
            Ok(payload) => {
                debug!("Received page with {} messages", payload.documents.len());
                page_tx.send(PageEvent::Page(payload.documents)).await.is_ok()
            }
            Err(e) => {
                error!("Failed to parse page payload: {}", e);
                page_tx
                    .send(PageEvent::Error(format!("Malformed page: {}", e)))
                    .await
                    .is_ok()
            }
        },
        StreamEvent::Error => {
            let message = serde_json::from_value::<ErrorPayload>(frame.payload)
                .map(|p| p.message)
                .unwrap_or_else(|_| "unknown stream error".to_string());
            warn!("Stream error event: {}", message);
            page_tx
                .send(PageEvent::Error(format!("Error loading messages: {}", message)))
                .await
                .is_ok()
        }
        other => {
            trace!("Ignoring stream event: {:?}", other);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_maps_schemes() {
        let sub = StreamSubscriber::new("https://example.firechat.app", "anon");
        let url = sub.websocket_url().unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/chat/v1/stream");
        assert_eq!(url.query(), Some("apikey=anon"));

        let sub = StreamSubscriber::new("http://localhost:4000", "anon");
        assert_eq!(sub.websocket_url().unwrap().scheme(), "ws");
    }

    #[test]
    fn websocket_url_rejects_unknown_scheme() {
        let sub = StreamSubscriber::new("ftp://example.com", "anon");
        assert!(sub.websocket_url().is_err());
    }
}
