use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use super::*;

#[derive(Debug, Deserialize)]
struct WsFrame {
    #[serde(rename = "type")]
    frame_type: String,
    topic: Option<String>,
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct SubscribeFrame<'a> {
    #[serde(rename = "type")]
    frame_type: &'a str,
    topic: &'a str,
}

impl FeedClient {
    pub(super) async fn connect_once(
        config: &FeedConfig,
        event_tx: &mpsc::Sender<FeedEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<(), FeedError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(url = %config.url, "Connecting to event feed");
        let (mut ws, _) = connect_async(config.url.as_str()).await?;

        for topic in &config.topics {
            let frame = SubscribeFrame {
                frame_type: "subscribe",
                topic,
            };
            ws.send(Msg::Text(serde_json::to_string(&frame)?.into()))
                .await?;
            tracing::info!(topic, "Subscribed to feed topic");
        }

        let timeout = KEEPALIVE_TIMEOUT * 2;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Feed shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(timeout, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(text)))) => {
                            if let Some(event) = Self::parse_frame(&text)? {
                                tracing::debug!(topic = %event.topic, "Feed event received");
                                let _ = event_tx.send(event).await;
                            }
                        }
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("Feed WebSocket closed by server");
                            return Err(FeedError::Closed);
                        }
                        Ok(Some(Err(e))) => return Err(FeedError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("Feed keepalive timeout");
                            return Err(FeedError::Timeout);
                        }
                    }
                }
            }
        }
    }

    /// Parse one text frame. Keepalives and unknown frame types yield
    /// `None`; event frames must carry a topic and payload.
    pub(super) fn parse_frame(text: &str) -> Result<Option<FeedEvent>, FeedError> {
        let frame: WsFrame = serde_json::from_str(text)?;
        match frame.frame_type.as_str() {
            "event" => {
                let topic = frame
                    .topic
                    .ok_or_else(|| FeedError::Protocol("event frame missing topic".into()))?;
                let payload = frame
                    .payload
                    .ok_or_else(|| FeedError::Protocol("event frame missing payload".into()))?;
                Ok(Some(FeedEvent { topic, payload }))
            }
            "keepalive" => {
                tracing::trace!("Feed keepalive received");
                Ok(None)
            }
            other => {
                tracing::debug!(frame_type = other, "Unhandled feed frame");
                Ok(None)
            }
        }
    }
}
