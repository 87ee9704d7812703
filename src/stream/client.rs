use anyhow::{anyhow, Result};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite;
use url::Url;

use crate::event::{AppEvent, Generation, WsConnectionStatus};
use crate::model::record::StreamRecord;

pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(10);
pub const DEFAULT_KEEPALIVE_PAYLOAD: &str = "ping";
const MIN_KEEPALIVE: Duration = Duration::from_millis(1);

/// One streaming connection to the backend for a single symbol.
///
/// There is no reconnect loop: once the socket drops, `connect_and_run` reports the status
/// and returns. Re-opening is up to the caller.
#[derive(Debug, Clone)]
pub struct StreamClient {
    url: Url,
    keepalive: Duration,
    keepalive_payload: String,
}

impl StreamClient {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            keepalive: DEFAULT_KEEPALIVE,
            keepalive_payload: DEFAULT_KEEPALIVE_PAYLOAD.to_string(),
        }
    }

    /// Keep-alive period, floored at 1ms since the timer cannot tick at zero.
    pub fn keepalive(mut self, every: Duration) -> Self {
        self.keepalive = every.max(MIN_KEEPALIVE);
        self
    }

    pub fn keepalive_interval(&self) -> Duration {
        self.keepalive
    }

    pub fn keepalive_payload(mut self, payload: &str) -> Self {
        self.keepalive_payload = payload.to_string();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Connect once and forward decoded records into `event_tx` until the stream ends or
    /// `shutdown` fires. A clean shutdown or server close returns `Ok`.
    pub async fn connect_and_run(
        &self,
        generation: Generation,
        event_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let ws_status = |status: WsConnectionStatus| AppEvent::WsStatus { generation, status };

        let _ = event_tx.send(ws_status(WsConnectionStatus::Connecting)).await;
        tracing::info!(url = %self.url, generation, "Connecting stream");

        let connected = tokio::select! {
            res = tokio_tungstenite::connect_async(self.url.as_str()) => res,
            _ = shutdown.changed() => return Ok(()),
        };
        let (ws_stream, _resp) = match connected {
            Ok(pair) => pair,
            Err(e) => {
                let _ = event_tx
                    .send(ws_status(WsConnectionStatus::Failed(e.to_string())))
                    .await;
                return Err(anyhow!("WebSocket connect failed: {}", e));
            }
        };

        let _ = event_tx.send(ws_status(WsConnectionStatus::Connected)).await;
        tracing::info!(url = %self.url, generation, "Stream connected");

        let (mut write, mut read) = ws_stream.split();
        let mut keepalive = tokio::time::interval_at(Instant::now() + self.keepalive, self.keepalive);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            match StreamRecord::decode(&text) {
                                Ok(record) => {
                                    if event_tx.send(AppEvent::Record { generation, record }).await.is_err() {
                                        // Consumer is gone; nothing left to feed.
                                        return Ok(());
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(generation, error = %e, "Dropping undecodable stream message");
                                    let _ = event_tx
                                        .send(AppEvent::DecodeFailed { generation, error: e.to_string() })
                                        .await;
                                }
                            }
                        }
                        Some(Ok(tungstenite::Message::Close(frame))) => {
                            tracing::info!(generation, ?frame, "Stream closed by server");
                            let _ = event_tx.send(ws_status(WsConnectionStatus::Disconnected)).await;
                            return Ok(());
                        }
                        Some(Ok(_)) => {
                            // Ping/pong frames are answered by tungstenite.
                        }
                        Some(Err(e)) => {
                            let _ = event_tx
                                .send(ws_status(WsConnectionStatus::Failed(e.to_string())))
                                .await;
                            return Err(anyhow!("WebSocket read error: {}", e));
                        }
                        None => {
                            let _ = event_tx.send(ws_status(WsConnectionStatus::Disconnected)).await;
                            return Err(anyhow!("WebSocket stream ended"));
                        }
                    }
                }
                _ = keepalive.tick() => {
                    let payload = tungstenite::Message::Text(self.keepalive_payload.clone().into());
                    if let Err(e) = write.send(payload).await {
                        tracing::debug!(generation, error = %e, "Keep-alive send failed");
                    }
                }
                _ = shutdown.changed() => {
                    let _ = write.close().await;
                    tracing::info!(generation, "Stream shut down");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StreamClient {
        StreamClient::new(Url::parse("ws://localhost:8000/ws/stream?symbol=AAPL").unwrap())
    }

    #[test]
    fn defaults_to_ten_second_ping() {
        let c = client();
        assert_eq!(c.keepalive_interval(), Duration::from_secs(10));
        assert_eq!(c.keepalive_payload, "ping");
    }

    #[test]
    fn zero_keepalive_is_floored() {
        let c = client().keepalive(Duration::ZERO);
        assert_eq!(c.keepalive_interval(), MIN_KEEPALIVE);
    }
}
