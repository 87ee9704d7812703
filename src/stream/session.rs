use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::endpoint;
use crate::error::AppError;
use crate::event::{AppEvent, Generation};
use crate::model::symbol::Symbol;

use super::client::{StreamClient, DEFAULT_KEEPALIVE, DEFAULT_KEEPALIVE_PAYLOAD};

/// How long a torn-down connection may take to send its close frame before it is aborted.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub base_url: String,
    pub stream_path: String,
    pub keepalive: Duration,
    pub keepalive_payload: String,
}

impl StreamSettings {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            stream_path: endpoint::DEFAULT_STREAM_PATH.to_string(),
            keepalive: DEFAULT_KEEPALIVE,
            keepalive_payload: DEFAULT_KEEPALIVE_PAYLOAD.to_string(),
        }
    }
}

impl From<&ServerConfig> for StreamSettings {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            stream_path: cfg.stream_path.clone(),
            keepalive: cfg.keepalive_interval(),
            keepalive_payload: cfg.keepalive_payload.clone(),
        }
    }
}

struct ActiveConnection {
    symbol: Symbol,
    generation: Generation,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the single live stream connection.
///
/// Opening a symbol always tears the previous connection down first, then starts the new one
/// under a fresh generation. Events from older generations are stale and must be ignored by
/// the consumer.
pub struct StreamSession {
    settings: StreamSettings,
    event_tx: mpsc::Sender<AppEvent>,
    generation: Generation,
    active: Option<ActiveConnection>,
}

impl StreamSession {
    pub fn new(settings: StreamSettings, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            settings,
            event_tx,
            generation: 0,
            active: None,
        }
    }

    /// Generation of the most recently opened connection (0 before the first open).
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn active_symbol(&self) -> Option<&Symbol> {
        self.active.as_ref().map(|a| &a.symbol)
    }

    /// True while the current connection task is still running.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.handle.is_finished())
    }

    /// Replace the current connection with one for `symbol`. Must be called from within a
    /// tokio runtime. On a bad address nothing is torn down.
    pub fn open(&mut self, symbol: &Symbol) -> Result<Generation, AppError> {
        let url = endpoint::stream_url(&self.settings.base_url, &self.settings.stream_path, symbol)?;

        self.close();
        self.generation += 1;
        let generation = self.generation;

        let client = StreamClient::new(url)
            .keepalive(self.settings.keepalive)
            .keepalive_payload(&self.settings.keepalive_payload);
        let (stop_tx, stop_rx) = watch::channel(false);
        let event_tx = self.event_tx.clone();
        let task_symbol = symbol.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = client.connect_and_run(generation, event_tx, stop_rx).await {
                tracing::warn!(symbol = %task_symbol, generation, error = %e, "Stream connection ended");
            }
        });

        tracing::info!(%symbol, generation, "Stream session opened");
        self.active = Some(ActiveConnection {
            symbol: symbol.clone(),
            generation,
            stop_tx,
            handle,
        });
        Ok(generation)
    }

    /// Tear the current connection down without replacing it.
    pub fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        tracing::info!(symbol = %active.symbol, generation = active.generation, "Stream session closing");
        let _ = active.stop_tx.send(true);
        let mut handle = active.handle;
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move {
                    if tokio::time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
                        handle.abort();
                    }
                });
            }
            Err(_) => handle.abort(),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}
