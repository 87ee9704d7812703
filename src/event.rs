use crate::model::record::StreamRecord;

/// Identifies one connection. Bumped every time the coordinator opens a new one, so events
/// from a torn-down connection can be told apart from the live one.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsConnectionStatus {
    Connecting,
    Connected,
    /// The server closed the stream or it ended on its own.
    Disconnected,
    /// Connect or read failure.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Unknown,
    Ok,
    Down,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Record {
        generation: Generation,
        record: StreamRecord,
    },
    WsStatus {
        generation: Generation,
        status: WsConnectionStatus,
    },
    DecodeFailed {
        generation: Generation,
        error: String,
    },
    ApiHealth(ApiStatus),
    LogMessage(String),
    Error(String),
}
