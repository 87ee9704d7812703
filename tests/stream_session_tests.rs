use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use sentiment_dash::event::{AppEvent, WsConnectionStatus};
use sentiment_dash::model::symbol::{default_symbols, Symbol};
use sentiment_dash::stream::{StreamSession, StreamSettings};
use sentiment_dash::ui::AppState;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, PartialEq)]
enum ServerNote {
    Opened(String),
    KeepAlive(String, String),
    Closed(String),
}

/// Local backend stand-in: for every connection it records the `symbol` query, sends one
/// malformed frame, then streams a record every 20ms until the client goes away. Prices are
/// `connection * 1000 + seq` (connections count from 1). With `tag_records` off the records
/// carry no `symbol` field.
async fn spawn_backend(tag_records: bool) -> (String, mpsc::UnboundedReceiver<ServerNote>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (note_tx, note_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut connections = 0u64;
        while let Ok((tcp, _)) = listener.accept().await {
            connections += 1;
            let connection = connections;
            let note_tx = note_tx.clone();
            tokio::spawn(async move {
                let mut query = String::new();
                let capture = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    query = req.uri().query().unwrap_or_default().to_string();
                    Ok(resp)
                };
                let Ok(ws) = tokio_tungstenite::accept_hdr_async(tcp, capture).await else {
                    return;
                };
                let symbol = query.trim_start_matches("symbol=").to_string();
                let _ = note_tx.send(ServerNote::Opened(symbol.clone()));

                let (mut write, mut read) = ws.split();
                let _ = write.send(Message::Text("{not json".into())).await;
                let mut tick = tokio::time::interval(Duration::from_millis(20));
                let mut seq = 0u64;
                loop {
                    tokio::select! {
                        _ = tick.tick() => {
                            seq += 1;
                            let price = connection * 1000 + seq;
                            let body = if tag_records {
                                format!(
                                    r#"{{"symbol":"{}","timestamp":"2024-05-01T14:30:05","price":{}.0}}"#,
                                    symbol, price
                                )
                            } else {
                                format!(r#"{{"timestamp":"2024-05-01T14:30:05","price":{}.0}}"#, price)
                            };
                            if write.send(Message::Text(body.into())).await.is_err() {
                                break;
                            }
                        }
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                let _ = note_tx.send(ServerNote::KeepAlive(symbol.clone(), text.to_string()));
                            }
                            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                            Some(Ok(_)) => {}
                        }
                    }
                }
                let _ = note_tx.send(ServerNote::Closed(symbol));
            });
        }
    });

    (format!("http://{}", addr), note_rx)
}

async fn next_note(rx: &mut mpsc::UnboundedReceiver<ServerNote>) -> ServerNote {
    timeout(WAIT, rx.recv()).await.expect("server note").expect("server alive")
}

async fn next_event(rx: &mut mpsc::Receiver<AppEvent>) -> AppEvent {
    timeout(WAIT, rx.recv()).await.expect("app event").expect("channel open")
}

fn settings(base_url: &str) -> StreamSettings {
    let mut s = StreamSettings::new(base_url);
    s.keepalive = Duration::from_millis(50);
    s
}

#[tokio::test]
/// A single connection: status events, a dropped malformed frame, decoded records, and the
/// literal keep-alive payload on the wire.
async fn forwards_records_and_sends_keepalive() {
    let (base, mut notes) = spawn_backend(true).await;
    let (tx, mut rx) = mpsc::channel(256);
    let mut session = StreamSession::new(settings(&base), tx);

    let generation = session.open(&Symbol::new("aapl")).unwrap();
    assert_eq!(generation, 1);
    assert_eq!(session.active_symbol(), Some(&Symbol::new("AAPL")));
    assert_eq!(next_note(&mut notes).await, ServerNote::Opened("AAPL".to_string()));

    let mut saw_connected = false;
    let mut saw_decode_failure = false;
    let mut records = 0;
    while records < 3 {
        match next_event(&mut rx).await {
            AppEvent::WsStatus { generation: 1, status: WsConnectionStatus::Connected } => {
                saw_connected = true;
            }
            AppEvent::DecodeFailed { generation: 1, .. } => saw_decode_failure = true,
            AppEvent::Record { generation: 1, record } => {
                assert_eq!(record.symbol.as_deref(), Some("AAPL"));
                assert!(record.price.is_some());
                records += 1;
            }
            _ => {}
        }
    }
    assert!(saw_connected);
    assert!(saw_decode_failure, "malformed frame should be reported, not fatal");
    assert!(session.is_running());

    loop {
        if let ServerNote::KeepAlive(sym, payload) = next_note(&mut notes).await {
            assert_eq!(sym, "AAPL");
            assert_eq!(payload, "ping");
            break;
        }
    }

    session.close();
    loop {
        if next_note(&mut notes).await == ServerNote::Closed("AAPL".to_string()) {
            break;
        }
    }
}

#[tokio::test]
/// Switching symbols closes the old connection. The records carry no symbol, so only the
/// generation check keeps frames the old connection had already queued out of the buffer.
async fn switching_symbol_replaces_connection() {
    let (base, mut notes) = spawn_backend(false).await;
    let (tx, mut rx) = mpsc::channel(256);
    let mut session = StreamSession::new(settings(&base), tx);
    let mut state = AppState::new(default_symbols(), &Symbol::new("AAPL"), 301);

    let g1 = session.open(&Symbol::new("AAPL")).unwrap();
    state.begin_session(&Symbol::new("AAPL"), g1);
    assert_eq!(next_note(&mut notes).await, ServerNote::Opened("AAPL".to_string()));

    while state.buffer.len() < 3 {
        state.apply(next_event(&mut rx).await);
    }
    assert!(state.buffer.iter().all(|r| r.price.unwrap() < 2000.0));

    // Let more AAPL frames pile up unread in the queue.
    tokio::time::sleep(Duration::from_millis(120)).await;

    let g2 = session.open(&Symbol::new("MSFT")).unwrap();
    assert_eq!(g2, g1 + 1);
    assert_eq!(session.generation(), g2);
    state.begin_session(&Symbol::new("MSFT"), g2);

    let mut closed_old = false;
    let mut opened_new = false;
    while !(closed_old && opened_new) {
        match next_note(&mut notes).await {
            ServerNote::Closed(sym) if sym == "AAPL" => closed_old = true,
            ServerNote::Opened(sym) if sym == "MSFT" => opened_new = true,
            _ => {}
        }
    }

    while state.buffer.len() < 5 {
        state.apply(next_event(&mut rx).await);
    }
    assert!(state.stale_events > 0, "queued frames from the old connection were applied");
    assert_eq!(state.foreign_records, 0);
    assert!(state
        .buffer
        .iter()
        .all(|r| r.symbol.is_none() && r.price.unwrap() >= 2000.0));
    assert_eq!(session.active_symbol(), Some(&Symbol::new("MSFT")));
}

#[tokio::test]
/// A zero keep-alive period must not bring the connection task down.
async fn zero_keepalive_still_streams() {
    let (base, mut notes) = spawn_backend(true).await;
    let (tx, mut rx) = mpsc::channel(256);
    let mut s = StreamSettings::new(&base);
    s.keepalive = Duration::ZERO;
    let mut session = StreamSession::new(s, tx);

    session.open(&Symbol::new("NVDA")).unwrap();
    assert_eq!(next_note(&mut notes).await, ServerNote::Opened("NVDA".to_string()));

    let mut records = 0;
    while records < 3 {
        if let AppEvent::Record { generation: 1, .. } = next_event(&mut rx).await {
            records += 1;
        }
    }
    assert!(session.is_running());
    session.close();
}

#[tokio::test]
async fn unreachable_backend_reports_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, mut rx) = mpsc::channel(16);
    let mut session = StreamSession::new(settings(&format!("http://{}", addr)), tx);
    session.open(&Symbol::new("TSLA")).unwrap();

    loop {
        if let AppEvent::WsStatus { generation: 1, status } = next_event(&mut rx).await {
            match status {
                WsConnectionStatus::Connecting => continue,
                WsConnectionStatus::Failed(_) => break,
                other => panic!("unexpected status {:?}", other),
            }
        }
    }
}

#[tokio::test]
async fn bad_base_url_keeps_current_connection() {
    let (tx, _rx) = mpsc::channel(16);
    let mut session = StreamSession::new(settings("ftp://nowhere"), tx);
    assert!(session.open(&Symbol::new("AAPL")).is_err());
    assert_eq!(session.generation(), 0);
    assert!(session.active_symbol().is_none());
}
