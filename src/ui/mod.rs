pub mod chart;
pub mod dashboard;
pub mod selector;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::event::{ApiStatus, AppEvent, Generation, WsConnectionStatus};
use crate::model::buffer::RecordBuffer;
use crate::model::record::StreamRecord;
use crate::model::symbol::Symbol;

use chart::{price_series, sentiment_series, PriceChart, SentimentChart};
use dashboard::{KeybindBar, LogPanel, StatusBar};
use selector::{SelectorPopup, SymbolSelector};

const MAX_LOG_MESSAGES: usize = 200;

pub struct AppState {
    pub symbol: Symbol,
    pub selector: SymbolSelector,
    pub buffer: RecordBuffer,
    /// Generation of the connection whose events are accepted.
    pub generation: Generation,
    pub ws_status: WsConnectionStatus,
    pub api_status: ApiStatus,
    pub records_received: u64,
    pub decode_errors: u64,
    /// Events that arrived from a torn-down connection and were ignored.
    pub stale_events: u64,
    /// Records tagged with another symbol.
    pub foreign_records: u64,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(symbols: Vec<Symbol>, symbol: &Symbol, buffer_len: usize) -> Self {
        Self {
            symbol: symbol.clone(),
            selector: SymbolSelector::new(symbols, symbol),
            buffer: RecordBuffer::new(buffer_len),
            generation: 0,
            ws_status: WsConnectionStatus::Disconnected,
            api_status: ApiStatus::Unknown,
            records_received: 0,
            decode_errors: 0,
            stale_events: 0,
            foreign_records: 0,
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    /// Point the dashboard at a freshly opened connection. Data from the previous symbol is
    /// discarded so both charts only ever show one ticker.
    pub fn begin_session(&mut self, symbol: &Symbol, generation: Generation) {
        self.symbol = symbol.clone();
        self.selector.set_selected(symbol);
        self.generation = generation;
        self.buffer.clear();
        self.ws_status = WsConnectionStatus::Connecting;
        self.records_received = 0;
        self.decode_errors = 0;
        self.push_log(format!("Streaming {} (session {})", symbol, generation));
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub fn last_price(&self) -> Option<f64> {
        self.buffer.iter().rev().find_map(|r| r.price)
    }

    fn ingest(&mut self, record: StreamRecord) {
        if let Some(tagged) = record.symbol.as_deref() {
            if !self.symbol.matches(tagged) {
                self.foreign_records += 1;
                tracing::debug!(expected = %self.symbol, got = tagged, "Ignoring record for another symbol");
                return;
            }
        }
        self.records_received += 1;
        self.buffer.push(record);
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Record { generation, record } => {
                if !self.is_current(generation) {
                    self.stale_events += 1;
                    return;
                }
                self.ingest(record);
            }
            AppEvent::WsStatus { generation, status } => {
                if !self.is_current(generation) {
                    self.stale_events += 1;
                    return;
                }
                match &status {
                    WsConnectionStatus::Connecting => {}
                    WsConnectionStatus::Connected => {
                        self.push_log(format!("Stream connected ({})", self.symbol));
                    }
                    WsConnectionStatus::Disconnected => {
                        self.push_log(format!(
                            "[WARN] Stream disconnected ({}), press R to reconnect",
                            self.symbol
                        ));
                    }
                    WsConnectionStatus::Failed(reason) => {
                        self.push_log(format!("[ERR] Stream failed ({}): {}", self.symbol, reason));
                    }
                }
                self.ws_status = status;
            }
            AppEvent::DecodeFailed { generation, error } => {
                if !self.is_current(generation) {
                    self.stale_events += 1;
                    return;
                }
                self.decode_errors += 1;
                self.push_log(format!("[WARN] Dropped malformed message: {}", error));
            }
            AppEvent::ApiHealth(status) => {
                if status == ApiStatus::Down {
                    self.push_log("[WARN] Backend health check failed".to_string());
                }
                self.api_status = status;
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // status bar
            Constraint::Percentage(50), // price chart
            Constraint::Percentage(50), // sentiment chart
            Constraint::Length(6),      // system log
            Constraint::Length(1),      // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            symbol: state.symbol.as_str(),
            ws_status: &state.ws_status,
            api_status: state.api_status,
            records_received: state.records_received,
            buffered: state.buffer.len(),
            capacity: state.buffer.capacity(),
            decode_errors: state.decode_errors,
        },
        outer[0],
    );

    // Both charts derive from the same buffer.
    let prices = price_series(state.buffer.iter());
    let sentiment = sentiment_series(state.buffer.iter());
    frame.render_widget(PriceChart::new(&prices, state.symbol.as_str()), outer[1]);
    frame.render_widget(SentimentChart::new(&sentiment), outer[2]);

    frame.render_widget(LogPanel::new(&state.log_messages), outer[3]);
    frame.render_widget(KeybindBar, outer[4]);

    if state.selector.is_open() {
        frame.render_widget(SelectorPopup::new(&state.selector), frame.area());
    }
}
