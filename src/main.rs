use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use sentiment_dash::api::ApiClient;
use sentiment_dash::config::Config;
use sentiment_dash::event::{ApiStatus, AppEvent};
use sentiment_dash::input::{
    parse_main_command, parse_popup_command, pressed_key, PopupCommand, UiCommand,
};
use sentiment_dash::model::symbol::Symbol;
use sentiment_dash::stream::{StreamSession, StreamSettings};
use sentiment_dash::ui::{self, AppState};

const EVENT_QUEUE_LEN: usize = 1024;

/// Tear down the current stream, open one for `symbol`, and reset the dashboard to it.
fn switch_symbol(symbol: &Symbol, session: &mut StreamSession, app_state: &mut AppState) {
    match session.open(symbol) {
        Ok(generation) => app_state.begin_session(symbol, generation),
        Err(e) => {
            tracing::error!(%symbol, error = %e, "Failed to open stream");
            let current = app_state.symbol.clone();
            app_state.selector.set_selected(&current);
            app_state.push_log(format!("[ERR] Cannot stream {}: {}", symbol, e));
        }
    }
}

fn spawn_health_probe(api: ApiClient, app_tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let status = match api.ping().await {
            Ok(()) => ApiStatus::Ok,
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(error = %reason, "Backend health check failed");
                ApiStatus::Down
            }
        };
        let _ = app_tx.send(AppEvent::ApiHealth(status)).await;
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Check config/default.toml and the API_BASE environment variable");
            std::process::exit(1);
        }
    };

    // Log to a file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create("sentiment-dash.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        base_url = %config.server.base_url,
        stream_path = %config.server.stream_path,
        buffer_len = config.ui.buffer_len,
        "Starting sentiment-dash"
    );

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(EVENT_QUEUE_LEN);

    spawn_health_probe(ApiClient::new(&config.server.base_url)?, app_tx.clone());

    let initial_symbol = config
        .ui
        .initial_symbol()
        .context("no ticker configured")?;
    let mut app_state = AppState::new(
        config.ui.selectable_symbols(),
        &initial_symbol,
        config.ui.buffer_len,
    );
    let mut session = StreamSession::new(StreamSettings::from(&config.server), app_tx.clone());
    switch_symbol(&initial_symbol, &mut session, &mut app_state);

    let mut terminal = ratatui::init();

    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Some(code) = pressed_key(&crossterm::event::read()?) {
                let command = parse_main_command(&code);
                if command == Some(UiCommand::Quit) {
                    tracing::info!("User quit");
                    break;
                }
                if app_state.selector.is_open() {
                    match parse_popup_command(&code) {
                        Some(PopupCommand::Up) => app_state.selector.move_up(),
                        Some(PopupCommand::Down) => app_state.selector.move_down(),
                        Some(PopupCommand::Close) => app_state.selector.close(),
                        Some(PopupCommand::Confirm) => {
                            if let Some(next) = app_state.selector.confirm() {
                                switch_symbol(&next, &mut session, &mut app_state);
                            }
                        }
                        None => {}
                    }
                } else {
                    match command {
                        Some(UiCommand::OpenSymbolSelector) => app_state.selector.open(),
                        Some(UiCommand::NextSymbol) => {
                            if let Some(next) = app_state.selector.cycle_next() {
                                switch_symbol(&next, &mut session, &mut app_state);
                            }
                        }
                        Some(UiCommand::PrevSymbol) => {
                            if let Some(prev) = app_state.selector.cycle_prev() {
                                switch_symbol(&prev, &mut session, &mut app_state);
                            }
                        }
                        Some(UiCommand::Reconnect) => {
                            let current = app_state.symbol.clone();
                            switch_symbol(&current, &mut session, &mut app_state);
                        }
                        Some(UiCommand::Quit) | None => {}
                    }
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }
    }

    session.close();
    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check sentiment-dash.log for details.");
    Ok(())
}
