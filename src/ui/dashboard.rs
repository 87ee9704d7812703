use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::event::{ApiStatus, WsConnectionStatus};

pub struct StatusBar<'a> {
    pub symbol: &'a str,
    pub ws_status: &'a WsConnectionStatus,
    pub api_status: ApiStatus,
    pub records_received: u64,
    pub buffered: usize,
    pub capacity: usize,
    pub decode_errors: u64,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_status = match self.ws_status {
            WsConnectionStatus::Connected => {
                Span::styled("CONNECTED", Style::default().fg(Color::Green))
            }
            WsConnectionStatus::Connecting => {
                Span::styled("CONNECTING", Style::default().fg(Color::Yellow))
            }
            WsConnectionStatus::Disconnected | WsConnectionStatus::Failed(_) => {
                Span::styled("DISCONNECTED", Style::default().fg(Color::Red))
            }
        };

        let api = match self.api_status {
            ApiStatus::Ok => Span::styled("API ok", Style::default().fg(Color::Green)),
            ApiStatus::Down => Span::styled("API down", Style::default().fg(Color::Red)),
            ApiStatus::Unknown => Span::styled("API ?", Style::default().fg(Color::DarkGray)),
        };

        let mut spans = vec![
            Span::styled(
                " sentiment-dash ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.symbol,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            conn_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            api,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "recv: {}  buf: {}/{}",
                    self.records_received, self.buffered, self.capacity
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if self.decode_errors > 0 {
            spans.push(Span::styled(
                format!("  bad msgs: {}", self.decode_errors),
                Style::default().fg(Color::Yellow),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let visible = block.inner(area).height as usize;

        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[T]", Style::default().fg(Color::Yellow)),
            Span::styled("icker  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[<-/->]", Style::default().fg(Color::Yellow)),
            Span::styled(" cycle  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("econnect  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
