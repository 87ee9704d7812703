use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::model::symbol::Symbol;

/// Ticker picker over a fixed list.
///
/// The dashboard owns the active symbol; the selector only tracks which entry is highlighted
/// and hands back a new symbol when the user actually changes it.
#[derive(Debug, Clone)]
pub struct SymbolSelector {
    items: Vec<Symbol>,
    selected: usize,
    cursor: usize,
    open: bool,
}

impl SymbolSelector {
    /// `current` is added at the front when it is not one of `items`.
    pub fn new(items: Vec<Symbol>, current: &Symbol) -> Self {
        let mut items = items;
        let selected = match items.iter().position(|s| s == current) {
            Some(i) => i,
            None => {
                items.insert(0, current.clone());
                0
            }
        };
        Self {
            items,
            selected,
            cursor: selected,
            open: false,
        }
    }

    pub fn items(&self) -> &[Symbol] {
        &self.items
    }

    pub fn selected(&self) -> &Symbol {
        &self.items[self.selected]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.cursor = self.selected;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.cursor = (self.cursor + 1).min(self.items.len().saturating_sub(1));
    }

    /// Close the popup and return the highlighted symbol if it differs from the active one.
    pub fn confirm(&mut self) -> Option<Symbol> {
        self.open = false;
        self.select_index(self.cursor)
    }

    pub fn cycle_next(&mut self) -> Option<Symbol> {
        self.select_index((self.selected + 1) % self.items.len())
    }

    pub fn cycle_prev(&mut self) -> Option<Symbol> {
        let n = self.items.len();
        self.select_index((self.selected + n - 1) % n)
    }

    /// Sync the highlight with a symbol chosen elsewhere. Unknown symbols are ignored.
    pub fn set_selected(&mut self, symbol: &Symbol) {
        if let Some(i) = self.items.iter().position(|s| s == symbol) {
            self.selected = i;
            self.cursor = i;
        }
    }

    fn select_index(&mut self, index: usize) -> Option<Symbol> {
        if index == self.selected || index >= self.items.len() {
            return None;
        }
        self.selected = index;
        self.cursor = index;
        Some(self.items[index].clone())
    }
}

pub struct SelectorPopup<'a> {
    selector: &'a SymbolSelector,
}

impl<'a> SelectorPopup<'a> {
    pub fn new(selector: &'a SymbolSelector) -> Self {
        Self { selector }
    }
}

impl Widget for SelectorPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (self.selector.items.len() as u16).saturating_add(2);
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(24)])
            .flex(Flex::Center)
            .areas(row);

        let lines: Vec<Line> = self
            .selector
            .items
            .iter()
            .enumerate()
            .map(|(i, sym)| {
                let marker = if i == self.selector.selected { "*" } else { " " };
                let text = format!(" {} {}", marker, sym);
                if i == self.selector.cursor {
                    Line::from(Span::styled(
                        text,
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(text, Style::default().fg(Color::White)))
                }
            })
            .collect();

        let block = Block::default()
            .title(" Ticker ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        Clear.render(popup, buf);
        Paragraph::new(lines).block(block).render(popup, buf);
    }
}
