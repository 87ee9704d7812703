use crossterm::event::{Event, KeyCode, KeyEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    OpenSymbolSelector,
    NextSymbol,
    PrevSymbol,
    Reconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCommand {
    Up,
    Down,
    Confirm,
    Close,
}

/// Key code of a key press. Releases, repeats, and non-key events yield `None`.
pub fn pressed_key(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key.code),
        _ => None,
    }
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Right => Some(UiCommand::NextSymbol),
        KeyCode::Left => Some(UiCommand::PrevSymbol),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            't' => Some(UiCommand::OpenSymbolSelector),
            'l' => Some(UiCommand::NextSymbol),
            'h' => Some(UiCommand::PrevSymbol),
            'r' => Some(UiCommand::Reconnect),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_popup_command(key_code: &KeyCode) -> Option<PopupCommand> {
    match key_code {
        KeyCode::Up => Some(PopupCommand::Up),
        KeyCode::Down => Some(PopupCommand::Down),
        KeyCode::Enter => Some(PopupCommand::Confirm),
        KeyCode::Esc => Some(PopupCommand::Close),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'k' => Some(PopupCommand::Up),
            'j' => Some(PopupCommand::Down),
            't' => Some(PopupCommand::Close),
            _ => None,
        },
        _ => None,
    }
}
