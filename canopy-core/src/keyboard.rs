use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Terminal-independent key, as consumed by the modal engines and the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Tab,
    BackTab,
    Enter,
    Esc,
    Backspace,
    /// Ctrl+C
    Interrupt,
    Other,
}

impl Key {
    pub fn is_printable(self) -> bool {
        matches!(self, Key::Char(c) if !c.is_control())
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Key::Interrupt,
                KeyCode::Char('p') => Key::Up,
                KeyCode::Char('n') => Key::Down,
                _ => Key::Other,
            };
        }
        match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Backspace => Key::Backspace,
            _ => Key::Other,
        }
    }
}
