use canopy_core::Key;
use crossterm::event::{Event, KeyEventKind};

/// The key a terminal event stands for. Releases, repeats and non-key events
/// are dropped.
pub fn key_from_event(event: &Event) -> Option<Key> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Key::from(*key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key_event(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_press_is_translated() {
        assert_eq!(
            key_from_event(&key_event(KeyCode::Enter, KeyEventKind::Press)),
            Some(Key::Enter)
        );
        assert_eq!(
            key_from_event(&key_event(KeyCode::Char('j'), KeyEventKind::Press)),
            Some(Key::Char('j'))
        );
    }

    #[test]
    fn test_release_and_resize_are_ignored() {
        assert_eq!(
            key_from_event(&key_event(KeyCode::Enter, KeyEventKind::Release)),
            None
        );
        assert_eq!(key_from_event(&Event::Resize(80, 24)), None);
    }
}
