use super::ModalOutcome;
use crate::keyboard::Key;

/// Saturating cursor over a fixed-length list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListCursor {
    pub index: usize,
    pub len: usize,
}

impl ListCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn increment(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    pub fn decrement(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

/// Wiring between the list engine and a concrete state type.
///
/// The increment/decrement mutators own the saturation rule; the engine never
/// re-clamps.
pub struct ListModalConfig<'a, S> {
    pub current_index: fn(&S) -> usize,
    pub item_count: fn(&S) -> usize,
    pub increment: fn(&mut S),
    pub decrement: fn(&mut S),
    pub close: fn(&mut S),
    /// Runs before `close`, while the payload is still available
    pub on_confirm: Box<dyn FnMut(&mut S) + 'a>,
    pub custom_keys: &'a [char],
    pub on_custom_key: Option<Box<dyn FnMut(&mut S, char) + 'a>>,
}

pub fn handle_list_modal_key<S>(
    state: &mut S,
    key: Key,
    config: &mut ListModalConfig<'_, S>,
) -> ModalOutcome {
    match key {
        Key::Esc => {
            (config.close)(state);
            ModalOutcome::Cancelled
        }
        Key::Up => {
            (config.decrement)(state);
            ModalOutcome::Updated
        }
        Key::Down => {
            (config.increment)(state);
            ModalOutcome::Updated
        }
        Key::Enter => {
            if (config.item_count)(state) == 0 {
                return ModalOutcome::Ignored;
            }
            debug_assert!((config.current_index)(state) < (config.item_count)(state));
            (config.on_confirm)(state);
            (config.close)(state);
            ModalOutcome::Confirmed
        }
        Key::Char(c) if config.custom_keys.contains(&c) => match config.on_custom_key.as_mut() {
            Some(callback) => {
                callback(state, c);
                ModalOutcome::CustomKey
            }
            None => ModalOutcome::Ignored,
        },
        _ => ModalOutcome::Ignored,
    }
}
