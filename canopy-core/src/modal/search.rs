use super::ModalOutcome;
use crate::keyboard::Key;
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use unicode_segmentation::UnicodeSegmentation;

/// Focus targets of a search modal, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFocus {
    #[default]
    Input,
    List,
    Confirm,
    Cancel,
}

impl SearchFocus {
    const ORDER: [SearchFocus; 4] = [
        SearchFocus::Input,
        SearchFocus::List,
        SearchFocus::Confirm,
        SearchFocus::Cancel,
    ];

    pub fn index(self) -> usize {
        match self {
            SearchFocus::Input => 0,
            SearchFocus::List => 1,
            SearchFocus::Confirm => 2,
            SearchFocus::Cancel => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Payload of a search-filtered modal.
///
/// `filtered` holds indices into `items` in ascending order, so the visible list is
/// always an order-preserving subsequence of the candidates.
#[derive(Debug, Clone)]
pub struct SearchPicker {
    pub title: String,
    items: Vec<String>,
    search: String,
    filtered: Vec<usize>,
    selected: usize,
    pub focus: SearchFocus,
    /// Shown inside the modal, e.g. when the confirm action failed
    pub error: Option<String>,
}

impl SearchPicker {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        let filtered = (0..items.len()).collect();
        Self {
            title: title.into(),
            items,
            search: String::new(),
            filtered,
            selected: 0,
            focus: SearchFocus::Input,
            error: None,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    pub fn filtered_items(&self) -> impl Iterator<Item = &str> {
        self.filtered.iter().map(|&i| self.items[i].as_str())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The highlighted candidate, resolved back to the unfiltered list.
    pub fn selected_item(&self) -> Option<&str> {
        self.filtered
            .get(self.selected)
            .map(|&i| self.items[i].as_str())
    }

    #[cfg(test)]
    fn set_selected(&mut self, index: usize) {
        self.selected = index;
        self.clamp_selection();
    }

    pub fn push_char(&mut self, c: char) {
        self.search.push(c);
        self.refilter();
    }

    /// Remove the last grapheme cluster from the search buffer.
    pub fn pop_char(&mut self) -> bool {
        let Some((idx, _)) = self.search.grapheme_indices(true).next_back() else {
            return false;
        };
        self.search.truncate(idx);
        self.refilter();
        true
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn refilter(&mut self) {
        if self.search.is_empty() {
            self.filtered = (0..self.items.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default().ignore_case();
            self.filtered = self
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| matcher.fuzzy_match(item, &self.search).is_some())
                .map(|(i, _)| i)
                .collect();
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.filtered.len().saturating_sub(1));
    }
}

/// Wiring between the search engine and a concrete state type.
pub struct SearchModalConfig<'a, S> {
    /// The open picker, or `None` if the state has no search modal open
    pub picker: fn(&mut S) -> Option<&mut SearchPicker>,
    /// Return the state to "no modal"
    pub close: fn(&mut S),
    /// Invoked with the chosen candidate after the modal has been closed, so the
    /// callback may open another modal (or reopen this one with an error).
    pub on_confirm: Box<dyn FnMut(&mut S, &str) + 'a>,
}

pub fn handle_search_modal_key<S>(
    state: &mut S,
    key: Key,
    config: &mut SearchModalConfig<'_, S>,
) -> ModalOutcome {
    if key == Key::Esc {
        (config.close)(state);
        return ModalOutcome::Cancelled;
    }

    let Some(picker) = (config.picker)(state) else {
        return ModalOutcome::Ignored;
    };

    match key {
        Key::Char(c) if key.is_printable() => {
            picker.push_char(c);
            picker.focus = SearchFocus::Input;
        }
        Key::Backspace => {
            picker.pop_char();
            picker.focus = SearchFocus::Input;
        }
        Key::Down => match picker.focus {
            SearchFocus::Input => picker.focus = SearchFocus::List,
            SearchFocus::List => picker.move_down(),
            SearchFocus::Confirm | SearchFocus::Cancel => return ModalOutcome::Ignored,
        },
        Key::Up => match picker.focus {
            SearchFocus::List if picker.selected() == 0 => picker.focus = SearchFocus::Input,
            SearchFocus::List => picker.move_up(),
            SearchFocus::Input | SearchFocus::Confirm | SearchFocus::Cancel => {
                return ModalOutcome::Ignored;
            }
        },
        Key::Tab => picker.focus = picker.focus.next(),
        Key::BackTab => picker.focus = picker.focus.prev(),
        Key::Enter => {
            if picker.focus == SearchFocus::Cancel {
                (config.close)(state);
                return ModalOutcome::Cancelled;
            }
            // Nothing highlighted: confirming is a no-op and the modal stays open
            let Some(item) = picker.selected_item().map(str::to_owned) else {
                return ModalOutcome::Ignored;
            };
            (config.close)(state);
            (config.on_confirm)(state, &item);
            return ModalOutcome::Confirmed;
        }
        _ => return ModalOutcome::Ignored,
    }

    ModalOutcome::Updated
}
