//! Reusable modal behaviors.
//!
//! Two engines cover every modal in the dashboard: a search-filtered picker
//! ([`search`]) and a plain list selection ([`list`]). Both are pure state
//! transitions over a caller-supplied state type `S`; whatever the modal does on
//! confirm is injected through a configuration bundle of function values.

pub mod list;
pub mod search;

pub use list::{ListCursor, ListModalConfig, handle_list_modal_key};
pub use search::{SearchFocus, SearchModalConfig, SearchPicker, handle_search_modal_key};

/// What a modal engine did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    /// State changed but the modal is still open
    Updated,
    /// Confirm callback ran
    Confirmed,
    /// Custom-key callback ran
    CustomKey,
    /// Closed without confirming
    Cancelled,
    Ignored,
}
