use super::input::{self, InputStyle};
use crate::theme::Theme;
use canopy_core::modal::{SearchFocus, SearchPicker};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub fn draw(f: &mut Frame, picker: &SearchPicker, confirm_label: &str, theme: &Theme) {
    let area = super::centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let error_height = u16::from(picker.error.is_some());
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(error_height),
        Constraint::Length(1),
    ])
    .split(area);

    input::draw(
        f,
        chunks[0],
        &InputStyle {
            title: &picker.title,
            placeholder: "Type to filter branches...",
            border_color: if picker.focus == SearchFocus::Input {
                theme.accent
            } else {
                theme.border
            },
            muted_color: theme.muted,
        },
        picker.search(),
        picker.focus == SearchFocus::Input,
    );

    let items: Vec<ListItem> = picker.filtered_items().map(ListItem::new).collect();
    let count = items.len();
    let list_focused = picker.focus == SearchFocus::List;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {count} of {} ", picker.items().len()))
                .border_style(theme.focus_border(list_focused)),
        )
        .highlight_style(theme.selected_row())
        .highlight_symbol("▸ ");
    let mut list_state = ListState::default();
    if count > 0 {
        list_state.select(Some(picker.selected()));
    }
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    if let Some(error) = &picker.error {
        let line = Span::styled(format!(" {error}"), Style::default().fg(theme.error));
        f.render_widget(Paragraph::new(line), chunks[2]);
    }

    let focused_button = match picker.focus {
        SearchFocus::Confirm => Some(0),
        SearchFocus::Cancel => Some(1),
        SearchFocus::Input | SearchFocus::List => None,
    };
    let buttons: Line = super::button_row(&[confirm_label, "Cancel"], focused_button, theme);
    f.render_widget(Paragraph::new(buttons), chunks[3]);
}
