use super::input::{self, InputStyle};
use crate::theme::Theme;
use canopy_core::state::{FormFocus, NewBranchForm};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Clear, Paragraph},
};

pub fn draw(f: &mut Frame, form: &NewBranchForm, theme: &Theme) {
    let full = f.area();
    let width = full.width.saturating_mul(6) / 10;
    let area = Rect {
        x: full.x + full.width.saturating_sub(width) / 2,
        y: full.y + full.height.saturating_sub(5) / 2,
        width,
        height: 5.min(full.height),
    };
    f.render_widget(Clear, area);

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    input::draw(
        f,
        chunks[0],
        &InputStyle {
            title: "New branch",
            placeholder: "Branch name...",
            border_color: if form.focus == FormFocus::Input {
                theme.notice
            } else {
                theme.border
            },
            muted_color: theme.muted,
        },
        &form.name,
        form.focus == FormFocus::Input,
    );

    if let Some(error) = &form.error {
        let line = Span::styled(format!(" {error}"), Style::default().fg(theme.error));
        f.render_widget(Paragraph::new(line), chunks[1]);
    }

    let focused = match form.focus {
        FormFocus::Input => None,
        FormFocus::Create => Some(0),
        FormFocus::Cancel => Some(1),
    };
    f.render_widget(
        Paragraph::new(super::button_row(&["Create", "Cancel"], focused, theme)),
        chunks[2],
    );
}
