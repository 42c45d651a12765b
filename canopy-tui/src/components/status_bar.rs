use crate::theme::Theme;
use canopy_core::state::AppState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
};

/// The line to show, most urgent first: error, then notice, then the update hint.
pub fn status_line(state: &AppState, theme: &Theme) -> Option<(String, Color, bool)> {
    if let Some(error) = &state.error {
        return Some((format!(" Error: {error}"), theme.error, true));
    }
    if let Some(notice) = &state.notice {
        return Some((format!(" {notice}"), theme.notice, false));
    }
    state
        .update_notice
        .as_ref()
        .map(|notice| (format!(" {notice}"), theme.update, false))
}

pub fn draw(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    if let Some((text, color, bold)) = status_line(state, theme) {
        let mut style = Style::default().fg(color);
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        f.render_widget(Paragraph::new(Span::styled(text, style)), area);
    }
}
