use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
};

pub mod help;
pub mod input;
pub mod list_modal;
pub mod new_branch;
pub mod search_modal;
pub mod status_bar;
pub mod worktree_list;

/// Helper function to center a rect within another rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Percentage(percent_y.min(100)),
        Constraint::Fill(1),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Percentage(percent_x.min(100)),
        Constraint::Fill(1),
    ])
    .split(popup_layout[1])[1]
}

/// `[ Create ]  [ Cancel ]`, with the focused button highlighted.
pub fn button_row<'a>(labels: &[&'a str], focused: Option<usize>, theme: &Theme) -> Line<'a> {
    let mut spans = Vec::with_capacity(labels.len() * 2);
    for (idx, label) in labels.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if focused == Some(idx) {
            Style::default()
                .bg(theme.accent)
                .fg(theme.highlight_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        spans.push(Span::styled(format!("[ {label} ]"), style));
    }
    Line::from(spans).centered()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, parent);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 25);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn test_button_row_highlights_focused() {
        let theme = Theme::default();
        let line = button_row(&["Create", "Cancel"], Some(1), &theme);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "[ Create ]  [ Cancel ]");
        assert_eq!(line.spans[2].style.bg, Some(theme.accent));
        assert_eq!(line.spans[0].style.bg, None);
    }
}
