use crate::theme::Theme;
use canopy_core::{
    state::{ConfirmDelete, DeleteChoice, ScriptList, SessionList},
    tmux::session_name_for,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

/// Everything a list-selection popup shows.
pub struct ListModalView<'a> {
    pub title: String,
    /// Lines above the list, e.g. what is about to be deleted
    pub message: Vec<Line<'a>>,
    pub items: Vec<ListItem<'a>>,
    pub selected: usize,
    pub hint: &'a str,
}

pub fn draw(f: &mut Frame, view: ListModalView<'_>, theme: &Theme) {
    let area = super::centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.title))
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let message_height = u16::try_from(view.message.len()).unwrap_or(u16::MAX);
    let chunks = Layout::vertical([
        Constraint::Length(message_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(inner);

    if !view.message.is_empty() {
        f.render_widget(
            Paragraph::new(view.message).wrap(Wrap { trim: false }),
            chunks[0],
        );
    }

    let has_items = !view.items.is_empty();
    let list = List::new(view.items)
        .highlight_style(theme.selected_row())
        .highlight_symbol("▸ ");
    let mut list_state = ListState::default();
    if has_items {
        list_state.select(Some(view.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    f.render_widget(
        Paragraph::new(Span::styled(view.hint, Style::default().fg(theme.muted))),
        chunks[2],
    );
}

pub fn confirm_delete_view<'a>(confirm: &'a ConfirmDelete, theme: &Theme) -> ListModalView<'a> {
    let mut message = vec![Line::from(vec![
        Span::raw("Delete worktree "),
        Span::styled(
            format!("\"{}\"", confirm.worktree.branch_label()),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" at {}?", confirm.worktree.path.display())),
    ])];
    if !confirm.sessions.is_empty() {
        message.push(Line::styled(
            format!("Also kills tmux sessions: {}", confirm.sessions.join(", ")),
            Style::default().fg(theme.error),
        ));
    }
    message.push(Line::raw(""));

    let items = DeleteChoice::ALL
        .iter()
        .map(|choice| ListItem::new(choice.label()))
        .collect();
    ListModalView {
        title: "Confirm delete".to_string(),
        message,
        items,
        selected: confirm.cursor.index,
        hint: "↑/↓ choose · enter confirm · y/n · esc cancel",
    }
}

pub fn session_list_view<'a>(list: &'a SessionList, theme: &Theme) -> ListModalView<'a> {
    let items = list
        .sessions
        .iter()
        .map(|session| {
            let mut spans = vec![Span::raw(session.name.as_str())];
            if session.attached {
                spans.push(Span::styled(" (attached)", theme.session_tag(true)));
            }
            if let Some(path) = &session.worktree_path {
                spans.push(Span::styled(
                    format!("  {}", path.display()),
                    Style::default().fg(theme.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    ListModalView {
        title: format!("{} sessions", list.sessions.len()),
        message: Vec::new(),
        items,
        selected: list.cursor.index,
        hint: "enter switch · d kill session · esc close",
    }
}

pub fn script_list_view<'a>(list: &'a ScriptList, theme: &Theme) -> ListModalView<'a> {
    let items = list
        .names
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();
    let message = vec![Line::styled(
        format!(
            "Runs in session {} ({})",
            session_name_for(&list.worktree.path),
            list.worktree.branch_label()
        ),
        Style::default().fg(theme.muted),
    )];
    ListModalView {
        title: "Run script".to_string(),
        message,
        items,
        selected: list.cursor.index,
        hint: "enter run · esc close",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::git::Worktree;
    use std::path::PathBuf;

    fn worktree() -> Worktree {
        Worktree {
            path: PathBuf::from("/src/.canopy_worktrees/app--feat"),
            branch: Some("feat".to_string()),
            is_main: false,
            is_current: false,
        }
    }

    #[test]
    fn test_confirm_delete_view_mentions_sessions() {
        let theme = Theme::default();
        let confirm = ConfirmDelete::new(worktree(), vec!["app--feat".to_string()]);
        let view = confirm_delete_view(&confirm, &theme);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.selected, 1);
        assert_eq!(view.message.len(), 3);
    }

    #[test]
    fn test_confirm_delete_view_without_sessions() {
        let theme = Theme::default();
        let confirm = ConfirmDelete::new(worktree(), Vec::new());
        let view = confirm_delete_view(&confirm, &theme);
        assert_eq!(view.message.len(), 2);
    }

    #[test]
    fn test_script_list_view_names_target_session() {
        let theme = Theme::default();
        let list = ScriptList::new(vec!["build".to_string(), "test".to_string()], worktree());
        let view = script_list_view(&list, &theme);
        assert_eq!(view.items.len(), 2);
        let text: String = view.message[0]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("app--feat"));
    }
}
