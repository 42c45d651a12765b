use crate::theme::Theme;
use canopy_core::state::AppState;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

const HINTS: &str = "enter switch · t terminal · n new · a from branch · d delete · s sessions · x scripts · ? help · q quit";

pub fn draw(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

    let repo_name = state
        .main_worktree_path()
        .file_name()
        .map_or_else(|| state.repo_path.to_string_lossy(), |n| n.to_string_lossy());

    let items: Vec<ListItem> = state
        .worktrees
        .iter()
        .map(|wt| {
            let mut spans = vec![Span::styled(
                wt.branch_label().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if wt.is_main {
                spans.push(Span::styled(" (main)", Style::default().fg(theme.muted)));
            }
            if wt.is_current {
                spans.push(Span::styled(" *", Style::default().fg(theme.accent)));
            }
            if let Some(session) = state.session_for(wt) {
                let label = if session.attached {
                    format!(" [{} attached]", session.name)
                } else {
                    format!(" [{}]", session.name)
                };
                spans.push(Span::styled(label, theme.session_tag(session.attached)));
            }
            spans.push(Span::styled(
                format!("  {}", wt.path.display()),
                Style::default().fg(theme.muted),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" {repo_name} · {} worktrees ", state.worktrees.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(theme.selected_row())
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !state.worktrees.is_empty() {
        list_state.select(Some(state.selected));
    }
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let hints = Paragraph::new(Span::styled(HINTS, Style::default().fg(theme.muted)));
    f.render_widget(hints, chunks[1]);
}
