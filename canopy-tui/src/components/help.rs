use crate::theme::Theme;
use canopy_core::action::MAIN_BINDINGS;
use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const MODAL_BINDINGS: &[(&str, &str)] = &[
    ("type", "filter the list"),
    ("↑/↓", "move, ↑ at the top returns to the input"),
    ("tab", "cycle input, list and buttons"),
    ("enter", "confirm"),
    ("esc", "close"),
];

fn section<'a>(
    lines: &mut Vec<Line<'a>>,
    name: &'a str,
    rows: impl Iterator<Item = (&'a str, &'a str)>,
    theme: &Theme,
) {
    lines.push(Line::styled(
        name,
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ));
    for (key, description) in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {key:<8}"),
                Style::default()
                    .fg(theme.selection)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(description),
        ]));
    }
}

pub fn help_lines(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    section(
        &mut lines,
        "Worktrees",
        MAIN_BINDINGS.iter().map(|(key, description, _)| (*key, *description)),
        theme,
    );
    lines.push(Line::raw(""));
    section(&mut lines, "Dialogs", MODAL_BINDINGS.iter().copied(), theme);
    lines
}

/// Help overlay showing keybindings. Any key closes it.
pub fn draw(f: &mut Frame, theme: &Theme) {
    let area = super::centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" help - key bindings (any key: close) ")
        .border_style(Style::default().fg(theme.accent));
    f.render_widget(Paragraph::new(help_lines(theme)).block(block), area);
}
