use crate::keyboard::Key;

/// Every main-view interaction produces an Action. UI never directly calls git/tmux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    /// Switch to the selected worktree
    Switch,
    /// Switch into a plain terminal session, without the assistant
    SwitchTerminalOnly,
    NewBranch,
    FromExistingBranch,
    DeleteWorktree,
    ShowSessions,
    ShowScripts,
    Refresh,
    ToggleHelp,
    Quit,
}

/// Main-view key bindings, in help-overlay order.
pub const MAIN_BINDINGS: &[(&str, &str, Action)] = &[
    ("↑/k", "move up", Action::MoveUp),
    ("↓/j", "move down", Action::MoveDown),
    ("enter", "switch to worktree", Action::Switch),
    ("t", "switch, terminal only", Action::SwitchTerminalOnly),
    ("n", "new branch", Action::NewBranch),
    ("a", "worktree from existing branch", Action::FromExistingBranch),
    ("d", "delete worktree", Action::DeleteWorktree),
    ("s", "sessions", Action::ShowSessions),
    ("x", "run script", Action::ShowScripts),
    ("r", "refresh", Action::Refresh),
    ("?", "help", Action::ToggleHelp),
    ("q/esc", "quit", Action::Quit),
];

impl Action {
    pub fn from_key(key: Key) -> Option<Self> {
        let action = match key {
            Key::Up | Key::Char('k') => Action::MoveUp,
            Key::Down | Key::Char('j') => Action::MoveDown,
            Key::Enter => Action::Switch,
            Key::Char('t') => Action::SwitchTerminalOnly,
            Key::Char('n') => Action::NewBranch,
            Key::Char('a') => Action::FromExistingBranch,
            Key::Char('d') => Action::DeleteWorktree,
            Key::Char('s') => Action::ShowSessions,
            Key::Char('x') => Action::ShowScripts,
            Key::Char('r') => Action::Refresh,
            Key::Char('?') => Action::ToggleHelp,
            Key::Char('q') | Key::Esc | Key::Interrupt => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}
