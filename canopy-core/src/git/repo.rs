use std::path::PathBuf;

/// Snapshot of one `git worktree list` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub path: PathBuf,
    /// `None` for a detached HEAD
    pub branch: Option<String>,
    pub is_main: bool,
    /// The worktree the dashboard was launched from
    pub is_current: bool,
}

impl Worktree {
    pub fn branch_label(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached)")
    }
}
