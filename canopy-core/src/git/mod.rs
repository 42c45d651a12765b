pub mod cli;
pub mod mock;
pub mod provider;
pub mod repo;

pub use cli::CliWorktreeProvider;
pub use provider::WorktreeProvider;
pub use repo::Worktree;

use std::path::{Path, PathBuf};

/// Parse `git worktree list --porcelain` output into worktrees.
///
/// The first entry is the main worktree. `current` marks the entry whose path
/// equals it as the worktree the user is standing in.
pub fn parse_worktree_porcelain(output: &str, current: Option<&Path>) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current_path: Option<PathBuf> = None;
    let mut current_branch: Option<String> = None;

    let push = |path: PathBuf, branch: Option<String>, worktrees: &mut Vec<Worktree>| {
        let is_current = current.is_some_and(|c| c == path);
        let is_main = worktrees.is_empty();
        worktrees.push(Worktree {
            path,
            branch,
            is_main,
            is_current,
        });
    };

    for line in output.lines() {
        if let Some(p) = line.strip_prefix("worktree ") {
            current_path = Some(PathBuf::from(p));
        } else if let Some(b) = line.strip_prefix("branch refs/heads/") {
            current_branch = Some(b.to_string());
        } else if line.is_empty() {
            if let Some(path) = current_path.take() {
                push(path, current_branch.take(), &mut worktrees);
            }
            current_branch = None;
        }
    }

    // Handle last entry (no trailing blank line)
    if let Some(path) = current_path {
        push(path, current_branch, &mut worktrees);
    }

    worktrees
}
