use super::repo::Worktree;
use anyhow::Result;
use std::path::Path;

/// Worktree operations for a single repository.
pub trait WorktreeProvider: Send + Sync {
    fn list(&self) -> Result<Vec<Worktree>>;
    fn list_branches(&self) -> Result<Vec<String>>;
    /// Create a worktree at `path`. With `from_existing`, `branch` must already exist;
    /// otherwise a new branch is created from the current HEAD.
    fn create(&self, path: &Path, branch: &str, from_existing: bool) -> Result<()>;
    fn remove(&self, path: &Path) -> Result<()>;
    fn repo_path(&self) -> &Path;
}
