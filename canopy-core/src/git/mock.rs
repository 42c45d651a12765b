use super::{provider::WorktreeProvider, repo::Worktree};
use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

#[derive(Default)]
pub struct MockWorktreeProvider {
    pub repo_path: PathBuf,
    pub worktrees: Mutex<Vec<Worktree>>,
    pub branches: Vec<String>,
    pub list_result: Mutex<Option<Result<()>>>,
    pub create_result: Mutex<Option<Result<()>>>,
    pub remove_result: Mutex<Option<Result<()>>>,
    pub create_calls: Mutex<Vec<(PathBuf, String, bool)>>,
    pub remove_calls: Mutex<Vec<PathBuf>>,
}

impl MockWorktreeProvider {
    pub fn with_worktrees(worktrees: Vec<Worktree>) -> Self {
        Self {
            repo_path: worktrees
                .first()
                .map(|wt| wt.path.clone())
                .unwrap_or_default(),
            worktrees: Mutex::new(worktrees),
            ..Self::default()
        }
    }

    pub fn fail_next_list(&self, message: &str) {
        *self.list_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn fail_next_create(&self, message: &str) {
        *self.create_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn fail_next_remove(&self, message: &str) {
        *self.remove_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }
}

impl WorktreeProvider for MockWorktreeProvider {
    fn list(&self) -> Result<Vec<Worktree>> {
        self.list_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        Ok(self.worktrees.lock().unwrap().clone())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.clone())
    }

    fn create(&self, path: &Path, branch: &str, from_existing: bool) -> Result<()> {
        self.create_calls.lock().unwrap().push((
            path.to_path_buf(),
            branch.to_string(),
            from_existing,
        ));
        self.create_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        self.worktrees.lock().unwrap().push(Worktree {
            path: path.to_path_buf(),
            branch: Some(branch.to_string()),
            is_main: false,
            is_current: false,
        });
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.remove_calls.lock().unwrap().push(path.to_path_buf());
        self.remove_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        self.worktrees.lock().unwrap().retain(|wt| wt.path != path);
        Ok(())
    }

    fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}
