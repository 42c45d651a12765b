use super::{parse_worktree_porcelain, provider::WorktreeProvider, repo::Worktree};
use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

pub struct CliWorktreeProvider {
    repo_path: PathBuf,
    /// Toplevel of the worktree the dashboard was launched from
    current: Option<PathBuf>,
}

impl CliWorktreeProvider {
    /// Resolve `path` to the toplevel of the git worktree containing it.
    pub fn open(path: &Path) -> Result<Self> {
        let output = run_git(path, &["rev-parse", "--show-toplevel"])
            .with_context(|| format!("{} is not inside a git repository", path.display()))?;
        let toplevel = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let current = canonicalize_or_keep(&toplevel);
        Ok(Self {
            repo_path: current.clone(),
            current: Some(current),
        })
    }

    pub fn new(repo_path: PathBuf) -> Self {
        Self {
            repo_path,
            current: None,
        }
    }
}

impl WorktreeProvider for CliWorktreeProvider {
    fn list(&self) -> Result<Vec<Worktree>> {
        let output = run_git(&self.repo_path, &["worktree", "list", "--porcelain"])
            .context("git worktree list failed")?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_worktree_porcelain(&stdout, self.current.as_deref()))
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let output = run_git(&self.repo_path, &["branch", "--format=%(refname:short)"])
            .context("git branch failed")?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn create(&self, path: &Path, branch: &str, from_existing: bool) -> Result<()> {
        let path_str = path.to_string_lossy();
        if from_existing {
            run_git(&self.repo_path, &["worktree", "add", &path_str, branch])
                .context("git worktree add failed")?;
        } else {
            run_git(&self.repo_path, &["worktree", "add", "-b", branch, &path_str])
                .context("git worktree add -b failed")?;
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        run_git(
            &self.repo_path,
            &["worktree", "remove", &path.to_string_lossy()],
        )
        .context("git worktree remove failed")?;
        Ok(())
    }

    fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .context("failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{}", stderr.trim());
    }

    Ok(output)
}

fn canonicalize_or_keep(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
