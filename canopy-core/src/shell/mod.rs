//! Shell integration: the rc-file wrapper that performs the directory switch, and
//! the one-time re-exec that activates it.

pub mod installer;
pub mod reexec;
pub mod wrapper;

pub use installer::{InstallOutcome, RcFileInstaller};
pub use reexec::ReExecPlan;

use anyhow::Result;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Detect from a `$SHELL` value; anything unrecognized is treated as bash.
    pub fn detect(shell_env: Option<&str>) -> Self {
        shell_env
            .and_then(|shell| Path::new(shell).file_name())
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse().ok())
            .unwrap_or(ShellKind::Bash)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
        }
    }

    pub fn rc_file(self, home: &Path) -> PathBuf {
        match self {
            ShellKind::Bash => home.join(".bashrc"),
            ShellKind::Zsh => home.join(".zshrc"),
            ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }
}

impl FromStr for ShellKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bash" => Ok(ShellKind::Bash),
            "zsh" => Ok(ShellKind::Zsh),
            "fish" => Ok(ShellKind::Fish),
            other => anyhow::bail!("unknown shell '{other}' (expected bash, zsh or fish)"),
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Installs, refreshes and removes the shell wrapper.
///
/// Every mutating operation takes `dry_run`; a dry run reports the change it would
/// make and leaves the filesystem untouched.
pub trait ShellIntegrationInstaller {
    fn shell(&self) -> ShellKind;
    fn rc_file(&self) -> &Path;
    fn is_installed(&self) -> Result<bool>;
    fn install(&self, dry_run: bool) -> Result<InstallOutcome>;
    fn update(&self, dry_run: bool) -> Result<InstallOutcome>;
    fn remove(&self, dry_run: bool) -> Result<InstallOutcome>;
}
