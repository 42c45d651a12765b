use crate::constants::DIRECTIVE_DELIMITER;
use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    os::unix::fs::{OpenOptionsExt, PermissionsExt},
    path::{Path, PathBuf},
};

/// Instruction for the invoking shell, produced at most once per run.
///
/// Serialized as `path|branch|autoLaunch|terminalOnly`. The path is the only field
/// that may itself contain the delimiter, so parsing splits from the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchDirective {
    pub path: PathBuf,
    /// Empty for a detached worktree
    pub branch: String,
    pub auto_launch: bool,
    pub terminal_only: bool,
}

/// Where a directive ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOff {
    File(PathBuf),
    Stdout,
}

impl SwitchDirective {
    pub fn to_line(&self) -> String {
        let d = DIRECTIVE_DELIMITER;
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.path.display(),
            self.branch,
            self.auto_launch,
            self.terminal_only
        )
    }

    /// Inverse of [`Self::to_line`]; the shell wrapper is the production reader.
    #[cfg(test)]
    fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.rsplitn(4, DIRECTIVE_DELIMITER);
        let terminal_only = fields.next().context("empty switch directive")?;
        let auto_launch = fields
            .next()
            .context("switch directive is missing the auto-launch field")?;
        let branch = fields
            .next()
            .context("switch directive is missing the branch field")?;
        let path = fields
            .next()
            .filter(|p| !p.is_empty())
            .context("switch directive is missing the path field")?;

        Ok(Self {
            path: PathBuf::from(path),
            branch: branch.to_string(),
            auto_launch: parse_bool(auto_launch)?,
            terminal_only: parse_bool(terminal_only)?,
        })
    }

    /// Write the directive to `switch_file` with owner-only permissions, or print it
    /// to `stdout` when no file was provided.
    pub fn hand_off(&self, switch_file: Option<&Path>, stdout: &mut impl Write) -> Result<HandOff> {
        match switch_file {
            Some(path) => {
                self.write_to_file(path)?;
                log::info!("wrote switch directive to {}", path.display());
                Ok(HandOff::File(path.to_path_buf()))
            }
            None => {
                writeln!(stdout, "{}", self.to_line()).context("Failed to print switch directive")?;
                Ok(HandOff::Stdout)
            }
        }
    }

    fn write_to_file(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open switch file {}", path.display()))?;
        // `mode` only applies on creation; the wrapper's temp file already exists
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
        file.write_all(self.to_line().as_bytes())
            .with_context(|| format!("Failed to write switch file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
fn parse_bool(field: &str) -> Result<bool> {
    match field {
        "true" => Ok(true),
        "false" => Ok(false),
        other => anyhow::bail!("invalid boolean '{other}' in switch directive"),
    }
}
