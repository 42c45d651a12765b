use super::{
    ShellIntegrationInstaller, ShellKind,
    wrapper::{self, BLOCK_END, BLOCK_START},
};
use anyhow::{Context, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The rc file was rewritten
    Written,
    /// Nothing to do
    Unchanged,
    /// Dry run: the rc file contents that would have been written
    Planned { contents: String },
}

/// Manages the wrapper block inside a shell's rc file.
pub struct RcFileInstaller {
    shell: ShellKind,
    rc_file: PathBuf,
    assistant_command: String,
}

impl RcFileInstaller {
    pub fn new(shell: ShellKind, home: &Path, assistant_command: impl Into<String>) -> Self {
        Self {
            shell,
            rc_file: shell.rc_file(home),
            assistant_command: assistant_command.into(),
        }
    }

    fn read_rc(&self) -> Result<String> {
        match fs::read_to_string(&self.rc_file) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", self.rc_file.display()))
            }
        }
    }

    fn write_rc(&self, contents: String, dry_run: bool) -> Result<InstallOutcome> {
        if dry_run {
            return Ok(InstallOutcome::Planned { contents });
        }
        if let Some(parent) = self.rc_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.rc_file, contents)
            .with_context(|| format!("Failed to write {}", self.rc_file.display()))?;
        log::info!("updated {}", self.rc_file.display());
        Ok(InstallOutcome::Written)
    }

    fn block(&self) -> String {
        wrapper::block(self.shell, &self.assistant_command)
    }
}

/// Byte range of the marker block, including the end marker's trailing newline.
fn block_range(contents: &str) -> Option<(usize, usize)> {
    let start = contents.find(BLOCK_START)?;
    let end_marker = start + contents[start..].find(BLOCK_END)?;
    let mut end = end_marker + BLOCK_END.len();
    if contents[end..].starts_with('\n') {
        end += 1;
    }
    Some((start, end))
}

impl ShellIntegrationInstaller for RcFileInstaller {
    fn shell(&self) -> ShellKind {
        self.shell
    }

    fn rc_file(&self) -> &Path {
        &self.rc_file
    }

    fn is_installed(&self) -> Result<bool> {
        Ok(self.read_rc()?.contains(BLOCK_START))
    }

    fn install(&self, dry_run: bool) -> Result<InstallOutcome> {
        let mut contents = self.read_rc()?;
        if contents.contains(BLOCK_START) {
            return Ok(InstallOutcome::Unchanged);
        }
        if !contents.is_empty() {
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            contents.push('\n');
        }
        contents.push_str(&self.block());
        self.write_rc(contents, dry_run)
    }

    fn update(&self, dry_run: bool) -> Result<InstallOutcome> {
        let contents = self.read_rc()?;
        let Some((start, end)) = block_range(&contents) else {
            return self.install(dry_run);
        };
        let updated = format!("{}{}{}", &contents[..start], self.block(), &contents[end..]);
        if updated == contents {
            return Ok(InstallOutcome::Unchanged);
        }
        self.write_rc(updated, dry_run)
    }

    fn remove(&self, dry_run: bool) -> Result<InstallOutcome> {
        let contents = self.read_rc()?;
        let Some((start, end)) = block_range(&contents) else {
            return Ok(InstallOutcome::Unchanged);
        };
        let mut head = contents[..start].to_string();
        // Drop the blank separator line added on install
        if head.ends_with("\n\n") {
            head.pop();
        }
        self.write_rc(format!("{head}{}", &contents[end..]), dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installer(shell: ShellKind) -> (TempDir, RcFileInstaller) {
        let home = tempfile::tempdir().unwrap();
        let installer = RcFileInstaller::new(shell, home.path(), "claude");
        (home, installer)
    }

    #[test]
    fn test_install_appends_block_and_keeps_existing_lines() {
        let (_home, installer) = installer(ShellKind::Bash);
        fs::write(installer.rc_file(), "export EDITOR=vim").unwrap();

        assert!(!installer.is_installed().unwrap());
        assert_eq!(installer.install(false).unwrap(), InstallOutcome::Written);
        assert!(installer.is_installed().unwrap());

        let contents = fs::read_to_string(installer.rc_file()).unwrap();
        assert!(contents.starts_with("export EDITOR=vim\n\n# >>> canopy"));
        assert!(contents.ends_with(&format!("{BLOCK_END}\n")));
    }

    #[test]
    fn test_install_twice_is_unchanged() {
        let (_home, installer) = installer(ShellKind::Zsh);
        installer.install(false).unwrap();
        let first = fs::read_to_string(installer.rc_file()).unwrap();
        assert_eq!(installer.install(false).unwrap(), InstallOutcome::Unchanged);
        assert_eq!(fs::read_to_string(installer.rc_file()).unwrap(), first);
    }

    #[test]
    fn test_install_creates_fish_config_dir() {
        let (_home, installer) = installer(ShellKind::Fish);
        installer.install(false).unwrap();
        let contents = fs::read_to_string(installer.rc_file()).unwrap();
        assert!(contents.starts_with(BLOCK_START));
        assert!(contents.contains("function canopy"));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let (_home, installer) = installer(ShellKind::Bash);
        let outcome = installer.install(true).unwrap();
        assert!(matches!(outcome, InstallOutcome::Planned { contents } if contents.contains(BLOCK_START)));
        assert!(!installer.rc_file().exists());

        fs::write(installer.rc_file(), "alias ll='ls -l'\n").unwrap();
        installer.install(false).unwrap();
        let before = fs::read_to_string(installer.rc_file()).unwrap();
        assert!(matches!(installer.remove(true).unwrap(), InstallOutcome::Planned { .. }));
        assert_eq!(fs::read_to_string(installer.rc_file()).unwrap(), before);
    }

    #[test]
    fn test_update_replaces_stale_block_in_place() {
        let (_home, installer) = installer(ShellKind::Bash);
        fs::write(
            installer.rc_file(),
            format!("before\n\n{BLOCK_START}\nold wrapper\n{BLOCK_END}\nafter\n"),
        )
        .unwrap();

        assert_eq!(installer.update(false).unwrap(), InstallOutcome::Written);
        let contents = fs::read_to_string(installer.rc_file()).unwrap();
        assert!(contents.starts_with(&format!("before\n\n{BLOCK_START}\n")));
        assert!(contents.ends_with(&format!("{BLOCK_END}\nafter\n")));
        assert!(!contents.contains("old wrapper"));
        assert_eq!(installer.update(false).unwrap(), InstallOutcome::Unchanged);
    }

    #[test]
    fn test_update_without_block_installs() {
        let (_home, installer) = installer(ShellKind::Bash);
        assert_eq!(installer.update(false).unwrap(), InstallOutcome::Written);
        assert!(installer.is_installed().unwrap());
    }

    #[test]
    fn test_remove_restores_original_contents() {
        let (_home, installer) = installer(ShellKind::Bash);
        fs::write(installer.rc_file(), "export A=1\n").unwrap();
        installer.install(false).unwrap();

        assert_eq!(installer.remove(false).unwrap(), InstallOutcome::Written);
        assert_eq!(
            fs::read_to_string(installer.rc_file()).unwrap(),
            "export A=1\n"
        );
        assert_eq!(installer.remove(false).unwrap(), InstallOutcome::Unchanged);
    }
}
