use super::{InstallOutcome, ShellIntegrationInstaller};
use crate::constants::{INIT_ATTEMPTED_ENV, SWITCH_FILE_ENV};
use anyhow::{Context, Result};
use std::{
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    process::Command,
};

const DEFAULT_SHELL: &str = "/bin/bash";

/// Whether startup should try to activate shell integration: only when the wrapper
/// is not already driving us, we have not re-executed before, and the command is
/// one that opens the dashboard.
pub fn should_bootstrap(exempt_command: bool, env: impl Fn(&str) -> Option<String>) -> bool {
    let set = |name: &str| env(name).is_some_and(|v| !v.is_empty());
    !exempt_command && !set(SWITCH_FILE_ENV) && !set(INIT_ATTEMPTED_ENV)
}

/// `$SHELL -c "source <rc>; <argv>"`, ready to replace the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExecPlan {
    pub shell: PathBuf,
    pub command: String,
}

impl ReExecPlan {
    pub fn new(rc_file: &Path, argv: &[String], shell_env: Option<&str>) -> Result<Self> {
        let shell = shell_env
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SHELL);
        let rc = rc_file.to_string_lossy();
        let mut words = Vec::with_capacity(argv.len());
        for arg in argv {
            words.push(quote(arg)?);
        }
        Ok(Self {
            shell: PathBuf::from(shell),
            command: format!("source {}; {}", quote(&rc)?, words.join(" ")),
        })
    }

    /// Replace the current process. Only returns on failure.
    pub fn exec(&self) -> anyhow::Error {
        log::info!("re-executing via {}: {}", self.shell.display(), self.command);
        let err = Command::new(&self.shell)
            .arg("-c")
            .arg(&self.command)
            .env(INIT_ATTEMPTED_ENV, "1")
            .exec();
        anyhow::Error::new(err).context(format!("Failed to exec {}", self.shell.display()))
    }
}

fn quote(word: &str) -> Result<String> {
    shlex::try_quote(word)
        .map(|quoted| quoted.into_owned())
        .with_context(|| format!("cannot shell-quote argument {word:?}"))
}

/// Install the wrapper if needed and plan the re-exec that activates it.
/// The flag reports whether the rc file was written just now.
pub fn prepare(
    installer: &dyn ShellIntegrationInstaller,
    argv: &[String],
    shell_env: Option<&str>,
) -> Result<(ReExecPlan, bool)> {
    let newly_installed = if installer.is_installed()? {
        false
    } else {
        let outcome = installer.install(false)?;
        log::info!(
            "installed {} integration into {}: {outcome:?}",
            installer.shell(),
            installer.rc_file().display()
        );
        outcome == InstallOutcome::Written
    };
    let plan = ReExecPlan::new(installer.rc_file(), argv, shell_env)?;
    Ok((plan, newly_installed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{RcFileInstaller, ShellKind};
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_should_bootstrap_guards() {
        assert!(should_bootstrap(false, env(&[])));
        assert!(!should_bootstrap(true, env(&[])));
        assert!(!should_bootstrap(false, env(&[(SWITCH_FILE_ENV, "/tmp/x")])));
        assert!(!should_bootstrap(false, env(&[(INIT_ATTEMPTED_ENV, "1")])));
        assert!(should_bootstrap(false, env(&[(INIT_ATTEMPTED_ENV, "")])));
    }

    #[test]
    fn test_plan_sources_rc_then_reruns_argv() {
        let argv = vec!["canopy".to_string(), "--path=/tmp/my repo".to_string()];
        let plan = ReExecPlan::new(Path::new("/home/u/.zshrc"), &argv, Some("/bin/zsh")).unwrap();
        assert_eq!(plan.shell, PathBuf::from("/bin/zsh"));
        assert!(plan.command.starts_with("source /home/u/.zshrc; canopy "));
        assert!(!plan.command.contains(" /tmp/my repo"));
        assert!(plan.command.contains("my repo"));
    }

    #[test]
    fn test_plan_defaults_to_bash() {
        let plan = ReExecPlan::new(Path::new("/rc"), &["canopy".to_string()], None).unwrap();
        assert_eq!(plan.shell, PathBuf::from(DEFAULT_SHELL));
        let plan = ReExecPlan::new(Path::new("/rc"), &["canopy".to_string()], Some("")).unwrap();
        assert_eq!(plan.shell, PathBuf::from(DEFAULT_SHELL));
    }

    #[test]
    fn test_plan_rejects_unquotable_argument() {
        let argv = vec!["canopy".to_string(), "bad\0arg".to_string()];
        assert!(ReExecPlan::new(Path::new("/rc"), &argv, None).is_err());
    }

    #[test]
    fn test_prepare_installs_missing_integration() {
        let home = tempfile::tempdir().unwrap();
        let installer = RcFileInstaller::new(ShellKind::Bash, home.path(), "claude");
        let (plan, newly_installed) =
            prepare(&installer, &["canopy".to_string()], Some("/bin/bash")).unwrap();
        assert!(newly_installed);
        assert!(installer.is_installed().unwrap());
        assert!(plan.command.contains(".bashrc"));

        let (_, newly_installed) =
            prepare(&installer, &["canopy".to_string()], Some("/bin/bash")).unwrap();
        assert!(!newly_installed);
    }
}
