use anyhow::Result;
use canopy_core::{
    constants::APP_NAME,
    shell::{InstallOutcome, ShellIntegrationInstaller},
    update::{PayloadExtractor, ReleaseRepository, SelfUpdater, UpdateOutcome},
};
use std::{io::Write, path::Path};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    Install,
    Update,
    Remove,
}

pub fn cmd_init(
    installer: &dyn ShellIntegrationInstaller,
    mode: InitMode,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = match mode {
        InitMode::Install => installer.install(dry_run)?,
        InitMode::Update => installer.update(dry_run)?,
        InitMode::Remove => installer.remove(dry_run)?,
    };
    let rc_file = installer.rc_file().display();
    let shell = installer.shell();
    match (outcome, mode) {
        (InstallOutcome::Planned { contents }, _) => {
            writeln!(out, "Dry run: {rc_file} would contain:\n")?;
            write!(out, "{contents}")?;
            if !contents.is_empty() && !contents.ends_with('\n') {
                writeln!(out)?;
            }
        }
        (InstallOutcome::Unchanged, InitMode::Remove) => {
            writeln!(out, "No {shell} integration found in {rc_file}")?;
        }
        (InstallOutcome::Unchanged, _) => {
            writeln!(out, "{shell} integration in {rc_file} is already up to date")?;
        }
        (InstallOutcome::Written, InitMode::Remove) => {
            writeln!(out, "✓ Removed {shell} integration from {rc_file}")?;
        }
        (InstallOutcome::Written, _) => {
            writeln!(out, "✓ Installed {shell} integration into {rc_file}")?;
            writeln!(out, "Restart your shell or run: source {rc_file}")?;
        }
    }
    Ok(())
}

pub fn cmd_update(
    repository: &dyn ReleaseRepository,
    extractor: &dyn PayloadExtractor,
    executable: &Path,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Checking for updates...")?;
    match SelfUpdater::new(repository, extractor, executable, VERSION).run()? {
        UpdateOutcome::UpToDate { current } => {
            writeln!(out, "{APP_NAME} {current} is already up to date")?;
        }
        UpdateOutcome::Updated { from, to } => {
            writeln!(out, "✓ Updated {APP_NAME} from {from} to {to}")?;
        }
    }
    Ok(())
}

pub fn cmd_version(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{APP_NAME} version {VERSION}")?;
    Ok(())
}
