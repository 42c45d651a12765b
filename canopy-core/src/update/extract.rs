use crate::constants::APP_NAME;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

/// Unpacks a downloaded release archive and locates the executable inside it.
pub trait PayloadExtractor {
    fn extract(&self, archive: &Path, staging: &Path) -> Result<PathBuf>;
}

/// Delegates to the system `tar`.
pub struct TarExtractor;

impl PayloadExtractor for TarExtractor {
    fn extract(&self, archive: &Path, staging: &Path) -> Result<PathBuf> {
        let output = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(staging)
            .output()
            .context("failed to run tar")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tar failed: {}", stderr.trim());
        }
        find_payload(staging, APP_NAME)
    }
}

/// The single regular file called `name` anywhere under `dir`.
pub fn find_payload(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut found = Vec::new();
    collect_named_files(dir, name, &mut found)?;
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => anyhow::bail!("No `{name}` executable found in release archive"),
        n => anyhow::bail!("Release archive contains {n} files named `{name}`"),
    }
}

fn collect_named_files(dir: &Path, name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_named_files(&path, name, found)?;
        } else if file_type.is_file() && entry.file_name() == name {
            found.push(path);
        }
    }
    Ok(())
}
