use crate::constants::APP_NAME;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Unable to find home directory")
}

/// `$XDG_CONFIG_HOME/canopy`, falling back to `~/.config/canopy` on every platform
/// (not `~/Library/Application Support`).
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// `$XDG_CACHE_HOME/canopy`, falling back to `~/.cache/canopy`.
pub fn cache_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(var)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }
    Ok(home_dir()?.join(fallback).join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_cache_dirs_end_with_app_name() {
        assert!(config_dir().unwrap().ends_with(APP_NAME));
        assert!(cache_dir().unwrap().ends_with(APP_NAME));
    }
}
