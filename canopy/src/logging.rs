use anyhow::Result;
use canopy_core::{constants::LOG_LEVEL_ENV, paths};
use log::LevelFilter;
use std::{path::PathBuf, str::FromStr};

const LOG_FILE_NAME: &str = "canopy.log";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

pub fn default_log_file() -> Result<PathBuf> {
    Ok(paths::cache_dir()?.join(LOG_FILE_NAME))
}

/// Level named by `CANOPY_LOG`, or `warn` when unset or unrecognized.
pub fn level_from_env() -> LevelFilter {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| LevelFilter::from_str(v).ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Log to a file under the cache dir; the dashboard owns the terminal.
pub fn setup_logging(level: LevelFilter) -> Result<()> {
    let log_file = default_log_file()?;
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    simple_log::file(log_file.to_string_lossy().into_owned(), level, 10, 10)
        .map_err(|e| anyhow::anyhow!(e))?;
    log::info!("canopy logging initialised (level={level})");
    Ok(())
}
