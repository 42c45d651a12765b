use super::{ReleaseRepository, Version};
use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub fn cache_file() -> Result<PathBuf> {
    Ok(paths::cache_dir()?.join("version_check.json"))
}

/// When the releases API was last asked, and what it said.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCheckCache {
    /// Seconds since the Unix epoch
    pub last_checked: u64,
    pub latest: Option<String>,
}

impl VersionCheckCache {
    /// A missing or unreadable cache counts as never checked.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                return Self::default();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn is_fresh(&self, now: SystemTime, interval: Duration) -> bool {
        let now = unix_secs(now);
        now >= self.last_checked && now - self.last_checked < interval.as_secs()
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The newer release, if any. Within `interval` of the last check the cached
/// answer is reused and the network is not touched.
pub fn check_for_update(
    repository: &dyn ReleaseRepository,
    cache_path: &Path,
    interval: Duration,
    current_version: &str,
    now: SystemTime,
) -> Result<Option<Version>> {
    let current: Version = current_version
        .parse()
        .context("Failed to parse current version")?;
    let cache = VersionCheckCache::load(cache_path);

    let latest_tag = if cache.is_fresh(now, interval) {
        log::debug!("version check skipped, last checked at {}", cache.last_checked);
        cache.latest
    } else {
        let release = repository
            .fetch_latest()
            .context("Failed to check for updates")?;
        let fresh = VersionCheckCache {
            last_checked: unix_secs(now),
            latest: Some(release.tag),
        };
        if let Err(err) = fresh.save(cache_path) {
            log::warn!("{err:#}");
        }
        fresh.latest
    };

    let Some(tag) = latest_tag else {
        return Ok(None);
    };
    let latest: Version = tag.parse().context("Failed to parse latest version")?;
    Ok((latest > current).then_some(latest))
}
