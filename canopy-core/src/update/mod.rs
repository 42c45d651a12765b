pub mod check;
pub mod extract;
pub mod github;
pub mod manager;
pub mod mock;

pub use check::{VersionCheckCache, check_for_update};
pub use extract::{PayloadExtractor, TarExtractor};
pub use github::GithubReleases;
pub use manager::{SelfUpdater, UpdateOutcome, UpdateStep};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, path::Path, str::FromStr};

/// A `major.minor.patch` release version. A leading `v` and any pre-release or
/// build suffix are accepted but do not take part in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = bare.split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.');
        let mut component = |name: &str| -> Result<u64> {
            let part = parts
                .next()
                .with_context(|| format!("Invalid version {s:?}: missing {name} component"))?;
            part.parse()
                .with_context(|| format!("Invalid version {s:?}: bad {name} component"))
        };
        let version = Self {
            major: component("major")?,
            minor: component("minor")?,
            patch: component("patch")?,
        };
        if parts.next().is_some() {
            anyhow::bail!("Invalid version {s:?}: expected major.minor.patch");
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Latest-release metadata as returned by the GitHub releases API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub url: String,
}

pub trait ReleaseRepository: Send + Sync {
    fn fetch_latest(&self) -> Result<Release>;
    /// Stream the asset's bytes into `dest`.
    fn download(&self, asset: &Asset, dest: &Path) -> Result<()>;
}

/// Archive suffix for a platform, e.g. `linux_amd64.tar.gz`.
pub fn asset_suffix(os: &str, arch: &str) -> String {
    let os = match os {
        "macos" => "darwin",
        other => other,
    };
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    };
    format!("{os}_{arch}.tar.gz")
}

pub fn current_asset_suffix() -> String {
    asset_suffix(std::env::consts::OS, std::env::consts::ARCH)
}

/// First asset, in release order, built for the given platform suffix.
pub fn select_asset<'a>(release: &'a Release, suffix: &str) -> Option<&'a Asset> {
    release.assets.iter().find(|a| a.name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_string(),
            url: format!("https://example.invalid/{name}"),
        }
    }

    #[test]
    fn test_version_parse_strips_v_and_suffix() {
        let v: Version = "v1.2.3-rc.1".parse().unwrap();
        assert_eq!(
            v,
            Version {
                major: 1,
                minor: 2,
                patch: 3
            }
        );
        assert_eq!(v.to_string(), "1.2.3");
        assert_eq!("0.1.0".parse::<Version>().unwrap(), "v0.1.0".parse().unwrap());
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        for bad in ["", "1.2", "1.2.3.4", "one.two.three", "v", "1..3"] {
            assert!(bad.parse::<Version>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        let parse = |s: &str| s.parse::<Version>().unwrap();
        assert!(parse("0.10.0") > parse("0.9.9"));
        assert!(parse("1.0.0") > parse("0.99.99"));
        assert!(parse("0.1.1") > parse("0.1.0"));
        assert_eq!(parse("0.2.0-beta"), parse("0.2.0"));
    }

    #[test]
    fn test_asset_suffix_maps_rust_names() {
        assert_eq!(asset_suffix("linux", "x86_64"), "linux_amd64.tar.gz");
        assert_eq!(asset_suffix("macos", "aarch64"), "darwin_arm64.tar.gz");
        assert_eq!(asset_suffix("freebsd", "riscv64"), "freebsd_riscv64.tar.gz");
    }

    #[test]
    fn test_select_asset_takes_first_match() {
        let release = Release {
            tag: "v0.2.0".to_string(),
            assets: vec![
                asset("checksums.txt"),
                asset("canopy_0.2.0_darwin_arm64.tar.gz"),
                asset("canopy_0.2.0_linux_amd64.tar.gz"),
                asset("canopy-debug_0.2.0_linux_amd64.tar.gz"),
            ],
        };
        let chosen = select_asset(&release, "linux_amd64.tar.gz").unwrap();
        assert_eq!(chosen.name, "canopy_0.2.0_linux_amd64.tar.gz");
        assert!(select_asset(&release, "windows_amd64.tar.gz").is_none());
    }

    #[test]
    fn test_release_deserializes_github_payload() {
        let json = r#"{
            "tag_name": "v0.3.1",
            "name": "canopy 0.3.1",
            "assets": [
                {"name": "canopy_0.3.1_linux_amd64.tar.gz",
                 "browser_download_url": "https://example.invalid/a.tar.gz",
                 "size": 1234}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag, "v0.3.1");
        assert_eq!(release.assets[0].url, "https://example.invalid/a.tar.gz");
    }
}
