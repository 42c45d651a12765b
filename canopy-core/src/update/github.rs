use super::{Asset, Release, ReleaseRepository};
use crate::constants::{APP_NAME, RELEASE_OWNER, RELEASE_REPO};
use anyhow::{Context, Result};
use reqwest::{blocking::Client, header::ACCEPT};
use std::{fs::File, path::Path, time::Duration};

const API_BASE: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GithubReleases {
    client: Client,
    latest_url: String,
}

impl GithubReleases {
    pub fn new() -> Result<Self> {
        Self::for_repo(RELEASE_OWNER, RELEASE_REPO)
    }

    pub fn for_repo(owner: &str, repo: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            latest_url: format!("{API_BASE}/repos/{owner}/{repo}/releases/latest"),
        })
    }
}

impl ReleaseRepository for GithubReleases {
    fn fetch_latest(&self) -> Result<Release> {
        log::debug!("GET {}", self.latest_url);
        let response = self
            .client
            .get(&self.latest_url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .with_context(|| format!("Failed to reach {}", self.latest_url))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GitHub API returned status {status}");
        }
        response
            .json()
            .context("Failed to parse latest release metadata")
    }

    fn download(&self, asset: &Asset, dest: &Path) -> Result<()> {
        log::debug!("downloading {} to {}", asset.url, dest.display());
        let mut response = self
            .client
            .get(&asset.url)
            .send()
            .with_context(|| format!("Failed to download {}", asset.name))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Download of {} failed with status {status}", asset.name);
        }
        let mut file =
            File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
        let bytes = response
            .copy_to(&mut file)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        log::info!("downloaded {} ({bytes} bytes)", asset.name);
        Ok(())
    }
}
