use super::{Asset, PayloadExtractor, Release, ReleaseRepository};
use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

pub struct MockReleaseRepository {
    pub release: Mutex<Release>,
    pub fetch_result: Mutex<Option<Result<()>>>,
    pub download_result: Mutex<Option<Result<()>>>,
    pub fetch_count: Mutex<usize>,
    pub downloaded: Mutex<Vec<String>>,
}

impl MockReleaseRepository {
    pub fn with_tag(tag: &str, asset_names: &[&str]) -> Self {
        let assets = asset_names
            .iter()
            .map(|name| Asset {
                name: (*name).to_string(),
                url: format!("https://example.invalid/{name}"),
            })
            .collect();
        Self {
            release: Mutex::new(Release {
                tag: tag.to_string(),
                assets,
            }),
            fetch_result: Mutex::new(None),
            download_result: Mutex::new(None),
            fetch_count: Mutex::new(0),
            downloaded: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next_fetch(&self, message: &str) {
        *self.fetch_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn fail_next_download(&self, message: &str) {
        *self.download_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }
}

impl ReleaseRepository for MockReleaseRepository {
    fn fetch_latest(&self) -> Result<Release> {
        *self.fetch_count.lock().unwrap() += 1;
        self.fetch_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        Ok(self.release.lock().unwrap().clone())
    }

    fn download(&self, asset: &Asset, dest: &Path) -> Result<()> {
        self.downloaded.lock().unwrap().push(asset.name.clone());
        self.download_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        fs::write(dest, b"archive")?;
        Ok(())
    }
}

/// Writes a fixed payload instead of unpacking anything. `missing()` reports a
/// payload path that does not exist, so the copy during Swap fails.
pub struct MockPayloadExtractor {
    pub payload: Option<Vec<u8>>,
}

impl MockPayloadExtractor {
    pub fn with_payload(bytes: &[u8]) -> Self {
        Self {
            payload: Some(bytes.to_vec()),
        }
    }

    pub fn missing() -> Self {
        Self { payload: None }
    }
}

impl PayloadExtractor for MockPayloadExtractor {
    fn extract(&self, _archive: &Path, staging: &Path) -> Result<PathBuf> {
        let path = staging.join("canopy");
        if let Some(bytes) = &self.payload {
            fs::write(&path, bytes)?;
        }
        Ok(path)
    }
}
