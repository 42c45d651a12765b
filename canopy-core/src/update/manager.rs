use super::{
    PayloadExtractor, ReleaseRepository, Version, current_asset_suffix, select_asset,
};
use crate::constants::{APP_NAME, BACKUP_SUFFIX};
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    fmt, fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

const EXECUTABLE_MODE: u32 = 0o755;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    CheckVersion,
    Download,
    Extract,
    Backup,
    Swap,
    Cleanup,
    Rollback,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckVersion => "check version",
            Self::Download => "download",
            Self::Extract => "extract",
            Self::Backup => "backup",
            Self::Swap => "swap",
            Self::Cleanup => "cleanup",
            Self::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { current: Version },
    Updated { from: Version, to: Version },
}

/// Replaces the running executable with the latest release.
///
/// Nothing on disk changes before Backup renames the executable aside. From
/// then on a failed Swap renames it back before the error surfaces, so the
/// executable path always holds a complete binary.
pub struct SelfUpdater<'a> {
    repository: &'a dyn ReleaseRepository,
    extractor: &'a dyn PayloadExtractor,
    executable: PathBuf,
    current_version: String,
    asset_suffix: String,
}

impl<'a> SelfUpdater<'a> {
    pub fn new(
        repository: &'a dyn ReleaseRepository,
        extractor: &'a dyn PayloadExtractor,
        executable: impl Into<PathBuf>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            extractor,
            executable: executable.into(),
            current_version: current_version.into(),
            asset_suffix: current_asset_suffix(),
        }
    }

    #[must_use]
    pub fn with_asset_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.asset_suffix = suffix.into();
        self
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.executable.as_os_str());
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    pub fn run(&self) -> Result<UpdateOutcome> {
        let step = UpdateStep::CheckVersion;
        log::info!("{step}: running {}", self.current_version);
        let current: Version = self
            .current_version
            .parse()
            .context("Failed to parse current version")?;
        let release = self
            .repository
            .fetch_latest()
            .context("Failed to fetch latest release")?;
        let latest: Version = release
            .tag
            .parse()
            .context("Failed to parse latest version")?;
        if latest <= current {
            log::info!("{step}: {current} is up to date (latest {latest})");
            return Ok(UpdateOutcome::UpToDate { current });
        }
        let asset = select_asset(&release, &self.asset_suffix).with_context(|| {
            format!(
                "No release asset for this platform (*{}) in {}",
                self.asset_suffix, release.tag
            )
        })?;

        let step = UpdateStep::Download;
        let staging = tempfile::Builder::new()
            .prefix(&format!("{APP_NAME}-update-"))
            .tempdir()
            .context("Failed to create temporary directory")?;
        let archive = staging.path().join(&asset.name);
        log::info!("{step}: {}", asset.url);
        self.repository
            .download(asset, &archive)
            .with_context(|| format!("{step} failed"))?;

        let step = UpdateStep::Extract;
        let unpacked = staging.path().join("payload");
        fs::create_dir(&unpacked)
            .with_context(|| format!("Failed to create {}", unpacked.display()))?;
        let payload = self
            .extractor
            .extract(&archive, &unpacked)
            .with_context(|| format!("{step} failed"))?;
        log::info!("{step}: payload at {}", payload.display());

        let step = UpdateStep::Backup;
        let backup = self.backup_path();
        fs::rename(&self.executable, &backup).with_context(|| {
            format!(
                "{step} failed: cannot move {} aside",
                self.executable.display()
            )
        })?;
        log::info!("{step}: {} -> {}", self.executable.display(), backup.display());

        if let Err(err) = self.swap(&payload) {
            return Err(self.recover_from_swap(err, &backup));
        }

        let step = UpdateStep::Cleanup;
        if let Err(err) = fs::remove_file(&backup) {
            log::warn!("{step}: could not remove {}: {err}", backup.display());
        }
        if let Err(err) = staging.close() {
            log::warn!("{step}: could not remove staging directory: {err}");
        }
        log::info!("{step}: updated {current} -> {latest}");
        Ok(UpdateOutcome::Updated {
            from: current,
            to: latest,
        })
    }

    fn swap(&self, payload: &Path) -> Result<()> {
        fs::copy(payload, &self.executable).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                payload.display(),
                self.executable.display()
            )
        })?;
        fs::set_permissions(&self.executable, fs::Permissions::from_mode(EXECUTABLE_MODE))
            .with_context(|| format!("Failed to chmod {}", self.executable.display()))?;
        log::info!("{}: installed {}", UpdateStep::Swap, self.executable.display());
        Ok(())
    }

    /// The returned error names both the swap failure and, if it also failed,
    /// the rollback.
    fn recover_from_swap(&self, swap_err: anyhow::Error, backup: &Path) -> anyhow::Error {
        let step = UpdateStep::Swap;
        log::error!("{step}: {swap_err:#}");
        match self.rollback(backup) {
            Ok(()) => swap_err.context(format!("{step} failed, previous version restored")),
            Err(rollback_err) => {
                log::error!("{}: {rollback_err:#}", UpdateStep::Rollback);
                rollback_err.context(format!(
                    "{step} failed ({swap_err:#}) and could not be undone"
                ))
            }
        }
    }

    fn rollback(&self, backup: &Path) -> Result<()> {
        let step = UpdateStep::Rollback;
        fs::rename(backup, &self.executable).with_context(|| {
            format!(
                "{step} failed: the previous version is at {}",
                backup.display()
            )
        })?;
        log::info!("{step}: restored {}", self.executable.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::mock::{MockPayloadExtractor, MockReleaseRepository};

    const SUFFIX: &str = "linux_amd64.tar.gz";

    struct Fixture {
        _dir: tempfile::TempDir,
        exe: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("canopy");
        fs::write(&exe, b"old").unwrap();
        Fixture { _dir: dir, exe }
    }

    fn repo(tag: &str) -> MockReleaseRepository {
        MockReleaseRepository::with_tag(
            tag,
            &["canopy_darwin_arm64.tar.gz", "canopy_linux_amd64.tar.gz"],
        )
    }

    fn updater<'a>(
        repo: &'a MockReleaseRepository,
        extractor: &'a MockPayloadExtractor,
        exe: &Path,
        current: &str,
    ) -> SelfUpdater<'a> {
        SelfUpdater::new(repo, extractor, exe, current).with_asset_suffix(SUFFIX)
    }

    #[test]
    fn test_same_version_with_v_prefix_is_up_to_date() {
        let f = fixture();
        let repo = repo("v0.1.0");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let outcome = updater(&repo, &extractor, &f.exe, "0.1.0").run().unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::UpToDate {
                current: "0.1.0".parse().unwrap()
            }
        );
        assert!(repo.downloaded.lock().unwrap().is_empty());
        assert_eq!(fs::read(&f.exe).unwrap(), b"old");
    }

    #[test]
    fn test_older_release_is_up_to_date() {
        let f = fixture();
        let repo = repo("v0.0.9");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let outcome = updater(&repo, &extractor, &f.exe, "0.1.0").run().unwrap();
        assert!(matches!(outcome, UpdateOutcome::UpToDate { .. }));
        assert!(repo.downloaded.lock().unwrap().is_empty());
    }

    #[test]
    fn test_newer_release_replaces_executable() {
        let f = fixture();
        let repo = repo("v0.2.0");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let updater = updater(&repo, &extractor, &f.exe, "0.1.0");
        let outcome = updater.run().unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                from: "0.1.0".parse().unwrap(),
                to: "0.2.0".parse().unwrap()
            }
        );
        assert_eq!(
            *repo.downloaded.lock().unwrap(),
            vec!["canopy_linux_amd64.tar.gz".to_string()]
        );
        assert_eq!(fs::read(&f.exe).unwrap(), b"new");
        let mode = fs::metadata(&f.exe).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(!updater.backup_path().exists());
    }

    #[test]
    fn test_swap_failure_rolls_back() {
        let f = fixture();
        let repo = repo("v0.2.0");
        let extractor = MockPayloadExtractor::missing();
        let updater = updater(&repo, &extractor, &f.exe, "0.1.0");
        let err = updater.run().unwrap_err();

        assert!(format!("{err:#}").contains("previous version restored"));
        assert_eq!(fs::read(&f.exe).unwrap(), b"old");
        assert!(!updater.backup_path().exists());
    }

    #[test]
    fn test_failed_rollback_reports_both_errors() {
        let f = fixture();
        let repo = repo("v0.2.0");
        let extractor = MockPayloadExtractor::missing();
        let updater = updater(&repo, &extractor, &f.exe, "0.1.0");
        let missing_backup = f.exe.with_file_name("gone.bak");

        let err = updater.recover_from_swap(anyhow::anyhow!("disk full"), &missing_backup);
        let message = format!("{err:#}");
        assert!(message.contains("swap failed (disk full)"), "{message}");
        assert!(message.contains("rollback failed"), "{message}");
        assert!(message.contains("gone.bak"), "{message}");
        assert!(!message.contains("previous version restored"), "{message}");
    }

    #[test]
    fn test_download_failure_leaves_executable_untouched() {
        let f = fixture();
        let repo = repo("v0.2.0");
        repo.fail_next_download("HTTP 404");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let updater = updater(&repo, &extractor, &f.exe, "0.1.0");
        let err = updater.run().unwrap_err();

        assert!(format!("{err:#}").contains("download failed"));
        assert_eq!(fs::read(&f.exe).unwrap(), b"old");
        assert!(!updater.backup_path().exists());
    }

    #[test]
    fn test_missing_platform_asset_is_an_error() {
        let f = fixture();
        let repo = MockReleaseRepository::with_tag("v0.2.0", &["canopy_windows_amd64.zip"]);
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let err = updater(&repo, &extractor, &f.exe, "0.1.0").run().unwrap_err();
        assert!(err.to_string().contains("No release asset"));
        assert_eq!(fs::read(&f.exe).unwrap(), b"old");
    }

    #[test]
    fn test_fetch_failure_and_bad_tags_surface() {
        let f = fixture();
        let repo = repo("v0.2.0");
        repo.fail_next_fetch("offline");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let err = updater(&repo, &extractor, &f.exe, "0.1.0").run().unwrap_err();
        assert!(format!("{err:#}").contains("offline"));

        let nightly = MockReleaseRepository::with_tag("nightly", &[]);
        let err = updater(&nightly, &extractor, &f.exe, "0.1.0").run().unwrap_err();
        assert!(err.to_string().contains("latest version"));
    }

    #[test]
    fn test_missing_executable_fails_at_backup() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("canopy");
        let repo = repo("v0.2.0");
        let extractor = MockPayloadExtractor::with_payload(b"new");
        let err = updater(&repo, &extractor, &exe, "0.1.0").run().unwrap_err();
        assert!(err.to_string().contains("backup failed"));
        assert!(!exe.exists());
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        let repo = repo("v0.2.0");
        let extractor = MockPayloadExtractor::missing();
        let updater = updater(&repo, &extractor, Path::new("/usr/local/bin/canopy"), "0.1.0");
        assert_eq!(
            updater.backup_path(),
            PathBuf::from("/usr/local/bin/canopy.backup")
        );
    }
}
