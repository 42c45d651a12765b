use super::EventSender;
use canopy_core::{
    event::AppEvent,
    update::{ReleaseRepository, check_for_update},
};
use std::{
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, SystemTime},
};

/// Inputs for the background release check.
pub struct UpdateCheck {
    pub repository: Arc<dyn ReleaseRepository>,
    pub cache_path: PathBuf,
    pub interval: Duration,
    pub current_version: String,
}

/// Ask for the latest release off the main thread. A newer release becomes the
/// update notice and a failure lands in the status line.
pub(super) fn spawn_update_check(
    check: UpdateCheck,
    sender: &EventSender,
) -> thread::JoinHandle<()> {
    let sender = sender.clone();
    thread::spawn(move || {
        match check_for_update(
            check.repository.as_ref(),
            &check.cache_path,
            check.interval,
            &check.current_version,
            SystemTime::now(),
        ) {
            Ok(Some(latest)) => {
                log::info!("release {latest} is available");
                sender.send(AppEvent::UpdateAvailable {
                    current: check.current_version,
                    latest: latest.to_string(),
                });
            }
            Ok(None) => log::debug!("no newer release"),
            Err(e) => {
                log::warn!("update check failed: {e:#}");
                sender.send(AppEvent::BackgroundError(format!(
                    "Update check failed: {e:#}"
                )));
            }
        }
    })
}
