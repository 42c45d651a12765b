/// Events that arrive asynchronously from background tasks.
/// These get merged into the main event loop alongside keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A newer release than the running binary was published
    UpdateAvailable { current: String, latest: String },

    /// A background task failed; shown in the status line
    BackgroundError(String),
}
