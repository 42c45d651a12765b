use super::Session;
use anyhow::Result;
use std::path::Path;

pub trait SessionProvider: Send + Sync {
    fn list(&self) -> Result<Vec<Session>>;
    fn create(&self, name: &str, working_dir: &Path) -> Result<()>;
    /// Hand the terminal over to `name`; returns once the client detaches.
    fn attach(&self, name: &str) -> Result<()>;
    fn kill(&self, name: &str) -> Result<()>;
    fn send_command(&self, name: &str, command: &str) -> Result<()>;
}
