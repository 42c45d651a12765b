use super::{Session, provider::SessionProvider};
use anyhow::Result;
use std::{path::Path, sync::Mutex};

#[derive(Default)]
pub struct MockSessionProvider {
    pub sessions: Mutex<Vec<Session>>,
    pub list_result: Mutex<Option<Result<()>>>,
    pub create_result: Mutex<Option<Result<()>>>,
    pub kill_result: Mutex<Option<Result<()>>>,
    pub send_result: Mutex<Option<Result<()>>>,
    pub created_sessions: Mutex<Vec<String>>,
    pub killed_sessions: Mutex<Vec<String>>,
    pub sent_commands: Mutex<Vec<(String, String)>>,
}

impl MockSessionProvider {
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            ..Self::default()
        }
    }

    pub fn fail_next_list(&self, message: &str) {
        *self.list_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn fail_next_kill(&self, message: &str) {
        *self.kill_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn fail_next_send(&self, message: &str) {
        *self.send_result.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
    }
}

impl SessionProvider for MockSessionProvider {
    fn list(&self) -> Result<Vec<Session>> {
        self.list_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        Ok(self.sessions.lock().unwrap().clone())
    }

    fn create(&self, name: &str, working_dir: &Path) -> Result<()> {
        self.created_sessions.lock().unwrap().push(name.to_string());
        self.create_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        self.sessions.lock().unwrap().push(Session {
            name: name.to_string(),
            attached: false,
            worktree_path: Some(working_dir.to_path_buf()),
        });
        Ok(())
    }

    fn attach(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn kill(&self, name: &str) -> Result<()> {
        self.killed_sessions.lock().unwrap().push(name.to_string());
        self.kill_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        self.sessions.lock().unwrap().retain(|s| s.name != name);
        Ok(())
    }

    fn send_command(&self, name: &str, command: &str) -> Result<()> {
        self.sent_commands
            .lock()
            .unwrap()
            .push((name.to_string(), command.to_string()));
        self.send_result.lock().unwrap().take().unwrap_or(Ok(()))?;
        Ok(())
    }
}
