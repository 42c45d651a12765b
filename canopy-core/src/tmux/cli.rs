use super::{Session, parse_session_list, provider::SessionProvider};
use anyhow::{Context, Result};
use std::{
    path::Path,
    process::{Command, Output},
};

const LIST_FORMAT: &str = "#{session_name}\t#{session_attached}\t#{session_path}";

pub struct CliSessionProvider;

impl CliSessionProvider {
    fn is_inside_tmux() -> bool {
        std::env::var("TMUX").is_ok()
    }
}

impl SessionProvider for CliSessionProvider {
    fn list(&self) -> Result<Vec<Session>> {
        let output = Command::new("tmux")
            .args(["list-sessions", "-F", LIST_FORMAT])
            .output()
            .context("failed to run tmux")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // No server simply means no sessions yet
            if stderr.contains("no server running") || stderr.contains("error connecting") {
                return Ok(Vec::new());
            }
            anyhow::bail!("tmux list-sessions failed: {}", stderr.trim());
        }

        Ok(parse_session_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn create(&self, name: &str, working_dir: &Path) -> Result<()> {
        run_tmux(&["new-session", "-ds", name, "-c", &working_dir.to_string_lossy()])
            .context("tmux new-session failed")?;
        Ok(())
    }

    fn attach(&self, name: &str) -> Result<()> {
        let subcommand = if Self::is_inside_tmux() {
            "switch-client"
        } else {
            "attach-session"
        };
        let status = Command::new("tmux")
            .args([subcommand, "-t", name])
            .status()
            .context("failed to run tmux")?;
        if !status.success() {
            anyhow::bail!("tmux {subcommand} -t {name} exited with {status}");
        }
        Ok(())
    }

    fn kill(&self, name: &str) -> Result<()> {
        run_tmux(&["kill-session", "-t", name]).context("tmux kill-session failed")?;
        Ok(())
    }

    fn send_command(&self, name: &str, command: &str) -> Result<()> {
        run_tmux(&["send-keys", "-t", name, command, "Enter"])
            .context("tmux send-keys failed")?;
        Ok(())
    }
}

fn run_tmux(args: &[&str]) -> Result<Output> {
    let output = Command::new("tmux")
        .args(args)
        .output()
        .context("failed to run tmux")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{}", stderr.trim());
    }

    Ok(output)
}
