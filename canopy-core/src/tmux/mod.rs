pub mod cli;
pub mod mock;
pub mod provider;

pub use cli::CliSessionProvider;
pub use provider::SessionProvider;

use std::path::{Path, PathBuf};

/// Snapshot of one tmux session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub attached: bool,
    /// Directory the session was started in
    pub worktree_path: Option<PathBuf>,
}

/// Session name for a worktree. The shell wrapper derives the same name from the
/// directive path, so the two must stay in sync.
pub fn session_name_for(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .replace(['.', ':'], "_")
}

/// Parse `tmux list-sessions -F '#{session_name}\t#{session_attached}\t#{session_path}'`.
pub fn parse_session_list(output: &str) -> Vec<Session> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let attached = fields
                .next()
                .and_then(|count| count.trim().parse::<u32>().ok())
                .is_some_and(|count| count > 0);
            let worktree_path = fields
                .next()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from);
            Some(Session {
                name: name.to_string(),
                attached,
                worktree_path,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_for_simple() {
        assert_eq!(
            session_name_for(&PathBuf::from("/home/user/my-project")),
            "my-project"
        );
    }

    #[test]
    fn test_session_name_for_dots_and_colons_replaced() {
        assert_eq!(
            session_name_for(&PathBuf::from("/home/user/my.project:rs")),
            "my_project_rs"
        );
    }

    #[test]
    fn test_session_name_for_worktree() {
        let name = session_name_for(&PathBuf::from(
            "/home/user/Development/.canopy_worktrees/canopy--feat-awesome",
        ));
        assert_eq!(name, "canopy--feat-awesome");
    }

    #[test]
    fn test_parse_session_list() {
        let output = "api\t1\t/home/user/api\nweb\t0\t/home/user/web\n\nbare\n";
        let sessions = parse_session_list(output);
        assert_eq!(sessions.len(), 3);
        assert!(sessions[0].attached);
        assert_eq!(
            sessions[0].worktree_path.as_deref(),
            Some(Path::new("/home/user/api"))
        );
        assert!(!sessions[1].attached);
        assert_eq!(sessions[2].name, "bare");
        assert!(sessions[2].worktree_path.is_none());
    }
}
