use crate::{
    constants::{WORKTREE_DIR_DEDUP_MAX_ATTEMPTS, WORKTREE_DIR_NAME, WORKTREE_NAME_SEPARATOR},
    git::Worktree,
    modal::{ListCursor, SearchPicker},
    scripts::ScriptMap,
    switch::SwitchDirective,
    tmux::{Session, session_name_for},
};
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

/// The active modal. Each variant owns its payload, so a closed modal has no
/// focus, search buffer or selection lying around.
#[derive(Debug, Clone, Default)]
pub enum Modal {
    #[default]
    None,
    /// Pick an existing branch to check out into a new worktree
    BranchSelect(SearchPicker),
    NewBranch(NewBranchForm),
    ConfirmDelete(ConfirmDelete),
    SessionList(SessionList),
    ScriptList(ScriptList),
    Help,
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    Input,
    Create,
    Cancel,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            FormFocus::Input => FormFocus::Create,
            FormFocus::Create => FormFocus::Cancel,
            FormFocus::Cancel => FormFocus::Input,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormFocus::Input => FormFocus::Cancel,
            FormFocus::Create => FormFocus::Input,
            FormFocus::Cancel => FormFocus::Create,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewBranchForm {
    pub name: String,
    pub focus: FormFocus,
    pub error: Option<String>,
}

impl NewBranchForm {
    pub fn push_char(&mut self, c: char) {
        self.name.push(c);
    }

    pub fn pop_char(&mut self) {
        if let Some((idx, _)) = self.name.grapheme_indices(true).next_back() {
            self.name.truncate(idx);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Delete,
    Cancel,
}

impl DeleteChoice {
    pub const ALL: [DeleteChoice; 2] = [DeleteChoice::Delete, DeleteChoice::Cancel];

    pub fn label(self) -> &'static str {
        match self {
            DeleteChoice::Delete => "Delete",
            DeleteChoice::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmDelete {
    pub worktree: Worktree,
    /// Sessions killed along with the worktree
    pub sessions: Vec<String>,
    pub cursor: ListCursor,
}

impl ConfirmDelete {
    pub fn new(worktree: Worktree, sessions: Vec<String>) -> Self {
        // Start on Cancel so a stray Enter never deletes
        let cursor = ListCursor {
            index: 1,
            len: DeleteChoice::ALL.len(),
        };
        Self {
            worktree,
            sessions,
            cursor,
        }
    }

    pub fn choice(&self) -> DeleteChoice {
        DeleteChoice::ALL[self.cursor.index.min(DeleteChoice::ALL.len() - 1)]
    }
}

#[derive(Debug, Clone)]
pub struct SessionList {
    pub sessions: Vec<Session>,
    pub cursor: ListCursor,
}

impl SessionList {
    pub fn new(sessions: Vec<Session>) -> Self {
        let cursor = ListCursor::new(sessions.len());
        Self { sessions, cursor }
    }

    pub fn selected(&self) -> Option<&Session> {
        self.sessions.get(self.cursor.index)
    }
}

#[derive(Debug, Clone)]
pub struct ScriptList {
    pub names: Vec<String>,
    /// Worktree the script runs in
    pub worktree: Worktree,
    pub cursor: ListCursor,
}

impl ScriptList {
    pub fn new(names: Vec<String>, worktree: Worktree) -> Self {
        let cursor = ListCursor::new(names.len());
        Self {
            names,
            worktree,
            cursor,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.names.get(self.cursor.index).map(String::as_str)
    }
}

/// Central application state. Components read from this, the controller modifies it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub repo_path: PathBuf,
    pub worktrees: Vec<Worktree>,
    pub sessions: Vec<Session>,
    pub scripts: ScriptMap,
    pub selected: usize,
    pub modal: Modal,
    /// Launch the assistant in sessions created by a switch
    pub auto_launch: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Advisory "new release" text from the background check
    pub update_notice: Option<String>,
    pub should_quit: bool,
    switch: Option<SwitchDirective>,
}

impl AppState {
    pub fn new(repo_path: PathBuf, auto_launch: bool) -> Self {
        Self {
            repo_path,
            worktrees: Vec::new(),
            sessions: Vec::new(),
            scripts: ScriptMap::default(),
            selected: 0,
            modal: Modal::None,
            auto_launch,
            error: None,
            notice: None,
            update_notice: None,
            should_quit: false,
            switch: None,
        }
    }

    /// Path of the main checkout; new worktrees are placed next to it.
    pub fn main_worktree_path(&self) -> &Path {
        self.worktrees
            .iter()
            .find(|wt| wt.is_main)
            .map_or(self.repo_path.as_path(), |wt| wt.path.as_path())
    }

    pub fn selected_worktree(&self) -> Option<&Worktree> {
        self.worktrees.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.worktrees.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.worktrees.len() - 1;
        let magnitude = delta.unsigned_abs() as usize;
        self.selected = if delta < 0 {
            self.selected.saturating_sub(magnitude)
        } else {
            self.selected.saturating_add(magnitude).min(max)
        };
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.worktrees.len().saturating_sub(1));
    }

    /// The live session backing a worktree, if any.
    pub fn session_for(&self, worktree: &Worktree) -> Option<&Session> {
        let name = session_name_for(&worktree.path);
        self.sessions.iter().find(|s| {
            s.name == name || s.worktree_path.as_deref() == Some(worktree.path.as_path())
        })
    }

    /// Sessions belonging to this repository's worktrees, in worktree order.
    pub fn repo_sessions(&self) -> Vec<Session> {
        let mut sessions = Vec::new();
        for worktree in &self.worktrees {
            let name = session_name_for(&worktree.path);
            for session in &self.sessions {
                let belongs = session.name == name
                    || session.name == format!("{name}-terminal")
                    || session.worktree_path.as_deref() == Some(worktree.path.as_path());
                if belongs && !sessions.iter().any(|s: &Session| s.name == session.name) {
                    sessions.push(session.clone());
                }
            }
        }
        sessions
    }

    /// The worktree a session was opened in.
    pub fn worktree_for_session(&self, session: &Session) -> Option<&Worktree> {
        self.worktrees.iter().find(|wt| {
            session.worktree_path.as_deref() == Some(wt.path.as_path()) || {
                let name = session_name_for(&wt.path);
                session.name == name || session.name == format!("{name}-terminal")
            }
        })
    }

    pub fn switch_directive(&self) -> Option<&SwitchDirective> {
        self.switch.as_ref()
    }

    pub(crate) fn set_switch_directive(&mut self, directive: SwitchDirective) {
        self.switch = Some(directive);
    }

    /// Hand the directive to the caller; a second take yields `None`.
    pub fn take_switch_directive(&mut self) -> Option<SwitchDirective> {
        self.switch.take()
    }
}

/// Worktrees are placed in `.canopy_worktrees/` inside the repo's parent directory:
/// ```text
/// ~/Development/.canopy_worktrees/canopy--feat-awesome/
/// ~/Development/.canopy_worktrees/scooter--fix-bug/
/// ```
pub fn worktree_dir(repo_path: &Path, branch: &str) -> anyhow::Result<PathBuf> {
    let parent = repo_path.parent().unwrap_or(repo_path);
    let repo_name = repo_path
        .file_name()
        .map_or_else(|| "repo".into(), |n| n.to_string_lossy());
    let worktree_root = parent.join(WORKTREE_DIR_NAME);
    let safe_branch = branch.replace('/', "-");
    let base = format!("{repo_name}{WORKTREE_NAME_SEPARATOR}{safe_branch}");
    let candidate = worktree_root.join(&base);
    if !candidate.exists() {
        return Ok(candidate);
    }
    for i in 2..WORKTREE_DIR_DEDUP_MAX_ATTEMPTS {
        let candidate = worktree_root.join(format!("{base}-{i}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    anyhow::bail!(
        "Could not find an available worktree directory name after {WORKTREE_DIR_DEDUP_MAX_ATTEMPTS} attempts"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn worktree(path: &str, branch: &str) -> Worktree {
        Worktree {
            path: PathBuf::from(path),
            branch: Some(branch.to_string()),
            is_main: false,
            is_current: false,
        }
    }

    fn session(name: &str, path: Option<&str>) -> Session {
        Session {
            name: name.to_string(),
            attached: false,
            worktree_path: path.map(PathBuf::from),
        }
    }

    #[test]
    fn test_worktree_dir_basic() {
        let tmp = tempdir().unwrap();
        let result = worktree_dir(&tmp.path().join("myrepo"), "main").unwrap();
        assert_eq!(
            result,
            tmp.path()
                .join(WORKTREE_DIR_NAME)
                .join(format!("myrepo{WORKTREE_NAME_SEPARATOR}main"))
        );
    }

    #[test]
    fn test_worktree_dir_slash_in_branch() {
        let tmp = tempdir().unwrap();
        let result = worktree_dir(&tmp.path().join("repo"), "feat/awesome").unwrap();
        assert_eq!(
            result,
            tmp.path()
                .join(WORKTREE_DIR_NAME)
                .join(format!("repo{WORKTREE_NAME_SEPARATOR}feat-awesome"))
        );
    }

    #[test]
    fn test_worktree_dir_dedup() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join(WORKTREE_DIR_NAME);
        fs::create_dir_all(root.join(format!("repo{WORKTREE_NAME_SEPARATOR}main"))).unwrap();
        fs::create_dir_all(root.join(format!("repo{WORKTREE_NAME_SEPARATOR}main-2"))).unwrap();
        let result = worktree_dir(&tmp.path().join("repo"), "main").unwrap();
        assert_eq!(
            result,
            root.join(format!("repo{WORKTREE_NAME_SEPARATOR}main-3"))
        );
    }

    #[test]
    fn test_worktree_dir_bounded_error() {
        let tmp = tempdir().unwrap();
        let wt_root = tmp.path().join(WORKTREE_DIR_NAME);
        let base = format!("repo{WORKTREE_NAME_SEPARATOR}main");
        fs::create_dir_all(wt_root.join(&base)).unwrap();
        for i in 2..WORKTREE_DIR_DEDUP_MAX_ATTEMPTS {
            fs::create_dir_all(wt_root.join(format!("{base}-{i}"))).unwrap();
        }
        let err = worktree_dir(&tmp.path().join("repo"), "main").unwrap_err();
        assert!(
            err.to_string()
                .contains(&format!("{WORKTREE_DIR_DEDUP_MAX_ATTEMPTS} attempts"))
        );
    }

    #[test]
    fn test_move_selection_saturates() {
        let mut state = AppState::new(PathBuf::from("/repo"), true);
        state.worktrees = vec![worktree("/repo", "main"), worktree("/wt", "dev")];
        state.move_selection(-1);
        assert_eq!(state.selected, 0);
        state.move_selection(5);
        assert_eq!(state.selected, 1);
        state.worktrees.clear();
        state.move_selection(1);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_repo_sessions_matches_by_name_and_path() {
        let mut state = AppState::new(PathBuf::from("/src/app"), true);
        state.worktrees = vec![
            worktree("/src/app", "main"),
            worktree("/src/.canopy_worktrees/app--dev", "dev"),
        ];
        state.sessions = vec![
            session("unrelated", Some("/elsewhere")),
            session("app--dev-terminal", None),
            session("app", None),
            session("custom", Some("/src/.canopy_worktrees/app--dev")),
        ];

        let names: Vec<_> = state.repo_sessions().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["app", "app--dev-terminal", "custom"]);

        let wt = state.worktree_for_session(&state.sessions[1]).unwrap();
        assert_eq!(wt.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_session_for_prefers_live_session_of_worktree() {
        let mut state = AppState::new(PathBuf::from("/src/app"), true);
        let main = worktree("/src/app", "main");
        let dev = worktree("/src/.canopy_worktrees/app--dev", "dev");
        let orphan = worktree("/src/.canopy_worktrees/app--old", "old");
        state.sessions = vec![
            session("app", None),
            session("custom", Some("/src/.canopy_worktrees/app--dev")),
        ];

        assert_eq!(state.session_for(&main).unwrap().name, "app");
        assert_eq!(state.session_for(&dev).unwrap().name, "custom");
        assert!(state.session_for(&orphan).is_none());
    }

    #[test]
    fn test_switch_directive_taken_once() {
        let mut state = AppState::new(PathBuf::from("/repo"), true);
        state.set_switch_directive(SwitchDirective {
            path: PathBuf::from("/repo"),
            branch: "main".into(),
            auto_launch: true,
            terminal_only: false,
        });
        assert!(state.take_switch_directive().is_some());
        assert!(state.take_switch_directive().is_none());
    }

    #[test]
    fn test_confirm_delete_starts_on_cancel() {
        let confirm = ConfirmDelete::new(worktree("/wt", "dev"), Vec::new());
        assert_eq!(confirm.choice(), DeleteChoice::Cancel);
    }

    #[test]
    fn test_form_focus_cycles() {
        let focus = FormFocus::Input;
        assert_eq!(focus.next().next().next(), FormFocus::Input);
        assert_eq!(focus.prev(), FormFocus::Cancel);
    }
}
