//! The dashboard's control plane.
//!
//! [`Controller`] turns keys, actions and background events into state changes.
//! It owns the provider handles; [`AppState`] owns everything that is rendered.
//! All provider calls are synchronous and every failure ends up in the status line
//! or inside the open modal, never as a crash.

use crate::{
    action::Action,
    constants::DIRECTIVE_DELIMITER,
    event::AppEvent,
    git::{Worktree, WorktreeProvider},
    keyboard::Key,
    modal::{
        ListCursor, ListModalConfig, ModalOutcome, SearchModalConfig, SearchPicker,
        handle_list_modal_key, handle_search_modal_key,
    },
    scripts::ScriptMap,
    state::{
        AppState, ConfirmDelete, DeleteChoice, FormFocus, Modal, NewBranchForm, ScriptList,
        SessionList, worktree_dir,
    },
    switch::SwitchDirective,
    tmux::{SessionProvider, session_name_for},
};
use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

const BRANCH_SELECT_TITLE: &str = "Create worktree from branch";

pub struct Controller {
    git: Arc<dyn WorktreeProvider>,
    tmux: Arc<dyn SessionProvider>,
}

/// Record the single switch directive of this run and stop the loop.
///
/// A second request is a logic error: the first directive is kept.
pub fn request_switch(
    state: &mut AppState,
    path: PathBuf,
    branch: String,
    auto_launch: bool,
    terminal_only: bool,
) -> Result<()> {
    if let Some(existing) = state.switch_directive() {
        log::error!(
            "switch to {} requested after a switch to {} was already recorded",
            path.display(),
            existing.path.display()
        );
        anyhow::bail!(
            "A switch to {} was already requested",
            existing.path.display()
        );
    }
    if branch.contains(DIRECTIVE_DELIMITER) {
        anyhow::bail!("Branch name '{branch}' contains '{DIRECTIVE_DELIMITER}'");
    }
    log::info!("switch requested: {} ({branch})", path.display());
    state.set_switch_directive(SwitchDirective {
        path,
        branch,
        auto_launch,
        terminal_only,
    });
    state.should_quit = true;
    Ok(())
}

/// Branch names end up in the switch directive and in directory names.
fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Branch name cannot be empty");
    }
    if name.chars().any(char::is_whitespace) {
        anyhow::bail!("Branch name cannot contain whitespace");
    }
    if name.contains(DIRECTIVE_DELIMITER) {
        anyhow::bail!("Branch name cannot contain '{DIRECTIVE_DELIMITER}'");
    }
    Ok(())
}

fn list_cursor(state: &AppState) -> Option<ListCursor> {
    match &state.modal {
        Modal::ConfirmDelete(m) => Some(m.cursor),
        Modal::SessionList(m) => Some(m.cursor),
        Modal::ScriptList(m) => Some(m.cursor),
        _ => None,
    }
}

fn list_cursor_mut(state: &mut AppState) -> Option<&mut ListCursor> {
    match &mut state.modal {
        Modal::ConfirmDelete(m) => Some(&mut m.cursor),
        Modal::SessionList(m) => Some(&mut m.cursor),
        Modal::ScriptList(m) => Some(&mut m.cursor),
        _ => None,
    }
}

fn close_modal(state: &mut AppState) {
    state.modal = Modal::None;
}

/// List-engine wiring shared by every list-based modal.
fn list_config<'a>(
    on_confirm: Box<dyn FnMut(&mut AppState) + 'a>,
    custom_keys: &'a [char],
    on_custom_key: Option<Box<dyn FnMut(&mut AppState, char) + 'a>>,
) -> ListModalConfig<'a, AppState> {
    ListModalConfig {
        current_index: |s| list_cursor(s).map_or(0, |c| c.index),
        item_count: |s| list_cursor(s).map_or(0, |c| c.len),
        increment: |s| {
            if let Some(cursor) = list_cursor_mut(s) {
                cursor.increment();
            }
        },
        decrement: |s| {
            if let Some(cursor) = list_cursor_mut(s) {
                cursor.decrement();
            }
        },
        close: close_modal,
        on_confirm,
        custom_keys,
        on_custom_key,
    }
}

impl Controller {
    pub fn new(git: Arc<dyn WorktreeProvider>, tmux: Arc<dyn SessionProvider>) -> Self {
        Self { git, tmux }
    }

    /// Re-pull worktrees, sessions and scripts. A failing source keeps its previous
    /// snapshot and reports the error.
    pub fn refresh(&self, state: &mut AppState) {
        let first_load = state.worktrees.is_empty();

        match self.git.list() {
            Ok(worktrees) => state.worktrees = worktrees,
            Err(e) => {
                log::warn!("worktree refresh failed: {e:#}");
                state.error = Some(format!("Failed to list worktrees: {e:#}"));
            }
        }
        match self.tmux.list() {
            Ok(sessions) => state.sessions = sessions,
            Err(e) => {
                log::warn!("session refresh failed: {e:#}");
                state.error = Some(format!("Failed to list tmux sessions: {e:#}"));
            }
        }
        match ScriptMap::load(state.main_worktree_path()) {
            Ok(scripts) => state.scripts = scripts,
            Err(e) => {
                log::warn!("script map load failed: {e:#}");
                state.error = Some(format!("{e:#}"));
            }
        }

        if first_load
            && let Some(idx) = state.worktrees.iter().position(|wt| wt.is_current)
        {
            state.selected = idx;
        }
        state.clamp_selection();
    }

    pub fn handle_key(&self, state: &mut AppState, key: Key) {
        state.error = None;
        state.notice = None;

        if key == Key::Interrupt {
            state.should_quit = true;
            return;
        }

        if state.modal.is_open() {
            self.handle_modal_key(state, key);
        } else if let Some(action) = Action::from_key(key) {
            self.handle_action(state, action);
        }
    }

    pub fn handle_event(&self, state: &mut AppState, event: AppEvent) {
        match event {
            AppEvent::UpdateAvailable { current, latest } => {
                state.update_notice = Some(format!(
                    "canopy {latest} is available (running {current}), run `canopy update`"
                ));
            }
            AppEvent::BackgroundError(message) => state.error = Some(message),
        }
    }

    pub fn handle_action(&self, state: &mut AppState, action: Action) {
        match action {
            Action::MoveUp => state.move_selection(-1),
            Action::MoveDown => state.move_selection(1),
            Action::Switch => Self::switch_to_selected(state, false),
            Action::SwitchTerminalOnly => Self::switch_to_selected(state, true),
            Action::NewBranch => state.modal = Modal::NewBranch(NewBranchForm::default()),
            Action::FromExistingBranch => self.open_branch_select(state),
            Action::DeleteWorktree => Self::open_confirm_delete(state),
            Action::ShowSessions => Self::open_session_list(state),
            Action::ShowScripts => Self::open_script_list(state),
            Action::Refresh => self.refresh(state),
            Action::ToggleHelp => state.modal = Modal::Help,
            Action::Quit => state.should_quit = true,
        }
    }

    fn handle_modal_key(&self, state: &mut AppState, key: Key) -> ModalOutcome {
        match &state.modal {
            Modal::None => ModalOutcome::Ignored,
            Modal::Help => {
                close_modal(state);
                ModalOutcome::Cancelled
            }
            Modal::NewBranch(_) => self.handle_new_branch_key(state, key),
            Modal::BranchSelect(picker) => {
                let items = picker.items().to_vec();
                let mut config = SearchModalConfig {
                    picker: |s: &mut AppState| match &mut s.modal {
                        Modal::BranchSelect(p) => Some(p),
                        _ => None,
                    },
                    close: close_modal,
                    on_confirm: Box::new(|s: &mut AppState, branch: &str| {
                        if let Err(e) = self.create_worktree(s, branch, true) {
                            let mut picker = SearchPicker::new(BRANCH_SELECT_TITLE, items.clone());
                            picker.error = Some(format!("{e:#}"));
                            s.modal = Modal::BranchSelect(picker);
                        }
                    }),
                };
                handle_search_modal_key(state, key, &mut config)
            }
            Modal::ConfirmDelete(_) => {
                let mut config = list_config(
                    Box::new(|s: &mut AppState| {
                        if let Modal::ConfirmDelete(confirm) = &s.modal
                            && confirm.choice() == DeleteChoice::Delete
                        {
                            let confirm = confirm.clone();
                            self.delete_worktree(s, &confirm);
                        }
                    }),
                    &['y', 'n'],
                    Some(Box::new(|s: &mut AppState, c: char| {
                        if c == 'y'
                            && let Modal::ConfirmDelete(confirm) = &s.modal
                        {
                            let confirm = confirm.clone();
                            self.delete_worktree(s, &confirm);
                        }
                        close_modal(s);
                    })),
                );
                handle_list_modal_key(state, key, &mut config)
            }
            Modal::SessionList(_) => {
                let mut config = list_config(
                    Box::new(|s: &mut AppState| {
                        if let Err(e) = Self::switch_to_session(s) {
                            s.error = Some(format!("{e:#}"));
                        }
                    }),
                    &['d'],
                    Some(Box::new(|s: &mut AppState, _: char| {
                        self.kill_selected_session(s);
                    })),
                );
                handle_list_modal_key(state, key, &mut config)
            }
            Modal::ScriptList(_) => {
                let mut config = list_config(
                    Box::new(|s: &mut AppState| {
                        if let Modal::ScriptList(list) = &s.modal
                            && let Some(name) = list.selected()
                        {
                            let name = name.to_string();
                            let worktree = list.worktree.clone();
                            self.run_script(s, &name, &worktree);
                        }
                    }),
                    &[],
                    None,
                );
                handle_list_modal_key(state, key, &mut config)
            }
        }
    }

    fn handle_new_branch_key(&self, state: &mut AppState, key: Key) -> ModalOutcome {
        let Modal::NewBranch(form) = &mut state.modal else {
            return ModalOutcome::Ignored;
        };
        match key {
            Key::Esc => {
                close_modal(state);
                return ModalOutcome::Cancelled;
            }
            Key::Tab => form.focus = form.focus.next(),
            Key::BackTab => form.focus = form.focus.prev(),
            Key::Backspace => {
                form.pop_char();
                form.focus = FormFocus::Input;
                form.error = None;
            }
            Key::Char(c) if key.is_printable() => {
                form.push_char(c);
                form.focus = FormFocus::Input;
                form.error = None;
            }
            Key::Enter if form.focus == FormFocus::Cancel => {
                close_modal(state);
                return ModalOutcome::Cancelled;
            }
            Key::Enter => {
                let name = form.name.clone();
                match self.create_worktree(state, &name, false) {
                    Ok(_) => {
                        close_modal(state);
                        return ModalOutcome::Confirmed;
                    }
                    Err(e) => {
                        if let Modal::NewBranch(form) = &mut state.modal {
                            form.error = Some(format!("{e:#}"));
                        }
                    }
                }
            }
            _ => return ModalOutcome::Ignored,
        }
        ModalOutcome::Updated
    }

    fn switch_to_selected(state: &mut AppState, terminal_only: bool) {
        let Some(worktree) = state.selected_worktree().cloned() else {
            state.error = Some("No worktree selected".to_string());
            return;
        };
        let branch = worktree.branch.unwrap_or_default();
        let auto_launch = state.auto_launch;
        if let Err(e) = request_switch(state, worktree.path, branch, auto_launch, terminal_only) {
            state.error = Some(format!("{e:#}"));
        }
    }

    fn switch_to_session(state: &mut AppState) -> Result<()> {
        let Modal::SessionList(list) = &state.modal else {
            return Ok(());
        };
        let session = list.selected().context("No session selected")?;
        let terminal_only = session.name.ends_with("-terminal");
        let worktree = state
            .worktree_for_session(session)
            .with_context(|| format!("Session '{}' has no worktree", session.name))?
            .clone();
        let auto_launch = state.auto_launch;
        request_switch(
            state,
            worktree.path,
            worktree.branch.unwrap_or_default(),
            auto_launch,
            terminal_only,
        )
    }

    fn open_branch_select(&self, state: &mut AppState) {
        let branches = match self.git.list_branches() {
            Ok(branches) => branches,
            Err(e) => {
                state.error = Some(format!("Failed to list branches: {e:#}"));
                return;
            }
        };
        let available: Vec<String> = branches
            .into_iter()
            .filter(|b| {
                !state
                    .worktrees
                    .iter()
                    .any(|wt| wt.branch.as_deref() == Some(b.as_str()))
            })
            .collect();
        if available.is_empty() {
            state.error = Some("Every local branch already has a worktree".to_string());
            return;
        }
        state.modal = Modal::BranchSelect(SearchPicker::new(BRANCH_SELECT_TITLE, available));
    }

    fn open_confirm_delete(state: &mut AppState) {
        let Some(worktree) = state.selected_worktree().cloned() else {
            state.error = Some("No worktree selected".to_string());
            return;
        };
        if worktree.is_main {
            state.error = Some("Cannot delete the main worktree".to_string());
            return;
        }
        if worktree.is_current {
            state.error = Some("Cannot delete the worktree you are in".to_string());
            return;
        }
        let sessions = state
            .repo_sessions()
            .into_iter()
            .filter(|s| state.worktree_for_session(s) == Some(&worktree))
            .map(|s| s.name)
            .collect();
        state.modal = Modal::ConfirmDelete(ConfirmDelete::new(worktree, sessions));
    }

    fn open_session_list(state: &mut AppState) {
        let sessions = state.repo_sessions();
        if sessions.is_empty() {
            state.notice = Some("No tmux sessions for this repository".to_string());
            return;
        }
        state.modal = Modal::SessionList(SessionList::new(sessions));
    }

    fn open_script_list(state: &mut AppState) {
        if state.scripts.is_empty() {
            state.error = Some("No scripts configured in canopy.json".to_string());
            return;
        }
        let Some(worktree) = state.selected_worktree().cloned() else {
            state.error = Some("No worktree selected".to_string());
            return;
        };
        state.modal = Modal::ScriptList(ScriptList::new(state.scripts.names(), worktree));
    }

    fn create_worktree(
        &self,
        state: &mut AppState,
        branch: &str,
        from_existing: bool,
    ) -> Result<PathBuf> {
        validate_branch_name(branch)?;
        let path = worktree_dir(state.main_worktree_path(), branch)?;
        let path_str = path.to_string_lossy();
        if path_str.is_empty() || path_str.contains(DIRECTIVE_DELIMITER) {
            anyhow::bail!(
                "Worktree path {} cannot contain '{DIRECTIVE_DELIMITER}'",
                path.display()
            );
        }
        ensure_parent_dir(&path)?;

        self.git
            .create(&path, branch, from_existing)
            .with_context(|| format!("Failed to create worktree for '{branch}'"))?;
        log::info!("created worktree {} for {branch}", path.display());

        self.refresh(state);
        if let Some(idx) = state.worktrees.iter().position(|wt| wt.path == path) {
            state.selected = idx;
        }
        state.notice = Some(format!("Created worktree for {branch}"));
        Ok(path)
    }

    fn delete_worktree(&self, state: &mut AppState, confirm: &ConfirmDelete) {
        let mut failures = Vec::new();
        for session in &confirm.sessions {
            if let Err(e) = self.tmux.kill(session) {
                log::warn!("failed to kill session {session}: {e:#}");
                failures.push(format!("Failed to kill session '{session}': {e:#}"));
            }
        }
        let worktree: &Worktree = &confirm.worktree;
        let removed = self.git.remove(&worktree.path);
        self.refresh(state);
        match removed {
            Ok(()) => {
                log::info!("removed worktree {}", worktree.path.display());
                state.notice = Some(format!("Deleted worktree {}", worktree.branch_label()));
            }
            Err(e) => {
                log::warn!("failed to remove worktree {}: {e:#}", worktree.path.display());
                failures.push(format!("Failed to delete worktree: {e:#}"));
            }
        }
        if !failures.is_empty() {
            state.error = Some(failures.join("; "));
        }
    }

    fn kill_selected_session(&self, state: &mut AppState) {
        let Modal::SessionList(list) = &state.modal else {
            return;
        };
        let Some(name) = list.selected().map(|s| s.name.clone()) else {
            return;
        };
        let index = list.cursor.index;
        let result = self.tmux.kill(&name);
        self.refresh(state);
        match result {
            Ok(()) => state.notice = Some(format!("Killed session {name}")),
            Err(e) => state.error = Some(format!("Failed to kill session '{name}': {e:#}")),
        }

        let mut list = SessionList::new(state.repo_sessions());
        list.cursor.index = index.min(list.cursor.len.saturating_sub(1));
        state.modal = Modal::SessionList(list);
    }

    fn run_script(&self, state: &mut AppState, name: &str, worktree: &Worktree) {
        let Some(command) = state.scripts.get(name).map(str::to_owned) else {
            state.error = Some(format!("Script '{name}' not found"));
            return;
        };
        let session = session_name_for(&worktree.path);
        let session_exists = state.sessions.iter().any(|s| s.name == session);
        let result = self.send_to_session(&session, &worktree.path, &command, session_exists);
        self.refresh(state);
        match result {
            Ok(()) => {
                log::info!("running script {name} in {session}");
                state.notice = Some(format!("Running '{name}' in session {session}"));
            }
            Err(e) => state.error = Some(format!("Failed to run '{name}': {e:#}")),
        }
    }
}

impl Controller {
    fn send_to_session(
        &self,
        session: &str,
        dir: &Path,
        command: &str,
        session_exists: bool,
    ) -> Result<()> {
        if !session_exists {
            self.tmux
                .create(session, dir)
                .with_context(|| format!("Failed to create session '{session}'"))?;
        }
        self.tmux.send_command(session, command)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
