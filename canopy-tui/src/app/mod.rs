mod spawn;

pub use spawn::UpdateCheck;

use crate::{
    components::{self, list_modal},
    keymap,
    theme::Theme,
};
use canopy_core::{
    control::Controller,
    event::AppEvent,
    state::{AppState, Modal},
};
use crossterm::event;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
};
use std::{sync::mpsc, time::Duration};

const POLL_INTERVAL: Duration = Duration::from_millis(80);

/// Handle for dispatching background work
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSender {
    /// Send an event from a background thread to the main loop
    pub fn send(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }
}

/// Run the dashboard until the user quits or picks a worktree to switch to.
/// The switch directive, if any, is left in `state` for the caller.
pub fn run(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    controller: &Controller,
    theme: &Theme,
    update_check: Option<UpdateCheck>,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<AppEvent>();
    let event_sender = EventSender { tx };

    controller.refresh(state);
    if let Some(check) = update_check {
        spawn::spawn_update_check(check, &event_sender);
    }

    while !state.should_quit {
        terminal.draw(|f| draw(f, state, theme))?;

        // Check background channel (non-blocking)
        if let Ok(app_event) = rx.try_recv() {
            controller.handle_event(state, app_event);
            continue;
        }

        // Poll with a timeout so background events are picked up between keys
        if event::poll(POLL_INTERVAL)?
            && let Some(key) = keymap::key_from_event(&event::read()?)
        {
            controller.handle_key(state, key);
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, state: &AppState, theme: &Theme) {
    let (main_area, status_area) = if components::status_bar::status_line(state, theme).is_some()
    {
        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(f.area());
        (chunks[0], Some(chunks[1]))
    } else {
        (f.area(), None)
    };

    components::worktree_list::draw(f, main_area, state, theme);

    match &state.modal {
        Modal::None => {}
        Modal::BranchSelect(picker) => components::search_modal::draw(f, picker, "Create", theme),
        Modal::NewBranch(form) => components::new_branch::draw(f, form, theme),
        Modal::ConfirmDelete(confirm) => {
            list_modal::draw(f, list_modal::confirm_delete_view(confirm, theme), theme);
        }
        Modal::SessionList(list) => {
            list_modal::draw(f, list_modal::session_list_view(list, theme), theme);
        }
        Modal::ScriptList(list) => {
            list_modal::draw(f, list_modal::script_list_view(list, theme), theme);
        }
        Modal::Help => components::help::draw(f, theme),
    }

    if let Some(area) = status_area {
        components::status_bar::draw(f, area, state, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{
        git::{Worktree, mock::MockWorktreeProvider},
        keyboard::Key,
        tmux::{Session, mock::MockSessionProvider},
        update::mock::MockReleaseRepository,
    };
    use ratatui::{Terminal, backend::TestBackend};
    use std::{path::Path, sync::Arc};

    fn worktree(path: &Path, branch: &str, is_main: bool) -> Worktree {
        Worktree {
            path: path.to_path_buf(),
            branch: Some(branch.to_string()),
            is_main,
            is_current: is_main,
        }
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        controller: Controller,
        state: AppState,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("app");
        std::fs::create_dir_all(&main).unwrap();
        std::fs::write(
            main.join("canopy.json"),
            r#"{"scripts": {"test": "cargo test"}}"#,
        )
        .unwrap();
        let dev = tmp.path().join(".canopy_worktrees").join("app--dev");
        let mut git = MockWorktreeProvider::with_worktrees(vec![
            worktree(&main, "main", true),
            worktree(&dev, "dev", false),
        ]);
        git.branches = vec![
            "main".into(),
            "dev".into(),
            "feature/test".into(),
            "hotfix".into(),
        ];
        let tmux = MockSessionProvider::with_sessions(vec![Session {
            name: "app--dev".to_string(),
            attached: true,
            worktree_path: Some(dev),
        }]);
        let controller = Controller::new(Arc::new(git), Arc::new(tmux));
        let mut state = AppState::new(main, true);
        controller.refresh(&mut state);
        Fixture {
            _tmp: tmp,
            controller,
            state,
        }
    }

    fn render(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| draw(f, state, &Theme::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_main_view_lists_worktrees_and_sessions() {
        let f = fixture();
        let screen = render(&f.state);
        assert!(screen.contains("2 worktrees"));
        assert!(screen.contains("main"));
        assert!(screen.contains("(main)"));
        assert!(screen.contains("[app--dev attached]"));
    }

    #[test]
    fn test_branch_select_modal_renders_filtered_items() {
        let mut f = fixture();
        f.controller.handle_key(&mut f.state, Key::Char('a'));
        for c in "feat".chars() {
            f.controller.handle_key(&mut f.state, Key::Char(c));
        }
        let screen = render(&f.state);
        assert!(screen.contains("1 of 2"));
        assert!(screen.contains("feature/test"));
        assert!(screen.contains("[ Create ]"));
    }

    #[test]
    fn test_each_modal_renders() {
        let mut f = fixture();
        for key in ['n', 's', 'x', '?'] {
            f.controller.handle_key(&mut f.state, Key::Char(key));
            assert!(f.state.modal.is_open(), "modal {key} did not open");
            let screen = render(&f.state);
            assert!(f.state.error.is_none(), "{screen}");
            f.controller.handle_key(&mut f.state, Key::Esc);
            assert!(!f.state.modal.is_open(), "modal {key} did not close");
        }
        assert!(!f.state.should_quit);
    }

    #[test]
    fn test_confirm_delete_renders_choices() {
        let mut f = fixture();
        f.controller.handle_key(&mut f.state, Key::Down);
        f.controller.handle_key(&mut f.state, Key::Char('d'));
        let screen = render(&f.state);
        assert!(screen.contains("Confirm delete"));
        assert!(screen.contains("Also kills tmux sessions: app--dev"));
    }

    #[test]
    fn test_status_line_shows_error() {
        let mut f = fixture();
        f.state.error = Some("tmux not found".to_string());
        let screen = render(&f.state);
        assert!(screen.contains("Error: tmux not found"));
    }

    #[test]
    fn test_update_check_thread_reports_newer_release() {
        let tmp = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let sender = EventSender { tx };
        let check = UpdateCheck {
            repository: Arc::new(MockReleaseRepository::with_tag("v9.0.0", &[])),
            cache_path: tmp.path().join("version_check.json"),
            interval: Duration::from_secs(600),
            current_version: "0.1.0".to_string(),
        };
        spawn::spawn_update_check(check, &sender).join().unwrap();

        let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(
            event,
            AppEvent::UpdateAvailable {
                current: "0.1.0".to_string(),
                latest: "9.0.0".to_string(),
            }
        );

        let mut f = fixture();
        f.controller.handle_event(&mut f.state, event);
        assert!(render(&f.state).contains("9.0.0 is available"));
    }

    #[test]
    fn test_update_check_failure_becomes_background_error() {
        let tmp = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let repository = MockReleaseRepository::with_tag("v9.0.0", &[]);
        repository.fail_next_fetch("offline");
        let check = UpdateCheck {
            repository: Arc::new(repository),
            cache_path: tmp.path().join("version_check.json"),
            interval: Duration::from_secs(600),
            current_version: "0.1.0".to_string(),
        };
        spawn::spawn_update_check(check, &EventSender { tx })
            .join()
            .unwrap();
        let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(event, AppEvent::BackgroundError(msg) if msg.contains("offline")));
    }
}
