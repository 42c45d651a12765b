pub mod action;
pub mod config;
pub mod constants;
pub mod control;
pub mod event;
pub mod git;
pub mod keyboard;
pub mod modal;
pub mod paths;
pub mod scripts;
pub mod shell;
pub mod state;
pub mod switch;
pub mod tmux;
pub mod update;

// Re-export commonly used types at crate root
pub use action::Action;
pub use config::Config;
pub use event::AppEvent;
pub use git::{Worktree, WorktreeProvider};
pub use keyboard::Key;
pub use state::{AppState, Modal};
pub use switch::SwitchDirective;
pub use tmux::{Session, SessionProvider};
