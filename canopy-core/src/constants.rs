pub const APP_NAME: &str = "canopy";

/// Set by the shell wrapper; names the file the switch directive is written to.
pub const SWITCH_FILE_ENV: &str = "CANOPY_SWITCH_FILE";
/// Guards against re-entering the shell bootstrap after a re-exec.
pub const INIT_ATTEMPTED_ENV: &str = "CANOPY_INIT_ATTEMPTED";
pub const LOG_LEVEL_ENV: &str = "CANOPY_LOG";

pub const WORKTREE_DIR_NAME: &str = ".canopy_worktrees";
pub const WORKTREE_NAME_SEPARATOR: &str = "--";
pub const WORKTREE_DIR_DEDUP_MAX_ATTEMPTS: usize = 1000;

pub const SCRIPTS_FILE_NAME: &str = "canopy.json";

pub const DIRECTIVE_DELIMITER: char = '|';

pub const BACKUP_SUFFIX: &str = ".backup";
pub const RELEASE_OWNER: &str = "canopy-dev";
pub const RELEASE_REPO: &str = "canopy";

pub const DEFAULT_ASSISTANT_COMMAND: &str = "claude";
pub const DEFAULT_UPDATE_CHECK_INTERVAL_MINUTES: u64 = 10;
