#[cfg(not(unix))]
compile_error!("canopy depends on tmux and a POSIX shell; on Windows run it under WSL2");

mod cli;
mod logging;

use anyhow::{Context, Result};
use canopy_core::{
    config::{self, Config},
    constants::SWITCH_FILE_ENV,
    control::Controller,
    git::{CliWorktreeProvider, WorktreeProvider},
    paths,
    shell::{RcFileInstaller, ShellIntegrationInstaller, ShellKind, reexec},
    state::AppState,
    switch::HandOff,
    tmux::{CliSessionProvider, SessionProvider},
    update::{GithubReleases, TarExtractor, check},
};
use canopy_tui::{Theme, UpdateCheck};
use clap::{Args, Parser, Subcommand, error::ErrorKind};
use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

#[derive(Parser)]
#[command(
    version,
    about = "Terminal dashboard for git worktrees and their tmux sessions"
)]
struct Cli {
    /// Override path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the git repository (default: current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Don't launch the assistant in new sessions
    #[arg(long)]
    no_claude: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install, refresh or remove the shell integration
    Init(InitArgs),
    /// Replace this executable with the latest release
    Update,
    /// Print the version
    Version,
}

#[derive(Args)]
struct InitArgs {
    /// Rewrite an existing integration block
    #[arg(long, conflicts_with = "remove")]
    update: bool,
    /// Strip the integration block from the rc file
    #[arg(long)]
    remove: bool,
    /// Print the planned rc file without writing it
    #[arg(long)]
    dry_run: bool,
    /// Shell to configure: bash, zsh or fish (default: detected from $SHELL)
    #[arg(long)]
    shell: Option<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // Logging is not set up yet; fall back to plain stderr
            if let Err(print_error) = error.print() {
                eprintln!("{error}\n(failed to write usage: {print_error})");
            }
            return ExitCode::from(parse_error_code(error.kind()));
        }
    };

    if let Err(error) = logging::setup_logging(logging::level_from_env()) {
        eprintln!("Warning: logging disabled: {error:#}");
    }

    let result = run(cli);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            eprintln!("Error: {error:#}");
            ExitCode::from(1)
        }
    }
}

/// Help and version requests surface as clap errors but are successful runs.
fn parse_error_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Init(args)) => {
            let shell = match args.shell.as_deref() {
                Some(name) => name.parse()?,
                None => ShellKind::detect(std::env::var("SHELL").ok().as_deref()),
            };
            let mode = if args.remove {
                cli::InitMode::Remove
            } else if args.update {
                cli::InitMode::Update
            } else {
                cli::InitMode::Install
            };
            let installer =
                RcFileInstaller::new(shell, &paths::home_dir()?, &config.session.assistant_command);
            cli::cmd_init(&installer, mode, args.dry_run, &mut io::stdout())
        }
        Some(Commands::Update) => {
            bootstrap_shell_integration(&config);
            let repository = GithubReleases::new()?;
            let executable = std::env::current_exe().context("Cannot locate the running executable")?;
            let executable = dunce::canonicalize(&executable).unwrap_or(executable);
            cli::cmd_update(&repository, &TarExtractor, &executable, &mut io::stdout())
        }
        Some(Commands::Version) => cli::cmd_version(&mut io::stdout()),
        None => {
            bootstrap_shell_integration(&config);
            run_dashboard(&config, cli.path.as_deref(), cli.no_claude)
        }
    }
}

/// Activate the shell wrapper by re-executing through the user's shell. Returns
/// only when activation is not needed or failed; failures leave the dashboard
/// running without directory switching.
fn bootstrap_shell_integration(config: &Config) {
    if !reexec::should_bootstrap(false, |name| std::env::var(name).ok()) {
        return;
    }
    let shell_env = std::env::var("SHELL").ok();
    let error =
        try_bootstrap(config, shell_env.as_deref()).unwrap_or_else(std::convert::identity);
    log::warn!("shell integration bootstrap failed: {error:#}");
    eprintln!("Warning: could not auto-initialize shell integration: {error:#}");
    eprintln!("You can run 'canopy init' manually to set up shell integration.");
}

/// On success this never returns; the `Ok` error is the failed `exec`.
fn try_bootstrap(config: &Config, shell_env: Option<&str>) -> Result<anyhow::Error> {
    let installer = RcFileInstaller::new(
        ShellKind::detect(shell_env),
        &paths::home_dir()?,
        &config.session.assistant_command,
    );
    let argv: Vec<String> = std::env::args().collect();
    let (plan, newly_installed) = reexec::prepare(&installer, &argv, shell_env)?;
    if newly_installed {
        eprintln!(
            "✓ Installed {} integration into {}",
            installer.shell(),
            installer.rc_file().display()
        );
    }
    eprintln!("✓ Activating shell integration...");
    Ok(plan.exec())
}

fn run_dashboard(config: &Config, path: Option<&Path>, no_claude: bool) -> Result<()> {
    let start = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Cannot read the current directory")?,
    };
    let start = dunce::canonicalize(&start)
        .with_context(|| format!("Cannot open {}", start.display()))?;

    let git = CliWorktreeProvider::open(&start)?;
    let repo_path = git.repo_path().to_path_buf();
    let git: Arc<dyn WorktreeProvider> = Arc::new(git);
    let tmux: Arc<dyn SessionProvider> = Arc::new(CliSessionProvider);
    let controller = Controller::new(git, tmux);

    let mut state = AppState::new(repo_path, config.session.auto_launch && !no_claude);
    let theme = Theme::from_config(&config.theme);
    let update_check = background_update_check(config);

    let mut terminal = ratatui::init();
    let result = canopy_tui::run(&mut terminal, &mut state, &controller, &theme, update_check);
    ratatui::restore();
    result?;

    if let Some(directive) = state.take_switch_directive() {
        let switch_file = std::env::var_os(SWITCH_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        if directive.hand_off(switch_file.as_deref(), &mut io::stdout())? == HandOff::Stdout {
            log::info!("no {SWITCH_FILE_ENV}, printed switch directive");
        }
    }
    Ok(())
}

fn background_update_check(config: &Config) -> Option<UpdateCheck> {
    if !config.update.check {
        return None;
    }
    let repository = GithubReleases::new()
        .inspect_err(|e| log::warn!("update check disabled: {e:#}"))
        .ok()?;
    let cache_path = check::cache_file()
        .inspect_err(|e| log::warn!("update check disabled: {e:#}"))
        .ok()?;
    Some(UpdateCheck {
        repository: Arc::new(repository),
        cache_path,
        interval: config.update.interval(),
        current_version: cli::VERSION.to_string(),
    })
}
