//! tmux-worktree - parallel AI tasks in isolated git worktrees

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tmux_worktree::cleanup::{self, Console};
use tmux_worktree::config::Config;
use tmux_worktree::create::{self, AllocationLock};
use tmux_worktree::git::{self, FALLBACK_DEFAULT_BRANCH, Git, Vcs};
use tmux_worktree::naming::DEFAULT_BASE_DIR;
use tmux_worktree::tmux::{self, SessionManager};
use tmux_worktree::{classify, list, paths, setup, sidecar};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Parallel AI tasks in isolated git worktrees and tmux windows
#[derive(Parser)]
#[command(name = "tmux-worktree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a branch and worktree for a task
    Create {
        /// Free-form task description
        task: String,
        /// Directory worktrees are created in
        #[arg(default_value = DEFAULT_BASE_DIR)]
        base_dir: String,
    },
    /// Write the task record and start an AI agent in a tmux window
    Setup {
        /// Worktree to start the agent in
        path: PathBuf,
        /// Task name, used for the window name
        task: String,
        /// Optional configured tool name followed by the prompt
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        rest: Vec<String>,
        /// Branch the worktree was forked from
        #[arg(long, env = "TMUX_WORKTREE_PARENT_BRANCH")]
        parent_branch: Option<String>,
        /// Repository default branch
        #[arg(long, env = "TMUX_WORKTREE_MAIN_BRANCH", default_value = FALLBACK_DEFAULT_BRANCH)]
        main_branch: String,
    },
    /// Show every worktree with its change count and task status
    List,
    /// Interactively remove merged or abandoned worktrees
    Cleanup,
    /// Print the configured AI tools as JSON
    QueryConfig,
}

fn init_logging() {
    // Set DEBUG=0-3 to control verbosity (0=off, 1=warn, 2=info, 3=debug)
    let debug_level = std::env::var("DEBUG")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);
    let rust_log = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();

    if debug_level == 0 && !rust_log {
        return;
    }

    let level = match debug_level {
        0 | 1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let log_path = paths::log_path();
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file = log_path
        .file_name()
        .map_or_else(|| "tmux-worktree.log".into(), ToOwned::to_owned);
    let file_appender = tracing_appender::rolling::never(dir, file);

    tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Let --help and --version exit normally
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                e.exit();
            }
            // For actual errors, show error + help
            eprintln!("error: {e}");
            if let Err(help_err) = Cli::command().print_help() {
                eprintln!("error: failed to print help: {help_err}");
            }
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command) {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Create { task, base_dir } => cmd_create(&task, &base_dir),
        Commands::Setup {
            path,
            task,
            rest,
            parent_branch,
            main_branch,
        } => cmd_setup(
            &path,
            &task,
            &rest,
            parent_branch.as_deref(),
            &main_branch,
        ),
        Commands::List => cmd_list(),
        Commands::Cleanup => cmd_cleanup(),
        Commands::QueryConfig => cmd_query_config(),
    }
}

/// Seed the config file, warning instead of failing
fn seed_config() {
    if let Err(e) = Config::ensure() {
        eprintln!("Warning: Failed to create config file: {e:#}");
    }
}

/// Working directory, checked to be inside a git repository
fn repository_cwd() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    if !git::is_git_repository(&cwd) {
        bail!("Not in a git repository");
    }
    Ok(cwd)
}

fn cmd_create(task: &str, base_dir: &str) -> Result<()> {
    seed_config();
    let cwd = repository_cwd()?;

    let _lock = AllocationLock::acquire(&git::common_dir(&cwd)?)?;
    let request = create::Request {
        task,
        base_dir,
        workdir: &cwd,
        now: chrono::Local::now().naive_local(),
    };
    let created = create::create_worktree(&Git::new(&cwd), &request)?;

    println!("{created}");
    Ok(())
}

fn cmd_setup(
    path: &Path,
    task: &str,
    rest: &[String],
    parent_branch: Option<&str>,
    main_branch: &str,
) -> Result<()> {
    let config = Config::load()?;
    // Argument errors are reported before the environment is checked
    setup::resolve_args(rest, &config)?;
    if !tmux::is_available() {
        bail!("tmux not installed");
    }

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let request = setup::Request {
        path,
        task,
        rest,
        parent_branch,
        main_branch,
        inside_tmux: tmux::inside_tmux(),
        timestamp: &timestamp,
        settle: setup::SHELL_SETTLE,
    };
    let launched = setup::run(&config, &SessionManager::new(), &request)?;

    println!("{launched}");
    Ok(())
}

fn cmd_list() -> Result<()> {
    seed_config();
    let cwd = repository_cwd()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    list::render(&Git::new(&cwd), &mut out)?;
    out.flush()?;
    Ok(())
}

fn cmd_cleanup() -> Result<()> {
    seed_config();
    let cwd = repository_cwd()?;
    let git = Git::new(&cwd);

    let default_branch = git.default_branch();
    let worktrees = git.list_worktrees()?;
    let classified =
        classify::classify_worktrees(&git, &worktrees, &default_branch, sidecar::parent_branch);
    let candidates = classify::candidates(classified);

    let mut console = Console {
        input: io::stdin().lock(),
        out: io::stdout().lock(),
        err: io::stderr().lock(),
    };
    let summary = cleanup::run(&git, &candidates, &default_branch, &mut console)?;
    if !summary.is_empty() {
        writeln!(console.out, "{summary}")?;
    }
    tracing::info!(?summary, "Cleanup finished");
    Ok(())
}

fn cmd_query_config() -> Result<()> {
    let config = Config::load()?;
    let info = config.tools_info();
    println!(
        "{}",
        serde_json::to_string_pretty(&info).context("Failed to serialize tool listing")?
    );
    Ok(())
}
