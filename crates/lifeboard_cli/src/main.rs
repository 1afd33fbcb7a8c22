//! Local operator CLI.
//!
//! # Responsibility
//! - Probe `lifeboard_core` linkage and configuration.
//! - Inspect a user's data without the HTTP layer.

use clap::{Parser, Subcommand, ValueEnum};
use lifeboard_core::auth::{user_id_for_email, SessionStore};
use lifeboard_core::config::default_config_path;
use lifeboard_core::dashboard::summarize;
use lifeboard_core::layout::parse_stored_layout;
use lifeboard_core::logging::init_logging_from_config;
use lifeboard_core::model::{now_epoch_ms, today_utc};
use lifeboard_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery};
use lifeboard_core::repo::goal_repo::SqliteGoalRepository;
use lifeboard_core::service::{GoalService, TaskService};
use lifeboard_core::tasks::{StatusFilter, TaskView};
use lifeboard_core::{default_layout, load_config, merge_layout, open_db, AppConfig, UserId};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "lifeboard", author, version, about, long_about = None)]
struct Cli {
    /// Config file; defaults to the per-user config directory
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage info
    Ping,
    /// Print the effective configuration
    Config,
    /// Merge a stored layout JSON file onto the default widgets
    MergeLayout {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List a user's tasks
    ListTasks {
        #[arg(value_name = "EMAIL")]
        email: String,
        #[arg(short, long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        /// Case-insensitive text search over title, notes and tags
        #[arg(short = 'q', long)]
        search: Option<String>,
        #[arg(long)]
        include_archived: bool,
    },
    /// Print dashboard statistics for a user
    Summary {
        #[arg(value_name = "EMAIL")]
        email: String,
    },
    /// Delete expired sessions
    PurgeSessions,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Completed,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Completed => StatusFilter::Completed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    match cli.command {
        Commands::Ping => {
            println!("lifeboard_core ping={}", lifeboard_core::ping());
            println!("lifeboard_core version={}", lifeboard_core::core_version());
            Ok(())
        }
        Commands::MergeLayout { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let merged = merge_layout(&parse_stored_layout(&raw), &default_layout());
            println!("{}", serde_json::to_string_pretty(&merged)?);
            Ok(())
        }
        command => {
            let config = load_config(&cli.config.unwrap_or_else(default_config_path))?;
            run_with_config(&config, command)
        }
    }
}

fn run_with_config(config: &AppConfig, command: Commands) -> CliResult {
    if let Commands::Config = command {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    init_logging_from_config(config)?;
    let conn = open_db(config.database_path())?;
    info!("event=cli_command module=cli status=start");

    match command {
        Commands::ListTasks {
            email,
            status,
            search,
            include_archived,
        } => {
            let user_id = resolve_user(&conn, &email)?;
            let query = TaskListQuery {
                include_archived,
                ..TaskListQuery::default()
            };
            let tasks = TaskService::new(SqliteTaskRepository::new(&conn)).list_tasks(user_id, &query)?;

            let mut view = TaskView::new();
            view.set_status(status.into());
            view.set_search(search);
            view.set_include_archived(include_archived);
            for task in view.apply(&tasks, today_utc()) {
                let due = task
                    .due_date
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let mark = if task.is_completed { "x" } else { " " };
                println!(
                    "[{mark}] {}  {:<8} {:<10} {}",
                    task.id,
                    task.priority.as_str(),
                    due,
                    task.title
                );
            }
            Ok(())
        }
        Commands::Summary { email } => {
            let user_id = resolve_user(&conn, &email)?;
            let tasks = TaskService::new(SqliteTaskRepository::new(&conn))
                .list_tasks(user_id, &TaskListQuery::default())?;
            let goals = GoalService::new(SqliteGoalRepository::new(&conn)).list_goals(user_id, false)?;
            let summary = summarize(&tasks, &goals, today_utc());
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::PurgeSessions => {
            let removed = SessionStore::new(&conn).purge_expired(now_epoch_ms())?;
            println!("removed {removed} expired session(s)");
            Ok(())
        }
        Commands::Ping | Commands::Config | Commands::MergeLayout { .. } => Ok(()),
    }
}

fn resolve_user(conn: &Connection, email: &str) -> Result<UserId, Box<dyn Error>> {
    user_id_for_email(conn, email)?.ok_or_else(|| format!("no user with email `{email}`").into())
}
