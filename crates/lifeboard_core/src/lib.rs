//! Core domain logic for Lifeboard.
//! This crate is the single source of truth for business invariants.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod layout;
pub mod logging;
pub mod model;
pub mod realtime;
pub mod repo;
pub mod runtime;
pub mod service;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod ui_state;
pub mod validation;

pub use config::{load_config, AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use layout::{default_layout, merge_layout, LayoutEditor, LayoutError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::goal::{Goal, GoalStatus, Milestone};
pub use model::journal::{JournalEntry, Mood};
pub use model::task::{Priority, Task, TaskStatus};
pub use model::widget::{StoredWidget, WidgetDefinition, WidgetLayout};
pub use model::UserId;
pub use realtime::{ChangeEvent, ChangeFeed, Subscription};
pub use repo::{RepoError, RepoResult};
pub use runtime::{Debouncer, EventLoop};
pub use service::{ServiceError, ServiceResult};
pub use store::{GoalStore, JournalStore, StoreError, TaskStore};
pub use tasks::TaskView;
pub use validation::ValidationError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
