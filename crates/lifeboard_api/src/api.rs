//! Request handler facade.
//!
//! # Responsibility
//! - Resolve the caller from the session token before any user-scoped work.
//! - Build services over the shared connection and change feeds.
//! - Map every outcome to an `ApiResponse` with a stable status.
//!
//! # Invariants
//! - Handlers never panic; every failure becomes an error envelope.
//! - Unauthenticated calls to user-scoped endpoints return 401 without
//!   touching storage.

use crate::response::{ApiFailure, ApiResponse, ApiResult, OK};
use lifeboard_core::assistant::{ChatCompletion, StubAssistant};
use lifeboard_core::auth::{ensure_user, RouteDecision, RouteGuard, SessionStore};
use lifeboard_core::config::AppConfig;
use lifeboard_core::db::{open_db, DbError};
use lifeboard_core::layout::default_layout;
use lifeboard_core::model::now_epoch_ms;
use lifeboard_core::model::widget::WidgetDefinition;
use lifeboard_core::repo::dependency_repo::SqliteDependencyRepository;
use lifeboard_core::repo::goal_repo::SqliteGoalRepository;
use lifeboard_core::repo::journal_repo::SqliteJournalRepository;
use lifeboard_core::repo::layout_repo::SqliteLayoutRepository;
use lifeboard_core::repo::profile_repo::SqliteProfileRepository;
use lifeboard_core::repo::task_repo::SqliteTaskRepository;
use lifeboard_core::runtime::EventLoop;
use lifeboard_core::service::{
    DependencyService, GoalService, JournalService, LayoutService, ProfileService, TaskService,
};
use lifeboard_core::storage::FileStore;
use lifeboard_core::{ChangeFeed, Goal, JournalEntry, Task, UserId};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::rc::Rc;

const DEFAULT_SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Per-request caller identity as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }
}

/// Session handed back after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: i64,
}

/// Handler set over one database connection.
pub struct Api {
    conn: Rc<Connection>,
    event_loop: Rc<EventLoop>,
    task_feed: ChangeFeed<Task>,
    goal_feed: ChangeFeed<Goal>,
    journal_feed: ChangeFeed<JournalEntry>,
    pub(crate) files: FileStore,
    pub(crate) assistant: Box<dyn ChatCompletion>,
    guard: RouteGuard,
    session_ttl_ms: i64,
    defaults: Vec<WidgetDefinition>,
    clock: Box<dyn Fn() -> i64>,
}

impl Api {
    pub fn new(conn: Connection, files: FileStore) -> Self {
        let event_loop = Rc::new(EventLoop::new());
        Self {
            conn: Rc::new(conn),
            task_feed: ChangeFeed::new(Rc::clone(&event_loop)),
            goal_feed: ChangeFeed::new(Rc::clone(&event_loop)),
            journal_feed: ChangeFeed::new(Rc::clone(&event_loop)),
            event_loop,
            files,
            assistant: Box::new(StubAssistant),
            guard: RouteGuard::default(),
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
            defaults: default_layout(),
            clock: Box::new(now_epoch_ms),
        }
    }

    /// Opens the configured database and applies config-driven settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        let conn = open_db(config.database_path())?;
        let mut api = Self::new(conn, config.file_store());
        api.guard = config.route_guard();
        api.session_ttl_ms = config.session_ttl_ms();
        Ok(api)
    }

    pub fn with_assistant(mut self, assistant: Box<dyn ChatCompletion>) -> Self {
        self.assistant = assistant;
        self
    }

    pub fn with_guard(mut self, guard: RouteGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_session_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.session_ttl_ms = ttl_ms;
        self
    }

    /// Replaces the wall clock used for session expiry.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn connection(&self) -> Rc<Connection> {
        Rc::clone(&self.conn)
    }

    pub fn event_loop(&self) -> Rc<EventLoop> {
        Rc::clone(&self.event_loop)
    }

    pub fn task_feed(&self) -> ChangeFeed<Task> {
        self.task_feed.clone()
    }

    pub fn goal_feed(&self) -> ChangeFeed<Goal> {
        self.goal_feed.clone()
    }

    pub fn journal_feed(&self) -> ChangeFeed<JournalEntry> {
        self.journal_feed.clone()
    }

    /// Opens a session for a user the identity provider already verified.
    pub fn sign_in(&self, user_id: UserId, email: &str) -> ApiResponse<SessionInfo> {
        let result = (|| -> ApiResult<SessionInfo> {
            if email.trim().is_empty() {
                return Err(ApiFailure::bad_request("email", "is required"));
            }
            ensure_user(&self.conn, user_id, email)?;
            let session = SessionStore::new(&self.conn).create_session(
                user_id,
                self.session_ttl_ms,
                (self.clock)(),
            )?;
            Ok(SessionInfo {
                token: session.token,
                user_id: session.user_id,
                expires_at: session.expires_at,
            })
        })();
        respond("sign_in", OK, result)
    }

    /// Revokes the caller's session. Unknown tokens are not an error.
    pub fn sign_out(&self, ctx: &RequestContext) -> ApiResponse<bool> {
        let result = match ctx.session_token.as_deref() {
            Some(token) => SessionStore::new(&self.conn)
                .revoke(token)
                .map_err(ApiFailure::from),
            None => Err(ApiFailure::unauthorized()),
        };
        respond("sign_out", OK, result)
    }

    /// Route decision for `path` given the raw session cookie.
    pub fn guard(&self, path: &str, session_token: Option<&str>) -> RouteDecision {
        let has_session = match session_token {
            Some(token) => match SessionStore::new(&self.conn).resolve(token, (self.clock)()) {
                Ok(session) => session.is_some(),
                Err(err) => {
                    warn!("event=route_guard module=api status=error error={err}");
                    false
                }
            },
            None => false,
        };
        self.guard.decide(path, has_session)
    }

    /// Resolves the caller or fails with 401.
    pub(crate) fn authorize(&self, ctx: &RequestContext) -> ApiResult<UserId> {
        let Some(token) = ctx.session_token.as_deref() else {
            return Err(ApiFailure::unauthorized());
        };
        match SessionStore::new(&self.conn).resolve(token, (self.clock)())? {
            Some(session) => Ok(session.user_id),
            None => Err(ApiFailure::unauthorized()),
        }
    }

    /// Authorizes, runs `handler` and wraps the outcome.
    pub(crate) fn handle<T>(
        &self,
        endpoint: &'static str,
        ctx: &RequestContext,
        success_status: u16,
        handler: impl FnOnce(UserId) -> ApiResult<T>,
    ) -> ApiResponse<T> {
        let result = self.authorize(ctx).and_then(handler);
        respond(endpoint, success_status, result)
    }

    pub(crate) fn tasks(&self) -> TaskService<SqliteTaskRepository<'_>> {
        TaskService::new(SqliteTaskRepository::new(&self.conn)).with_feed(self.task_feed.clone())
    }

    pub(crate) fn goals(&self) -> GoalService<SqliteGoalRepository<'_>> {
        GoalService::new(SqliteGoalRepository::new(&self.conn)).with_feed(self.goal_feed.clone())
    }

    pub(crate) fn journal(&self) -> JournalService<SqliteJournalRepository<'_>> {
        JournalService::new(SqliteJournalRepository::new(&self.conn))
            .with_feed(self.journal_feed.clone())
    }

    pub(crate) fn dependencies(
        &self,
    ) -> DependencyService<SqliteDependencyRepository<'_>, SqliteTaskRepository<'_>> {
        DependencyService::new(
            SqliteDependencyRepository::new(&self.conn),
            SqliteTaskRepository::new(&self.conn),
        )
    }

    pub(crate) fn layouts(&self) -> LayoutService<SqliteLayoutRepository<'_>> {
        LayoutService::new(SqliteLayoutRepository::new(&self.conn), self.defaults.clone())
    }

    pub(crate) fn profiles(&self) -> ProfileService<SqliteProfileRepository<'_>> {
        ProfileService::new(SqliteProfileRepository::new(&self.conn))
    }
}

fn respond<T>(endpoint: &'static str, success_status: u16, result: ApiResult<T>) -> ApiResponse<T> {
    match result {
        Ok(data) => {
            info!("event=api_request module=api status=ok endpoint={endpoint} code={success_status}");
            if success_status == OK {
                ApiResponse::ok(data)
            } else {
                ApiResponse::created(data)
            }
        }
        Err(failure) => {
            warn!(
                "event=api_request module=api status=error endpoint={endpoint} code={}",
                failure.status
            );
            ApiResponse::from(failure)
        }
    }
}
