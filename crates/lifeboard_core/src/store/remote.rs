use crate::model::goal::Goal;
use crate::model::journal::JournalEntry;
use crate::model::task::Task;
use crate::model::UserId;
use crate::realtime::ChangeFeed;
use crate::repo::goal_repo::SqliteGoalRepository;
use crate::repo::journal_repo::{JournalListQuery, SqliteJournalRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery};
use crate::service::{GoalService, JournalService, ServiceError, TaskService};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Remote failure surfaced to the caller as a message string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for RemoteError {}

impl From<ServiceError> for RemoteError {
    fn from(value: ServiceError) -> Self {
        Self::new(value.to_string())
    }
}

/// Backing store a `CollectionStore` confirms its mutations with.
pub trait RemoteCollection<T> {
    /// Full collection of `user_id`, in display order.
    fn fetch_all(&self, user_id: UserId) -> Result<Vec<T>, RemoteError>;
    /// Persists a new record and returns the canonical copy.
    fn insert(&self, record: &T) -> Result<T, RemoteError>;
    /// Persists an existing record and returns the canonical copy.
    fn update(&self, record: &T) -> Result<T, RemoteError>;
    fn delete(&self, user_id: UserId, id: Uuid) -> Result<(), RemoteError>;
}

/// Remote backed by the local SQLite services.
///
/// Writes go through the services, so an attached feed sees them as
/// realtime events too.
pub struct SqliteRemote<T> {
    conn: Rc<Connection>,
    feed: Option<ChangeFeed<T>>,
}

impl<T: 'static> SqliteRemote<T> {
    pub fn new(conn: Rc<Connection>) -> Self {
        Self { conn, feed: None }
    }

    pub fn with_feed(mut self, feed: ChangeFeed<T>) -> Self {
        self.feed = Some(feed);
        self
    }
}

impl SqliteRemote<Task> {
    fn service(&self) -> TaskService<SqliteTaskRepository<'_>> {
        let service = TaskService::new(SqliteTaskRepository::new(&self.conn));
        match &self.feed {
            Some(feed) => service.with_feed(feed.clone()),
            None => service,
        }
    }
}

impl RemoteCollection<Task> for SqliteRemote<Task> {
    fn fetch_all(&self, user_id: UserId) -> Result<Vec<Task>, RemoteError> {
        let query = TaskListQuery {
            include_archived: true,
            ..TaskListQuery::default()
        };
        Ok(self.service().list_tasks(user_id, &query)?)
    }

    fn insert(&self, record: &Task) -> Result<Task, RemoteError> {
        Ok(self.service().insert_task(record)?)
    }

    fn update(&self, record: &Task) -> Result<Task, RemoteError> {
        Ok(self.service().save_task(record)?.task)
    }

    fn delete(&self, user_id: UserId, id: Uuid) -> Result<(), RemoteError> {
        Ok(self.service().delete_task(user_id, id)?)
    }
}

impl SqliteRemote<Goal> {
    fn service(&self) -> GoalService<SqliteGoalRepository<'_>> {
        let service = GoalService::new(SqliteGoalRepository::new(&self.conn));
        match &self.feed {
            Some(feed) => service.with_feed(feed.clone()),
            None => service,
        }
    }
}

impl RemoteCollection<Goal> for SqliteRemote<Goal> {
    fn fetch_all(&self, user_id: UserId) -> Result<Vec<Goal>, RemoteError> {
        Ok(self.service().list_goals(user_id, true)?)
    }

    fn insert(&self, record: &Goal) -> Result<Goal, RemoteError> {
        Ok(self.service().insert_goal(record)?)
    }

    fn update(&self, record: &Goal) -> Result<Goal, RemoteError> {
        Ok(self.service().save_goal(record)?)
    }

    fn delete(&self, user_id: UserId, id: Uuid) -> Result<(), RemoteError> {
        Ok(self.service().delete_goal(user_id, id)?)
    }
}

impl SqliteRemote<JournalEntry> {
    fn service(&self) -> JournalService<SqliteJournalRepository<'_>> {
        let service = JournalService::new(SqliteJournalRepository::new(&self.conn));
        match &self.feed {
            Some(feed) => service.with_feed(feed.clone()),
            None => service,
        }
    }
}

impl RemoteCollection<JournalEntry> for SqliteRemote<JournalEntry> {
    fn fetch_all(&self, user_id: UserId) -> Result<Vec<JournalEntry>, RemoteError> {
        Ok(self
            .service()
            .list_entries(user_id, &JournalListQuery::default())?)
    }

    fn insert(&self, record: &JournalEntry) -> Result<JournalEntry, RemoteError> {
        Ok(self.service().insert_entry(record)?)
    }

    fn update(&self, record: &JournalEntry) -> Result<JournalEntry, RemoteError> {
        Ok(self.service().save_entry(record)?)
    }

    fn delete(&self, user_id: UserId, id: Uuid) -> Result<(), RemoteError> {
        Ok(self.service().delete_entry(user_id, id)?)
    }
}
