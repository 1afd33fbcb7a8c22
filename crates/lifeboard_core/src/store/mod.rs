//! Client-side collection stores ("data hooks").
//!
//! # Responsibility
//! - Fetch and cache one user's collection of tasks, goals or journal
//!   entries.
//! - Apply mutations optimistically, then confirm them with the remote.
//! - Fold realtime inserts, updates and deletes into the cache.
//!
//! # Invariants
//! - `loading()` is `true` from mount until the first fetch resolves.
//! - Records are unique by id; realtime inserts and updates are upserts.
//! - A failed mutation notifies and returns the error; the optimistic local
//!   change stays in place until the next refetch or realtime event.
//! - Dropping a store unsubscribes it and discards in-flight fetches.

mod collection;
mod notify;
mod record;
mod remote;

pub use collection::CollectionStore;
pub use notify::{LogNotifier, Notification, NotificationLevel, NotificationLog, Notifier};
pub use record::{Record, Toggle};
pub use remote::{RemoteCollection, RemoteError, SqliteRemote};

use crate::model::goal::Goal;
use crate::model::journal::JournalEntry;
use crate::model::task::Task;
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TaskStore = CollectionStore<Task>;
pub type GoalStore = CollectionStore<Goal>;
pub type JournalStore = CollectionStore<JournalEntry>;

/// Store mutation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Local validation rejected the input; nothing was applied.
    Validation(ValidationError),
    /// No cached record has this id.
    NotFound(Uuid),
    /// Remote call failed after the optimistic local apply.
    Remote(RemoteError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not loaded: {id}"),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RemoteError> for StoreError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}
