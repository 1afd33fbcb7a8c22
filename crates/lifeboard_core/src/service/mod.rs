//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, repository calls and change publishing into
//!   use-case level APIs.
//! - Keep API and client layers decoupled from storage details.
//!
//! # Invariants
//! - Input is validated before any write.
//! - Every successful write publishes exactly one change per affected record
//!   when a feed is attached.

pub mod dependency_service;
pub mod goal_service;
pub mod journal_service;
pub mod layout_service;
pub mod profile_service;
pub mod task_service;

pub use dependency_service::DependencyService;
pub use goal_service::GoalService;
pub use journal_service::JournalService;
pub use layout_service::LayoutService;
pub use profile_service::ProfileService;
pub use task_service::{TaskService, TaskSaveOutcome};

use crate::repo::RepoError;
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for use-case operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Input violated one or more field constraints.
    Validation(ValidationError),
    /// Target record does not exist for this user.
    NotFound(Uuid),
    /// Write conflicts with existing state (duplicate, cycle).
    Conflict(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagreed.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
