//! Task dependency edge.
//!
//! # Invariants
//! - `task_id != depends_on_id`.
//! - Edges of one user never form a cycle.

use crate::model::task::TaskId;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DependencyId = Uuid;

/// `task_id` cannot start before `depends_on_id` is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub id: DependencyId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub depends_on_id: TaskId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
