//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by list, kanban and dashboard
//!   projections.
//! - Keep completion flag and kanban status consistent.
//!
//! # Invariants
//! - `is_completed == (status == TaskStatus::Done)` after every helper call.
//! - `id` is stable and never reused for another task.
//! - Archiving hides a task from default views; it never deletes data.

use crate::model::recurrence::Recurrence;
use crate::model::{GoalId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Task urgency used for filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Priority {
    /// Stable storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Kanban column for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Work is in progress.
    InProgress,
    /// Finished. Mirrors `is_completed = true`.
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    /// Board column order, left to right.
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub notes: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
    pub goal_id: Option<GoalId>,
    pub is_completed: bool,
    pub is_archived: bool,
    /// Ordering inside the kanban column, 0-based.
    pub position: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Task {
    /// Creates an open task with a generated id and default metadata.
    pub fn new(user_id: UserId, title: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            notes: None,
            priority: Priority::default(),
            status: TaskStatus::Todo,
            due_date: None,
            category: None,
            tags: Vec::new(),
            recurrence: None,
            goal_id: None,
            is_completed: false,
            is_archived: false,
            position: 0,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Sets completion and keeps kanban status consistent.
    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
        if completed {
            self.status = TaskStatus::Done;
        } else if self.status == TaskStatus::Done {
            self.status = TaskStatus::Todo;
        }
    }

    /// Moves the task to a kanban column and syncs the completion flag.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.is_completed = status == TaskStatus::Done;
    }

    /// Flips completion state.
    pub fn toggle_completed(&mut self) {
        self.set_completed(!self.is_completed);
    }

    /// Returns `true` when the task has a due date before `today` and is open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Builds the next occurrence of a recurring task.
    ///
    /// Returns `None` when the task does not recur, has no due date, or the
    /// next date falls after the recurrence end.
    pub fn next_occurrence(&self, now_ms: i64) -> Option<Task> {
        let recurrence = self.recurrence.as_ref()?;
        let due = self.due_date?;
        let next_due = recurrence.next_after(due)?;

        let mut next = self.clone();
        next.id = Uuid::new_v4();
        next.due_date = Some(next_due);
        next.set_completed(false);
        next.status = TaskStatus::Todo;
        next.is_archived = false;
        next.created_at = now_ms;
        next.updated_at = now_ms;
        Some(next)
    }
}
