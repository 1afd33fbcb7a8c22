//! Task use-case service.
//!
//! # Responsibility
//! - Provide validated create/update/toggle/archive/delete entry points.
//! - Spawn the next occurrence when a recurring task gets completed.
//! - Apply kanban card moves as persisted status/position changes.
//!
//! # Invariants
//! - Records are always written scoped by their own `user_id`.
//! - A task only links to a goal owned by the same user.
//! - A kanban move persists every renumbered card or none of them.
//! - A recurring task spawns at most one follow-up per open-to-done
//!   transition.

use crate::model::now_epoch_ms;
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::model::UserId;
use crate::realtime::{ChangeEvent, ChangeFeed};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::tasks::kanban::KanbanBoard;
use crate::validation::TaskInput;
use log::{info, warn};

/// Result of persisting an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSaveOutcome {
    /// Canonical stored copy of the saved task.
    pub task: Task,
    /// Follow-up created because a recurring task was completed.
    pub next_occurrence: Option<Task>,
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    feed: Option<ChangeFeed<Task>>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    /// Publishes every successful write to `feed`.
    pub fn with_feed(mut self, feed: ChangeFeed<Task>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Validates form input and creates a task owned by `user_id`.
    pub fn create_task(&self, user_id: UserId, input: TaskInput) -> ServiceResult<Task> {
        input.validate()?;
        let task = input.into_task(user_id, now_epoch_ms());
        self.insert_task(&task)
    }

    /// Persists an already-built task, keeping its id.
    pub fn insert_task(&self, task: &Task) -> ServiceResult<Task> {
        TaskInput::from(task).validate()?;
        self.ensure_goal(task)?;
        let id = self.repo.create_task(task)?;
        let stored = self.read_back(task.user_id, id, "created task not found in read-back")?;
        info!("event=task_create module=service status=ok");
        self.publish(stored.user_id, ChangeEvent::Insert(stored.clone()));
        Ok(stored)
    }

    pub fn get_task(&self, user_id: UserId, id: TaskId) -> ServiceResult<Task> {
        self.repo
            .get_task(user_id, id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.list_tasks(user_id, query)?)
    }

    /// Replaces the editable fields of one task from form input.
    pub fn update_task(
        &self,
        user_id: UserId,
        id: TaskId,
        input: TaskInput,
    ) -> ServiceResult<TaskSaveOutcome> {
        input.validate()?;
        let mut task = self.get_task(user_id, id)?;
        input.apply_to(&mut task, now_epoch_ms());
        self.save_task(&task)
    }

    /// Persists the full record of an existing task.
    pub fn save_task(&self, task: &Task) -> ServiceResult<TaskSaveOutcome> {
        TaskInput::from(task).validate()?;
        let previous = self.get_task(task.user_id, task.id)?;
        self.ensure_goal(task)?;

        self.repo.update_task(task)?;
        self.finish_update(&previous, "updated task not found in read-back")
    }

    /// Flips completion of one task.
    pub fn toggle_task(&self, user_id: UserId, id: TaskId) -> ServiceResult<TaskSaveOutcome> {
        let mut task = self.get_task(user_id, id)?;
        task.toggle_completed();
        task.updated_at = now_epoch_ms();
        self.save_task(&task)
    }

    /// Hides or restores a task without deleting it.
    pub fn set_archived(
        &self,
        user_id: UserId,
        id: TaskId,
        archived: bool,
    ) -> ServiceResult<TaskSaveOutcome> {
        let mut task = self.get_task(user_id, id)?;
        task.is_archived = archived;
        task.updated_at = now_epoch_ms();
        self.save_task(&task)
    }

    /// Moves a kanban card and persists every renumbered task.
    ///
    /// Returns the tasks whose status or position changed.
    pub fn move_task(
        &self,
        user_id: UserId,
        id: TaskId,
        to_status: TaskStatus,
        to_index: usize,
    ) -> ServiceResult<Vec<Task>> {
        let tasks = self.repo.list_tasks(user_id, &TaskListQuery::default())?;
        let mut board = KanbanBoard::from_tasks(&tasks);
        let moves = board
            .move_card(id, to_status, to_index)
            .map_err(|_| ServiceError::NotFound(id))?;

        let now_ms = now_epoch_ms();
        let mut previous = Vec::with_capacity(moves.len());
        let mut updated = Vec::with_capacity(moves.len());
        for card in moves {
            let Some(before) = tasks.iter().find(|task| task.id == card.task_id) else {
                continue;
            };
            let mut task = before.clone();
            task.set_status(card.status);
            task.position = card.position;
            task.updated_at = now_ms;
            TaskInput::from(&task).validate()?;
            previous.push(before);
            updated.push(task);
        }
        self.repo.update_tasks(&updated)?;

        let mut changed = Vec::with_capacity(updated.len());
        for before in previous {
            changed.push(self.finish_update(before, "moved task not found in read-back")?.task);
        }
        info!(
            "event=task_move module=service status=ok to_status={} changed={}",
            to_status.as_str(),
            changed.len()
        );
        Ok(changed)
    }

    /// Hard-deletes one task.
    pub fn delete_task(&self, user_id: UserId, id: TaskId) -> ServiceResult<()> {
        self.repo.delete_task(user_id, id)?;
        info!("event=task_delete module=service status=ok");
        self.publish(user_id, ChangeEvent::Delete(id));
        Ok(())
    }

    fn spawn_next_occurrence(&self, completed: &Task) -> ServiceResult<Option<Task>> {
        let Some(next) = completed.next_occurrence(now_epoch_ms()) else {
            return Ok(None);
        };
        let id = self.repo.create_task(&next)?;
        let stored = self.read_back(next.user_id, id, "next occurrence not found in read-back")?;
        info!(
            "event=task_recur module=service status=ok frequency={}",
            completed
                .recurrence
                .as_ref()
                .map(|rule| rule.frequency.as_str())
                .unwrap_or("none")
        );
        self.publish(stored.user_id, ChangeEvent::Insert(stored.clone()));
        Ok(Some(stored))
    }

    /// Reads back a committed update, publishes it and spawns a follow-up
    /// when it completed a recurring task.
    fn finish_update(&self, previous: &Task, details: &'static str) -> ServiceResult<TaskSaveOutcome> {
        let stored = self.read_back(previous.user_id, previous.id, details)?;
        self.publish(stored.user_id, ChangeEvent::Update(stored.clone()));

        let next_occurrence = if !previous.is_completed && stored.is_completed {
            self.spawn_next_occurrence(&stored)?
        } else {
            None
        };

        Ok(TaskSaveOutcome {
            task: stored,
            next_occurrence,
        })
    }

    fn ensure_goal(&self, task: &Task) -> ServiceResult<()> {
        match task.goal_id {
            Some(goal_id) if !self.repo.goal_exists(task.user_id, goal_id)? => {
                warn!("event=task_goal_check module=service status=not_found");
                Err(ServiceError::NotFound(goal_id))
            }
            _ => Ok(()),
        }
    }

    fn read_back(&self, user_id: UserId, id: TaskId, details: &'static str) -> ServiceResult<Task> {
        self.repo
            .get_task(user_id, id)?
            .ok_or(ServiceError::InconsistentState(details))
    }

    fn publish(&self, user_id: UserId, event: ChangeEvent<Task>) {
        if let Some(feed) = &self.feed {
            feed.publish(user_id, event);
        }
    }
}
