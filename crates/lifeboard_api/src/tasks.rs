//! Task and dependency endpoints.

use crate::api::{Api, RequestContext};
use crate::response::{ApiResponse, CREATED, OK};
use lifeboard_core::model::dependency::{DependencyId, TaskDependency};
use lifeboard_core::model::task::TaskId;
use lifeboard_core::repo::task_repo::TaskListQuery;
use lifeboard_core::validation::{DependencyInput, TaskInput};
use lifeboard_core::{Task, TaskStatus};
use serde::Serialize;

/// Saved task plus the follow-up a recurring completion created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskChange {
    pub task: Task,
    pub next_occurrence: Option<Task>,
}

impl Api {
    pub fn list_tasks(&self, ctx: &RequestContext, query: &TaskListQuery) -> ApiResponse<Vec<Task>> {
        self.handle("list_tasks", ctx, OK, |user_id| {
            Ok(self.tasks().list_tasks(user_id, query)?)
        })
    }

    pub fn get_task(&self, ctx: &RequestContext, id: TaskId) -> ApiResponse<Task> {
        self.handle("get_task", ctx, OK, |user_id| {
            Ok(self.tasks().get_task(user_id, id)?)
        })
    }

    pub fn create_task(&self, ctx: &RequestContext, input: TaskInput) -> ApiResponse<Task> {
        self.handle("create_task", ctx, CREATED, |user_id| {
            Ok(self.tasks().create_task(user_id, input)?)
        })
    }

    pub fn update_task(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        input: TaskInput,
    ) -> ApiResponse<TaskChange> {
        self.handle("update_task", ctx, OK, |user_id| {
            let outcome = self.tasks().update_task(user_id, id, input)?;
            Ok(TaskChange {
                task: outcome.task,
                next_occurrence: outcome.next_occurrence,
            })
        })
    }

    pub fn toggle_task(&self, ctx: &RequestContext, id: TaskId) -> ApiResponse<TaskChange> {
        self.handle("toggle_task", ctx, OK, |user_id| {
            let outcome = self.tasks().toggle_task(user_id, id)?;
            Ok(TaskChange {
                task: outcome.task,
                next_occurrence: outcome.next_occurrence,
            })
        })
    }

    pub fn archive_task(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        archived: bool,
    ) -> ApiResponse<Task> {
        self.handle("archive_task", ctx, OK, |user_id| {
            Ok(self.tasks().set_archived(user_id, id, archived)?.task)
        })
    }

    /// Kanban card move; returns every renumbered task.
    pub fn move_task(
        &self,
        ctx: &RequestContext,
        id: TaskId,
        to_status: TaskStatus,
        to_index: usize,
    ) -> ApiResponse<Vec<Task>> {
        self.handle("move_task", ctx, OK, |user_id| {
            Ok(self.tasks().move_task(user_id, id, to_status, to_index)?)
        })
    }

    pub fn delete_task(&self, ctx: &RequestContext, id: TaskId) -> ApiResponse<TaskId> {
        self.handle("delete_task", ctx, OK, |user_id| {
            self.tasks().delete_task(user_id, id)?;
            Ok(id)
        })
    }

    pub fn list_dependencies(
        &self,
        ctx: &RequestContext,
        task_id: Option<TaskId>,
    ) -> ApiResponse<Vec<TaskDependency>> {
        self.handle("list_dependencies", ctx, OK, |user_id| {
            Ok(self.dependencies().list_dependencies(user_id, task_id)?)
        })
    }

    pub fn create_dependency(
        &self,
        ctx: &RequestContext,
        input: DependencyInput,
    ) -> ApiResponse<TaskDependency> {
        self.handle("create_dependency", ctx, CREATED, |user_id| {
            Ok(self.dependencies().create_dependency(user_id, input)?)
        })
    }

    pub fn delete_dependency(
        &self,
        ctx: &RequestContext,
        id: DependencyId,
    ) -> ApiResponse<DependencyId> {
        self.handle("delete_dependency", ctx, OK, |user_id| {
            self.dependencies().delete_dependency(user_id, id)?;
            Ok(id)
        })
    }

    /// Open tasks that `id` still waits on.
    pub fn task_blockers(&self, ctx: &RequestContext, id: TaskId) -> ApiResponse<Vec<TaskId>> {
        self.handle("task_blockers", ctx, OK, |user_id| {
            self.tasks().get_task(user_id, id)?;
            Ok(self.dependencies().open_blockers(user_id, id)?)
        })
    }
}
