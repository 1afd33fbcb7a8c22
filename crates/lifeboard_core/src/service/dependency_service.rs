//! Task dependency use-case service.
//!
//! # Invariants
//! - Both ends of an edge are tasks owned by the same user.
//! - The dependency graph of a user stays acyclic.

use crate::model::dependency::{DependencyId, TaskDependency};
use crate::model::task::TaskId;
use crate::model::{now_epoch_ms, UserId};
use crate::repo::dependency_repo::DependencyRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::DependencyInput;
use log::{info, warn};
use std::collections::{HashMap, HashSet};

pub struct DependencyService<D: DependencyRepository, T: TaskRepository> {
    dependencies: D,
    tasks: T,
}

impl<D: DependencyRepository, T: TaskRepository> DependencyService<D, T> {
    pub fn new(dependencies: D, tasks: T) -> Self {
        Self {
            dependencies,
            tasks,
        }
    }

    /// Records that `input.task_id` waits on `input.depends_on_id`.
    pub fn create_dependency(
        &self,
        user_id: UserId,
        input: DependencyInput,
    ) -> ServiceResult<TaskDependency> {
        input.validate()?;
        for id in [input.task_id, input.depends_on_id] {
            if self.tasks.get_task(user_id, id)?.is_none() {
                return Err(ServiceError::NotFound(id));
            }
        }

        let edges = self.dependencies.list_dependencies(user_id, None)?;
        if creates_cycle(&edges, input.task_id, input.depends_on_id) {
            warn!("event=dependency_create module=service status=rejected reason=cycle");
            return Err(ServiceError::Conflict(
                "dependency would create a cycle".to_string(),
            ));
        }

        let dependency = input.into_dependency(user_id, now_epoch_ms());
        self.dependencies.create_dependency(&dependency)?;
        info!("event=dependency_create module=service status=ok");
        Ok(dependency)
    }

    /// Lists the user's edges, optionally only those touching `task_id`.
    pub fn list_dependencies(
        &self,
        user_id: UserId,
        task_id: Option<TaskId>,
    ) -> ServiceResult<Vec<TaskDependency>> {
        Ok(self.dependencies.list_dependencies(user_id, task_id)?)
    }

    pub fn delete_dependency(&self, user_id: UserId, id: DependencyId) -> ServiceResult<()> {
        self.dependencies.delete_dependency(user_id, id)?;
        info!("event=dependency_delete module=service status=ok");
        Ok(())
    }

    /// Tasks that `task_id` waits on and that are still open.
    pub fn open_blockers(&self, user_id: UserId, task_id: TaskId) -> ServiceResult<Vec<TaskId>> {
        let mut blockers = Vec::new();
        for edge in self.dependencies.list_dependencies(user_id, Some(task_id))? {
            if edge.task_id != task_id {
                continue;
            }
            match self.tasks.get_task(user_id, edge.depends_on_id)? {
                Some(task) if !task.is_completed => blockers.push(task.id),
                _ => {}
            }
        }
        Ok(blockers)
    }
}

/// Returns `true` when adding `task_id -> depends_on_id` closes a cycle,
/// i.e. `depends_on_id` already reaches `task_id`.
fn creates_cycle(edges: &[TaskDependency], task_id: TaskId, depends_on_id: TaskId) -> bool {
    let mut adjacency: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.task_id)
            .or_default()
            .push(edge.depends_on_id);
    }

    let mut visited = HashSet::new();
    let mut stack = vec![depends_on_id];
    while let Some(current) = stack.pop() {
        if current == task_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = adjacency.get(&current) {
            stack.extend(next.iter().copied());
        }
    }
    false
}
