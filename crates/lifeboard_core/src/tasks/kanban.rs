//! Kanban board projection over tasks.
//!
//! # Invariants
//! - Columns follow `TaskStatus::ALL` order.
//! - Archived tasks never appear on the board.
//! - After a move, affected columns are numbered densely from 0.

use crate::model::task::{Task, TaskId, TaskStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanError {
    UnknownTask(TaskId),
}

impl Display for KanbanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTask(id) => write!(f, "task is not on the board: {id}"),
        }
    }
}

impl Error for KanbanError {}

/// Persistable change produced by a card move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMove {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanBoard {
    columns: Vec<KanbanColumn>,
}

impl KanbanBoard {
    /// Groups non-archived tasks by status, ordered by `position` then
    /// `created_at`.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|status| {
                let mut column: Vec<Task> = tasks
                    .iter()
                    .filter(|task| !task.is_archived && task.status == *status)
                    .cloned()
                    .collect();
                column.sort_by(|a, b| {
                    a.position
                        .cmp(&b.position)
                        .then_with(|| a.created_at.cmp(&b.created_at))
                        .then_with(|| a.id.cmp(&b.id))
                });
                KanbanColumn {
                    status: *status,
                    tasks: column,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[KanbanColumn] {
        &self.columns
    }

    pub fn column(&self, status: TaskStatus) -> &KanbanColumn {
        &self.columns[column_index(status)]
    }

    /// Moves one card to `to_status` at `to_index` (clamped to the column
    /// length) and returns every task whose status or position changed.
    pub fn move_card(
        &mut self,
        task_id: TaskId,
        to_status: TaskStatus,
        to_index: usize,
    ) -> Result<Vec<CardMove>, KanbanError> {
        let (from_column, from_index) = self
            .locate(task_id)
            .ok_or(KanbanError::UnknownTask(task_id))?;

        let before: Vec<(TaskId, TaskStatus, i64)> = self
            .columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .map(|task| (task.id, task.status, task.position))
            .collect();

        let mut task = self.columns[from_column].tasks.remove(from_index);
        task.set_status(to_status);

        let target = &mut self.columns[column_index(to_status)].tasks;
        let index = to_index.min(target.len());
        target.insert(index, task);

        for column_idx in [from_column, column_index(to_status)] {
            for (position, task) in self.columns[column_idx].tasks.iter_mut().enumerate() {
                task.position = position as i64;
            }
        }

        let changes = self
            .columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .filter(|task| {
                !before
                    .iter()
                    .any(|(id, status, position)| {
                        *id == task.id && *status == task.status && *position == task.position
                    })
            })
            .map(|task| CardMove {
                task_id: task.id,
                status: task.status,
                position: task.position,
            })
            .collect();

        Ok(changes)
    }

    fn locate(&self, task_id: TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(column_idx, column)| {
            column
                .tasks
                .iter()
                .position(|task| task.id == task_id)
                .map(|task_idx| (column_idx, task_idx))
        })
    }
}

fn column_index(status: TaskStatus) -> usize {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Done => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::{KanbanBoard, KanbanError};
    use crate::model::task::{Task, TaskStatus};
    use uuid::Uuid;

    fn board_fixture() -> (KanbanBoard, Vec<Task>) {
        let user = Uuid::new_v4();
        let tasks: Vec<Task> = (0..3)
            .map(|i| {
                let mut task = Task::new(user, format!("todo {i}"), i);
                task.position = i;
                task
            })
            .chain(std::iter::once({
                let mut task = Task::new(user, "doing", 10);
                task.set_status(TaskStatus::InProgress);
                task
            }))
            .collect();
        (KanbanBoard::from_tasks(&tasks), tasks)
    }

    #[test]
    fn groups_by_status_in_position_order() {
        let (board, _) = board_fixture();
        let todo: Vec<_> = board
            .column(TaskStatus::Todo)
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(todo, vec!["todo 0", "todo 1", "todo 2"]);
        assert_eq!(board.column(TaskStatus::InProgress).tasks.len(), 1);
        assert!(board.column(TaskStatus::Done).tasks.is_empty());
    }

    #[test]
    fn moving_to_done_completes_and_renumbers() {
        let (mut board, tasks) = board_fixture();
        let moved = tasks[0].id;

        let changes = board.move_card(moved, TaskStatus::Done, 5).unwrap();

        let done = &board.column(TaskStatus::Done).tasks;
        assert_eq!(done.len(), 1);
        assert!(done[0].is_completed);
        assert_eq!(done[0].position, 0);

        let todo_positions: Vec<i64> = board
            .column(TaskStatus::Todo)
            .tasks
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(todo_positions, vec![0, 1]);

        // moved card plus the two todo cards that shifted up
        assert_eq!(changes.len(), 3);
        assert!(changes
            .iter()
            .any(|c| c.task_id == moved && c.status == TaskStatus::Done));
    }

    #[test]
    fn reorder_within_column() {
        let (mut board, tasks) = board_fixture();
        let changes = board.move_card(tasks[2].id, TaskStatus::Todo, 0).unwrap();
        let order: Vec<_> = board
            .column(TaskStatus::Todo)
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(order, vec!["todo 2", "todo 0", "todo 1"]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn unknown_task_is_rejected() {
        let (mut board, _) = board_fixture();
        let missing = Uuid::new_v4();
        assert_eq!(
            board.move_card(missing, TaskStatus::Done, 0),
            Err(KanbanError::UnknownTask(missing))
        );
    }
}
