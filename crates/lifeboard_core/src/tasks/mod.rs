//! In-memory task projections: filtered list view and kanban board.

pub mod kanban;
pub mod view;

pub use kanban::{CardMove, KanbanBoard, KanbanColumn, KanbanError};
pub use view::{DueDateFilter, SortField, SortOrder, StatusFilter, TaskFilters, TaskSort, TaskView};
