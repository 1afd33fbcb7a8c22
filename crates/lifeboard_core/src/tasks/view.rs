//! Task filter/sort view state.
//!
//! # Responsibility
//! - Hold ephemeral filter and sort selections for task lists.
//! - Derive a filtered, ordered view over an in-memory task collection.
//!
//! # Invariants
//! - `clear()` resets filters to defaults and never touches sort state.
//! - Tasks without a due date sort last in both directions.
//! - Equal sort keys break by `created_at DESC`, then `id ASC`.

use crate::model::task::{Priority, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Completion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// Due-date bucket filter, relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateFilter {
    #[default]
    All,
    Overdue,
    Today,
    Upcoming,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter selections. `Default` is the cleared state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskFilters {
    pub status: StatusFilter,
    pub due_date: DueDateFilter,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub include_archived: bool,
    pub is_completed: Option<bool>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSort {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// Filter and sort state for one task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskView {
    filters: TaskFilters,
    sort: TaskSort,
}

impl TaskView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.filters.status = status;
    }

    pub fn set_due_date(&mut self, due_date: DueDateFilter) {
        self.filters.due_date = due_date;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filters.category = category.filter(|value| !value.trim().is_empty());
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.filters.tags = tags;
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.filters.search = search;
    }

    pub fn set_include_archived(&mut self, include_archived: bool) {
        self.filters.include_archived = include_archived;
    }

    pub fn set_is_completed(&mut self, is_completed: Option<bool>) {
        self.filters.is_completed = is_completed;
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.filters.priority = priority;
    }

    pub fn set_sort_by(&mut self, sort_by: SortField) {
        self.sort.sort_by = sort_by;
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort.sort_order = sort_order;
    }

    /// Resets every filter to its default.
    pub fn clear(&mut self) {
        self.filters = TaskFilters::default();
    }

    /// Returns `true` when any filter differs from the cleared state.
    pub fn has_active_filters(&self) -> bool {
        self.filters != TaskFilters::default()
    }

    /// Derives the filtered, sorted view of `tasks`.
    pub fn apply(&self, tasks: &[Task], today: NaiveDate) -> Vec<Task> {
        let matcher = Matcher::new(&self.filters, today);
        let mut view: Vec<Task> = tasks
            .iter()
            .filter(|task| matcher.matches(task))
            .cloned()
            .collect();
        view.sort_by(|a, b| compare(a, b, self.sort));
        view
    }
}

struct Matcher<'a> {
    filters: &'a TaskFilters,
    today: NaiveDate,
    category: Option<String>,
    tags: Vec<String>,
    search: Option<String>,
}

impl<'a> Matcher<'a> {
    fn new(filters: &'a TaskFilters, today: NaiveDate) -> Self {
        let normalize = |value: &str| value.trim().to_lowercase();
        Self {
            filters,
            today,
            category: filters.category.as_deref().map(normalize),
            tags: filters
                .tags
                .iter()
                .map(|tag| normalize(tag.as_str()))
                .filter(|tag| !tag.is_empty())
                .collect(),
            search: filters
                .search
                .as_deref()
                .map(normalize)
                .filter(|needle| !needle.is_empty()),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        if task.is_archived && !self.filters.include_archived {
            return false;
        }

        let status_ok = match self.filters.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.is_completed,
            StatusFilter::Completed => task.is_completed,
        };
        if !status_ok {
            return false;
        }

        let due_ok = match self.filters.due_date {
            DueDateFilter::All => true,
            DueDateFilter::Overdue => task.is_overdue(self.today),
            DueDateFilter::Today => task.due_date == Some(self.today),
            DueDateFilter::Upcoming => task.due_date.is_some_and(|due| due > self.today),
            DueDateFilter::None => task.due_date.is_none(),
        };
        if !due_ok {
            return false;
        }

        if let Some(category) = &self.category {
            let task_category = task.category.as_deref().map(|c| c.trim().to_lowercase());
            if task_category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        if !self.tags.is_empty()
            && !task
                .tags
                .iter()
                .any(|tag| self.tags.contains(&tag.trim().to_lowercase()))
        {
            return false;
        }

        if let Some(completed) = self.filters.is_completed {
            if task.is_completed != completed {
                return false;
            }
        }

        if let Some(priority) = self.filters.priority {
            if task.priority != priority {
                return false;
            }
        }

        match &self.search {
            Some(needle) => matches_search(task, needle),
            None => true,
        }
    }
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .notes
            .as_deref()
            .is_some_and(|notes| notes.to_lowercase().contains(needle))
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

fn compare(a: &Task, b: &Task, sort: TaskSort) -> Ordering {
    let directed = |ordering: Ordering| match sort.sort_order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    let primary = match sort.sort_by {
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
        SortField::UpdatedAt => directed(a.updated_at.cmp(&b.updated_at)),
        SortField::Priority => directed(a.priority.cmp(&b.priority)),
        SortField::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => directed(left.cmp(&right)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };

    primary
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
