//! Form input schemas.

use crate::model::dependency::TaskDependency;
use crate::model::goal::{Goal, GoalStatus, Milestone};
use crate::model::journal::{JournalEntry, Mood};
use crate::model::profile::Profile;
use crate::model::recurrence::Recurrence;
use crate::model::task::{Priority, Task, TaskId, TaskStatus};
use crate::model::{GoalId, UserId};
use crate::validation::rules::{
    clean_optional, http_url, normalize_tags, optional_max, tags, text_length, timezone,
};
use crate::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TITLE_MAX: usize = 200;
const TASK_NOTES_MAX: usize = 5_000;
const CATEGORY_MAX: usize = 50;
const RECURRENCE_INTERVAL_MAX: u32 = 365;
const GOAL_DESCRIPTION_MAX: usize = 2_000;
const MILESTONES_MAX: usize = 50;
const JOURNAL_CONTENT_MAX: usize = 20_000;
const DISPLAY_NAME_MIN: usize = 2;
const DISPLAY_NAME_MAX: usize = 50;
const BIO_MAX: usize = 500;

/// Task create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInput {
    pub title: String,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub recurrence: Option<Recurrence>,
    pub goal_id: Option<GoalId>,
    pub is_archived: Option<bool>,
}

impl TaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        text_length(&mut errors, "title", &self.title, 1, TITLE_MAX);
        optional_max(&mut errors, "notes", self.notes.as_deref(), TASK_NOTES_MAX);
        optional_max(&mut errors, "category", self.category.as_deref(), CATEGORY_MAX);
        tags(&mut errors, "tags", &self.tags);

        if let Some(recurrence) = &self.recurrence {
            if recurrence.interval == 0 || recurrence.interval > RECURRENCE_INTERVAL_MAX {
                errors.push(
                    "recurrence.interval",
                    format!("must be between 1 and {RECURRENCE_INTERVAL_MAX}"),
                );
            }
            if let (Some(until), Some(due)) = (recurrence.until, self.due_date) {
                if until < due {
                    errors.push("recurrence.until", "cannot be before the due date");
                }
            }
        }
        errors.into_result()
    }

    /// Builds a new task owned by `user_id`.
    pub fn into_task(self, user_id: UserId, now_ms: i64) -> Task {
        let mut task = Task::new(user_id, "", now_ms);
        self.apply_to(&mut task, now_ms);
        task
    }

    /// Overwrites the editable fields of `task`.
    ///
    /// Fields left unset in the form (`priority`, `status`, `is_archived`)
    /// keep the task's current value.
    pub fn apply_to(self, task: &mut Task, now_ms: i64) {
        task.title = self.title.trim().to_string();
        task.notes = clean_optional(self.notes);
        task.category = clean_optional(self.category);
        task.tags = normalize_tags(&self.tags);
        task.due_date = self.due_date;
        task.recurrence = self.recurrence;
        task.goal_id = self.goal_id;
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.set_status(status);
        }
        if let Some(archived) = self.is_archived {
            task.is_archived = archived;
        }
        task.updated_at = now_ms;
    }
}

impl From<&Task> for TaskInput {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            notes: task.notes.clone(),
            priority: Some(task.priority),
            status: Some(task.status),
            due_date: task.due_date,
            category: task.category.clone(),
            tags: task.tags.clone(),
            recurrence: task.recurrence.clone(),
            goal_id: task.goal_id,
            is_archived: Some(task.is_archived),
        }
    }
}

/// Goal create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalInput {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<NaiveDate>,
    /// Manual progress; ignored when milestones are present.
    pub progress: Option<i32>,
    /// Milestone titles with completion flags, in display order.
    pub milestones: Vec<MilestoneInput>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneInput {
    /// Existing milestone id; `None` creates a new milestone.
    pub id: Option<Uuid>,
    pub title: String,
    pub is_completed: bool,
}

impl GoalInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        text_length(&mut errors, "title", &self.title, 1, TITLE_MAX);
        optional_max(
            &mut errors,
            "description",
            self.description.as_deref(),
            GOAL_DESCRIPTION_MAX,
        );
        optional_max(&mut errors, "category", self.category.as_deref(), CATEGORY_MAX);
        if let Some(progress) = self.progress {
            if !(0..=100).contains(&progress) {
                errors.push("progress", "must be between 0 and 100");
            }
        }
        if self.milestones.len() > MILESTONES_MAX {
            errors.push(
                "milestones",
                format!("must contain at most {MILESTONES_MAX} milestones"),
            );
        }
        for (idx, milestone) in self.milestones.iter().enumerate() {
            text_length(
                &mut errors,
                &format!("milestones[{idx}].title"),
                &milestone.title,
                1,
                TITLE_MAX,
            );
        }
        errors.into_result()
    }

    pub fn into_goal(self, user_id: UserId, now_ms: i64) -> Goal {
        let mut goal = Goal::new(user_id, "", now_ms);
        self.apply_to(&mut goal, now_ms);
        goal
    }

    /// Overwrites the editable fields of `goal` and refreshes progress.
    pub fn apply_to(self, goal: &mut Goal, now_ms: i64) {
        goal.title = self.title.trim().to_string();
        goal.description = clean_optional(self.description);
        goal.category = clean_optional(self.category);
        goal.target_date = self.target_date;
        goal.milestones = self
            .milestones
            .into_iter()
            .map(|input| Milestone {
                id: input.id.unwrap_or_else(Uuid::new_v4),
                title: input.title.trim().to_string(),
                is_completed: input.is_completed,
            })
            .collect();
        if let Some(progress) = self.progress {
            goal.progress = progress.clamp(0, 100) as u8;
        }
        if let Some(status) = self.status {
            goal.status = status;
        }
        goal.recompute_progress();
        if goal.status == GoalStatus::Completed {
            goal.progress = 100;
        }
        goal.updated_at = now_ms;
    }
}

/// Journal entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInput {
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JournalInput {
    pub fn new(entry_date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            entry_date,
            title: None,
            content: content.into(),
            mood: None,
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        text_length(&mut errors, "content", &self.content, 1, JOURNAL_CONTENT_MAX);
        optional_max(&mut errors, "title", self.title.as_deref(), TITLE_MAX);
        tags(&mut errors, "tags", &self.tags);
        errors.into_result()
    }

    pub fn into_entry(self, user_id: UserId, now_ms: i64) -> JournalEntry {
        let mut entry = JournalEntry::new(user_id, self.entry_date, "", now_ms);
        self.apply_to(&mut entry, now_ms);
        entry
    }

    pub fn apply_to(self, entry: &mut JournalEntry, now_ms: i64) {
        entry.entry_date = self.entry_date;
        entry.title = clean_optional(self.title);
        entry.content = self.content.trim().to_string();
        entry.mood = self.mood;
        entry.tags = normalize_tags(&self.tags);
        entry.updated_at = now_ms;
    }
}

/// Profile settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub bio: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        text_length(
            &mut errors,
            "display_name",
            &self.display_name,
            DISPLAY_NAME_MIN,
            DISPLAY_NAME_MAX,
        );
        if let Some(url) = self.avatar_url.as_deref().filter(|u| !u.trim().is_empty()) {
            http_url(&mut errors, "avatar_url", url);
        }
        timezone(&mut errors, "timezone", &self.timezone);
        optional_max(&mut errors, "bio", self.bio.as_deref(), BIO_MAX);
        errors.into_result()
    }

    pub fn into_profile(self, user_id: UserId, now_ms: i64) -> Profile {
        Profile {
            user_id,
            display_name: self.display_name.trim().to_string(),
            avatar_url: clean_optional(self.avatar_url),
            timezone: self.timezone.trim().to_string(),
            bio: clean_optional(self.bio),
            updated_at: now_ms,
        }
    }
}

/// Task dependency form: `task_id` waits on `depends_on_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInput {
    pub task_id: TaskId,
    pub depends_on_id: TaskId,
}

impl DependencyInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_id == self.depends_on_id {
            return Err(ValidationError::single(
                "depends_on_id",
                "a task cannot depend on itself",
            ));
        }
        Ok(())
    }

    pub fn into_dependency(self, user_id: UserId, now_ms: i64) -> TaskDependency {
        TaskDependency {
            id: Uuid::new_v4(),
            user_id,
            task_id: self.task_id,
            depends_on_id: self.depends_on_id,
            created_at: now_ms,
        }
    }
}
