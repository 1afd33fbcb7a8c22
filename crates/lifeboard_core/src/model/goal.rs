//! Goal domain model.
//!
//! # Invariants
//! - `progress` is always within `0..=100`.
//! - When milestones exist, `progress` is derived from their completion ratio.

use crate::model::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a goal.
pub type GoalId = Uuid;

/// Goal lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Archived,
}

impl Default for GoalStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// One checkpoint on the way to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Milestone {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_completed: false,
        }
    }
}

/// Canonical goal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<NaiveDate>,
    /// Percent complete, `0..=100`.
    pub progress: u8,
    pub milestones: Vec<Milestone>,
    pub status: GoalStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Goal {
    pub fn new(user_id: UserId, title: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            category: None,
            target_date: None,
            progress: 0,
            milestones: Vec::new(),
            status: GoalStatus::Active,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Recomputes `progress` from milestones; leaves manual progress alone
    /// when the goal has no milestones.
    pub fn recompute_progress(&mut self) {
        if self.milestones.is_empty() {
            self.progress = self.progress.min(100);
            return;
        }
        let total = self.milestones.len() as u32;
        let done = self.milestones.iter().filter(|m| m.is_completed).count() as u32;
        // Round half up in integer arithmetic.
        self.progress = ((done * 200 + total) / (total * 2)) as u8;
    }

    /// Flips the completion state of one milestone and refreshes progress.
    ///
    /// Returns `false` when the milestone id is unknown.
    pub fn toggle_milestone(&mut self, milestone_id: Uuid) -> bool {
        let Some(milestone) = self.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return false;
        };
        milestone.is_completed = !milestone.is_completed;
        self.recompute_progress();
        true
    }

    /// Toggles between active and completed; completion pins progress at 100.
    pub fn toggle_completed(&mut self) {
        match self.status {
            GoalStatus::Completed => {
                self.status = GoalStatus::Active;
                self.recompute_progress();
                if self.milestones.is_empty() && self.progress == 100 {
                    self.progress = 0;
                }
            }
            GoalStatus::Active | GoalStatus::Archived => {
                self.status = GoalStatus::Completed;
                self.progress = 100;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }
}
