//! Goal use-case service.
//!
//! # Invariants
//! - Progress is recomputed from milestones on every write that touches
//!   them.
//! - A completed goal reports progress 100.

use crate::model::goal::{Goal, GoalId, GoalStatus};
use crate::model::{now_epoch_ms, UserId};
use crate::realtime::{ChangeEvent, ChangeFeed};
use crate::repo::goal_repo::GoalRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::schemas::MilestoneInput;
use crate::validation::GoalInput;
use log::info;
use uuid::Uuid;

pub struct GoalService<R: GoalRepository> {
    repo: R,
    feed: Option<ChangeFeed<Goal>>,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    pub fn with_feed(mut self, feed: ChangeFeed<Goal>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn create_goal(&self, user_id: UserId, input: GoalInput) -> ServiceResult<Goal> {
        input.validate()?;
        let goal = input.into_goal(user_id, now_epoch_ms());
        self.insert_goal(&goal)
    }

    /// Persists an already-built goal, keeping its id.
    pub fn insert_goal(&self, goal: &Goal) -> ServiceResult<Goal> {
        goal_input(goal).validate()?;
        let id = self.repo.create_goal(goal)?;
        let stored = self
            .repo
            .get_goal(goal.user_id, id)?
            .ok_or(ServiceError::InconsistentState("created goal not found in read-back"))?;
        info!("event=goal_create module=service status=ok");
        self.publish(stored.user_id, ChangeEvent::Insert(stored.clone()));
        Ok(stored)
    }

    pub fn get_goal(&self, user_id: UserId, id: GoalId) -> ServiceResult<Goal> {
        self.repo
            .get_goal(user_id, id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn list_goals(&self, user_id: UserId, include_archived: bool) -> ServiceResult<Vec<Goal>> {
        Ok(self.repo.list_goals(user_id, include_archived)?)
    }

    pub fn update_goal(&self, user_id: UserId, id: GoalId, input: GoalInput) -> ServiceResult<Goal> {
        input.validate()?;
        let mut goal = self.get_goal(user_id, id)?;
        input.apply_to(&mut goal, now_epoch_ms());
        self.save_goal(&goal)
    }

    /// Persists the full record of an existing goal.
    pub fn save_goal(&self, goal: &Goal) -> ServiceResult<Goal> {
        goal_input(goal).validate()?;
        let mut goal = goal.clone();
        goal.recompute_progress();
        if goal.status == GoalStatus::Completed {
            goal.progress = 100;
        }

        self.repo.update_goal(&goal)?;
        let stored = self
            .repo
            .get_goal(goal.user_id, goal.id)?
            .ok_or(ServiceError::InconsistentState("updated goal not found in read-back"))?;
        self.publish(stored.user_id, ChangeEvent::Update(stored.clone()));
        Ok(stored)
    }

    /// Toggles between active and completed.
    pub fn toggle_goal(&self, user_id: UserId, id: GoalId) -> ServiceResult<Goal> {
        let mut goal = self.get_goal(user_id, id)?;
        goal.toggle_completed();
        goal.updated_at = now_epoch_ms();
        self.save_goal(&goal)
    }

    /// Flips one milestone and refreshes progress.
    pub fn toggle_milestone(
        &self,
        user_id: UserId,
        id: GoalId,
        milestone_id: Uuid,
    ) -> ServiceResult<Goal> {
        let mut goal = self.get_goal(user_id, id)?;
        if !goal.toggle_milestone(milestone_id) {
            return Err(ServiceError::NotFound(milestone_id));
        }
        goal.updated_at = now_epoch_ms();
        self.save_goal(&goal)
    }

    pub fn delete_goal(&self, user_id: UserId, id: GoalId) -> ServiceResult<()> {
        self.repo.delete_goal(user_id, id)?;
        info!("event=goal_delete module=service status=ok");
        self.publish(user_id, ChangeEvent::Delete(id));
        Ok(())
    }

    fn publish(&self, user_id: UserId, event: ChangeEvent<Goal>) {
        if let Some(feed) = &self.feed {
            feed.publish(user_id, event);
        }
    }
}

/// Form view of a stored goal, used to re-check record-level writes.
pub(crate) fn goal_input(goal: &Goal) -> GoalInput {
    GoalInput {
        title: goal.title.clone(),
        description: goal.description.clone(),
        category: goal.category.clone(),
        target_date: goal.target_date,
        progress: Some(i32::from(goal.progress)),
        milestones: goal
            .milestones
            .iter()
            .map(|milestone| MilestoneInput {
                id: Some(milestone.id),
                title: milestone.title.clone(),
                is_completed: milestone.is_completed,
            })
            .collect(),
        status: Some(goal.status),
    }
}
