//! Goal and journal endpoints.

use crate::api::{Api, RequestContext};
use crate::response::{ApiResponse, CREATED, OK};
use lifeboard_core::model::goal::GoalId;
use lifeboard_core::model::journal::JournalEntryId;
use lifeboard_core::repo::journal_repo::JournalListQuery;
use lifeboard_core::validation::{GoalInput, JournalInput};
use lifeboard_core::{Goal, JournalEntry};
use uuid::Uuid;

impl Api {
    pub fn list_goals(&self, ctx: &RequestContext, include_archived: bool) -> ApiResponse<Vec<Goal>> {
        self.handle("list_goals", ctx, OK, |user_id| {
            Ok(self.goals().list_goals(user_id, include_archived)?)
        })
    }

    pub fn get_goal(&self, ctx: &RequestContext, id: GoalId) -> ApiResponse<Goal> {
        self.handle("get_goal", ctx, OK, |user_id| {
            Ok(self.goals().get_goal(user_id, id)?)
        })
    }

    pub fn create_goal(&self, ctx: &RequestContext, input: GoalInput) -> ApiResponse<Goal> {
        self.handle("create_goal", ctx, CREATED, |user_id| {
            Ok(self.goals().create_goal(user_id, input)?)
        })
    }

    pub fn update_goal(&self, ctx: &RequestContext, id: GoalId, input: GoalInput) -> ApiResponse<Goal> {
        self.handle("update_goal", ctx, OK, |user_id| {
            Ok(self.goals().update_goal(user_id, id, input)?)
        })
    }

    pub fn toggle_goal(&self, ctx: &RequestContext, id: GoalId) -> ApiResponse<Goal> {
        self.handle("toggle_goal", ctx, OK, |user_id| {
            Ok(self.goals().toggle_goal(user_id, id)?)
        })
    }

    pub fn toggle_milestone(
        &self,
        ctx: &RequestContext,
        id: GoalId,
        milestone_id: Uuid,
    ) -> ApiResponse<Goal> {
        self.handle("toggle_milestone", ctx, OK, |user_id| {
            Ok(self.goals().toggle_milestone(user_id, id, milestone_id)?)
        })
    }

    pub fn delete_goal(&self, ctx: &RequestContext, id: GoalId) -> ApiResponse<GoalId> {
        self.handle("delete_goal", ctx, OK, |user_id| {
            self.goals().delete_goal(user_id, id)?;
            Ok(id)
        })
    }

    pub fn list_journal(
        &self,
        ctx: &RequestContext,
        query: &JournalListQuery,
    ) -> ApiResponse<Vec<JournalEntry>> {
        self.handle("list_journal", ctx, OK, |user_id| {
            Ok(self.journal().list_entries(user_id, query)?)
        })
    }

    pub fn create_journal_entry(
        &self,
        ctx: &RequestContext,
        input: JournalInput,
    ) -> ApiResponse<JournalEntry> {
        self.handle("create_journal_entry", ctx, CREATED, |user_id| {
            Ok(self.journal().create_entry(user_id, input)?)
        })
    }

    pub fn update_journal_entry(
        &self,
        ctx: &RequestContext,
        id: JournalEntryId,
        input: JournalInput,
    ) -> ApiResponse<JournalEntry> {
        self.handle("update_journal_entry", ctx, OK, |user_id| {
            Ok(self.journal().update_entry(user_id, id, input)?)
        })
    }

    pub fn delete_journal_entry(
        &self,
        ctx: &RequestContext,
        id: JournalEntryId,
    ) -> ApiResponse<JournalEntryId> {
        self.handle("delete_journal_entry", ctx, OK, |user_id| {
            self.journal().delete_entry(user_id, id)?;
            Ok(id)
        })
    }
}
