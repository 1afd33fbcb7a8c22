//! Dashboard layout, summary and profile endpoints.

use crate::api::{Api, RequestContext};
use crate::response::{ApiFailure, ApiResponse, OK};
use chrono::NaiveDate;
use lifeboard_core::dashboard::{summarize, DashboardSummary};
use lifeboard_core::model::profile::Profile;
use lifeboard_core::repo::task_repo::TaskListQuery;
use lifeboard_core::validation::ProfileInput;
use lifeboard_core::WidgetLayout;

impl Api {
    /// Stored layout merged onto the default widget set.
    pub fn get_layout(&self, ctx: &RequestContext) -> ApiResponse<Vec<WidgetLayout>> {
        self.handle("get_layout", ctx, OK, |user_id| {
            Ok(self.layouts().load(user_id)?)
        })
    }

    pub fn save_layout(
        &self,
        ctx: &RequestContext,
        layout: &[WidgetLayout],
    ) -> ApiResponse<Vec<WidgetLayout>> {
        self.handle("save_layout", ctx, OK, |user_id| {
            Ok(self.layouts().save(user_id, layout)?)
        })
    }

    pub fn reset_layout(&self, ctx: &RequestContext) -> ApiResponse<Vec<WidgetLayout>> {
        self.handle("reset_layout", ctx, OK, |user_id| {
            Ok(self.layouts().reset(user_id)?)
        })
    }

    pub fn dashboard_summary(
        &self,
        ctx: &RequestContext,
        today: NaiveDate,
    ) -> ApiResponse<DashboardSummary> {
        self.handle("dashboard_summary", ctx, OK, |user_id| {
            let tasks = self.tasks().list_tasks(user_id, &TaskListQuery::default())?;
            let goals = self.goals().list_goals(user_id, false)?;
            Ok(summarize(&tasks, &goals, today))
        })
    }

    pub fn get_profile(&self, ctx: &RequestContext) -> ApiResponse<Profile> {
        self.handle("get_profile", ctx, OK, |user_id| {
            self.profiles()
                .get_profile(user_id)?
                .ok_or_else(|| ApiFailure::not_found("profile"))
        })
    }

    pub fn upsert_profile(&self, ctx: &RequestContext, input: ProfileInput) -> ApiResponse<Profile> {
        self.handle("upsert_profile", ctx, OK, |user_id| {
            Ok(self.profiles().upsert_profile(user_id, input)?)
        })
    }
}
