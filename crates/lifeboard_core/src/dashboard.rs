//! Statistics shown by the dashboard stats widget.

use crate::model::goal::Goal;
use crate::model::task::Task;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub active_tasks: usize,
    pub overdue_tasks: usize,
    pub due_today: usize,
    /// Completed share of non-archived tasks, rounded, `0..=100`.
    pub completion_rate: u8,
    pub active_goals: usize,
    /// Mean progress of active goals, rounded; 0 without active goals.
    pub average_goal_progress: u8,
}

/// Summarizes non-archived tasks and goals as of `today`.
pub fn summarize(tasks: &[Task], goals: &[Goal], today: NaiveDate) -> DashboardSummary {
    let mut summary = DashboardSummary::default();
    for task in tasks.iter().filter(|task| !task.is_archived) {
        summary.total_tasks += 1;
        if task.is_completed {
            summary.completed_tasks += 1;
            continue;
        }
        summary.active_tasks += 1;
        if task.is_overdue(today) {
            summary.overdue_tasks += 1;
        }
        if task.due_date == Some(today) {
            summary.due_today += 1;
        }
    }
    summary.completion_rate = rounded_percent(summary.completed_tasks, summary.total_tasks);

    let active: Vec<&Goal> = goals.iter().filter(|goal| goal.is_active()).collect();
    summary.active_goals = active.len();
    if !active.is_empty() {
        let total: usize = active.iter().map(|goal| usize::from(goal.progress)).sum();
        summary.average_goal_progress = ((total * 2 + active.len()) / (active.len() * 2)) as u8;
    }
    summary
}

fn rounded_percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part * 200 + total) / (total * 2)) as u8
}
