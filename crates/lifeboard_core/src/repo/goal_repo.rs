//! Goal repository contracts and SQLite implementation.
//!
//! Milestones are stored inline as a JSON array on the goal row.

use crate::model::goal::{Goal, GoalId, GoalStatus, Milestone};
use crate::model::UserId;
use crate::repo::codec::{date_to_db, read_enum, read_optional_date, read_uuid};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    category,
    target_date,
    progress,
    milestones,
    status,
    created_at,
    updated_at
FROM goals";

/// Repository interface for goal CRUD.
pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn update_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn get_goal(&self, user_id: UserId, id: GoalId) -> RepoResult<Option<Goal>>;
    /// Lists goals newest first; archived goals only when requested.
    fn list_goals(&self, user_id: UserId, include_archived: bool) -> RepoResult<Vec<Goal>>;
    fn delete_goal(&self, user_id: UserId, id: GoalId) -> RepoResult<()>;
}

pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        self.conn.execute(
            "INSERT INTO goals (
                id, user_id, title, description, category, target_date,
                progress, milestones, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.title.as_str(),
                goal.description.as_deref(),
                goal.category.as_deref(),
                goal.target_date.map(date_to_db),
                i64::from(goal.progress),
                milestones_to_db(&goal.milestones)?,
                goal.status.as_str(),
                goal.created_at,
                goal.updated_at,
            ],
        )?;
        Ok(goal.id)
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET
                title = ?3,
                description = ?4,
                category = ?5,
                target_date = ?6,
                progress = ?7,
                milestones = ?8,
                status = ?9,
                updated_at = ?10
             WHERE id = ?1 AND user_id = ?2;",
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.title.as_str(),
                goal.description.as_deref(),
                goal.category.as_deref(),
                goal.target_date.map(date_to_db),
                i64::from(goal.progress),
                milestones_to_db(&goal.milestones)?,
                goal.status.as_str(),
                goal.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(goal.id));
        }
        Ok(())
    }

    fn get_goal(&self, user_id: UserId, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_goal_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_goals(&self, user_id: UserId, include_archived: bool) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE user_id = ?1
               AND (?2 = 1 OR status <> 'archived')
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), i64::from(include_archived)])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn delete_goal(&self, user_id: UserId, id: GoalId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM goals WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn milestones_to_db(milestones: &[Milestone]) -> RepoResult<String> {
    serde_json::to_string(milestones)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode milestones: {err}")))
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let progress: i64 = row.get("progress")?;
    let progress = u8::try_from(progress)
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid goal progress `{progress}`")))?;

    let milestones_text: String = row.get("milestones")?;
    let milestones: Vec<Milestone> = serde_json::from_str(&milestones_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid milestones json in goals.milestones: {err}"))
    })?;

    Ok(Goal {
        id: read_uuid(row, "id")?,
        user_id: read_uuid(row, "user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        target_date: read_optional_date(row, "target_date")?,
        progress,
        milestones,
        status: read_enum(row, "status", GoalStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
