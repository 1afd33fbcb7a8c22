//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `created_at DESC, id ASC`.
//! - Recurrence columns are all set or all null.
//! - `update_tasks` writes every row or none.

use crate::model::recurrence::{Frequency, Recurrence};
use crate::model::task::{Priority, Task, TaskId, TaskStatus};
use crate::model::{GoalId, UserId};
use crate::repo::codec::{
    bool_to_int, date_to_db, read_bool, read_enum, read_optional_date, read_optional_uuid,
    read_tags, read_uuid, tags_to_db,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    notes,
    priority,
    status,
    due_date,
    category,
    tags,
    recurrence_frequency,
    recurrence_interval,
    recurrence_until,
    goal_id,
    is_completed,
    is_archived,
    position,
    created_at,
    updated_at
FROM tasks";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub include_archived: bool,
    pub goal_id: Option<GoalId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()>;
    /// Updates a batch of tasks in one transaction.
    fn update_tasks(&self, tasks: &[Task]) -> RepoResult<()>;
    /// Whether `goal_id` names a goal owned by `user_id`.
    fn goal_exists(&self, user_id: UserId, goal_id: GoalId) -> RepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        let (frequency, interval, until) = recurrence_to_db(task.recurrence.as_ref());
        self.conn.execute(
            "INSERT INTO tasks (
                id, user_id, title, notes, priority, status, due_date, category, tags,
                recurrence_frequency, recurrence_interval, recurrence_until,
                goal_id, is_completed, is_archived, position, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18);",
            params![
                task.id.to_string(),
                task.user_id.to_string(),
                task.title.as_str(),
                task.notes.as_deref(),
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(date_to_db),
                task.category.as_deref(),
                tags_to_db(&task.tags)?,
                frequency,
                interval,
                until,
                task.goal_id.map(|id| id.to_string()),
                bool_to_int(task.is_completed),
                bool_to_int(task.is_archived),
                task.position,
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        update_task_row(self.conn, task)
    }

    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if !query.include_archived {
            sql.push_str(" AND is_archived = 0");
        }
        if let Some(goal_id) = query.goal_id {
            sql.push_str(" AND goal_id = ?");
            bind_values.push(Value::Text(goal_id.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn update_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for task in tasks {
            update_task_row(&tx, task)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn goal_exists(&self, user_id: UserId, goal_id: GoalId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM goals WHERE id = ?1 AND user_id = ?2);",
            params![goal_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}



fn update_task_row(conn: &Connection, task: &Task) -> RepoResult<()> {
    let (frequency, interval, until) = recurrence_to_db(task.recurrence.as_ref());
    let changed = conn.execute(
        "UPDATE tasks
         SET
            title = ?3,
            notes = ?4,
            priority = ?5,
            status = ?6,
            due_date = ?7,
            category = ?8,
            tags = ?9,
            recurrence_frequency = ?10,
            recurrence_interval = ?11,
            recurrence_until = ?12,
            goal_id = ?13,
            is_completed = ?14,
            is_archived = ?15,
            position = ?16,
            updated_at = ?17
         WHERE id = ?1 AND user_id = ?2;",
        params![
            task.id.to_string(),
            task.user_id.to_string(),
            task.title.as_str(),
            task.notes.as_deref(),
            task.priority.as_str(),
            task.status.as_str(),
            task.due_date.map(date_to_db),
            task.category.as_deref(),
            tags_to_db(&task.tags)?,
            frequency,
            interval,
            until,
            task.goal_id.map(|id| id.to_string()),
            bool_to_int(task.is_completed),
            bool_to_int(task.is_archived),
            task.position,
            task.updated_at,
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound(task.id));
    }
    Ok(())
}

pub(crate) fn push_pagination(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    limit: Option<u32>,
    offset: u32,
) {
    match limit {
        Some(limit) => {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }
        None if offset > 0 => {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
        None => {}
    }
}

fn recurrence_to_db(
    recurrence: Option<&Recurrence>,
) -> (Option<&'static str>, Option<i64>, Option<String>) {
    match recurrence {
        Some(rule) => (
            Some(rule.frequency.as_str()),
            Some(i64::from(rule.interval)),
            rule.until.map(date_to_db),
        ),
        None => (None, None, None),
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let recurrence = match row.get::<_, Option<String>>("recurrence_frequency")? {
        Some(text) => {
            let frequency = Frequency::parse(&text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid recurrence frequency `{text}`"))
            })?;
            let interval: i64 = row.get::<_, Option<i64>>("recurrence_interval")?.unwrap_or(1);
            let interval = u32::try_from(interval).map_err(|_| {
                RepoError::InvalidData(format!("invalid recurrence interval `{interval}`"))
            })?;
            Some(Recurrence {
                frequency,
                interval,
                until: read_optional_date(row, "recurrence_until")?,
            })
        }
        None => None,
    };

    let task = Task {
        id: read_uuid(row, "id")?,
        user_id: read_uuid(row, "user_id")?,
        title: row.get("title")?,
        notes: row.get("notes")?,
        priority: read_enum(row, "priority", Priority::parse)?,
        status: read_enum(row, "status", TaskStatus::parse)?,
        due_date: read_optional_date(row, "due_date")?,
        category: row.get("category")?,
        tags: read_tags(row, "tags")?,
        recurrence,
        goal_id: read_optional_uuid(row, "goal_id")?,
        is_completed: read_bool(row, "is_completed")?,
        is_archived: read_bool(row, "is_archived")?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    if task.is_completed != (task.status == TaskStatus::Done) {
        return Err(RepoError::InvalidData(format!(
            "task {} has status `{}` but is_completed={}",
            task.id,
            task.status.as_str(),
            task.is_completed
        )));
    }
    Ok(task)
}
