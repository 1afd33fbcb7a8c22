//! Task dependency edges.
//!
//! # Invariants
//! - A `(task_id, depends_on_id)` pair is stored at most once; a duplicate
//!   insert surfaces as `RepoError::Conflict`.
//! - Acyclicity is enforced by the service layer before insert.

use crate::model::dependency::{DependencyId, TaskDependency};
use crate::model::task::TaskId;
use crate::model::UserId;
use crate::repo::codec::read_uuid;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const DEPENDENCY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    task_id,
    depends_on_id,
    created_at
FROM task_dependencies";

pub trait DependencyRepository {
    fn create_dependency(&self, dependency: &TaskDependency) -> RepoResult<DependencyId>;
    /// All edges of the user, optionally only those touching `task_id`.
    fn list_dependencies(
        &self,
        user_id: UserId,
        task_id: Option<TaskId>,
    ) -> RepoResult<Vec<TaskDependency>>;
    fn delete_dependency(&self, user_id: UserId, id: DependencyId) -> RepoResult<()>;
}

pub struct SqliteDependencyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDependencyRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DependencyRepository for SqliteDependencyRepository<'_> {
    fn create_dependency(&self, dependency: &TaskDependency) -> RepoResult<DependencyId> {
        self.conn.execute(
            "INSERT INTO task_dependencies (id, user_id, task_id, depends_on_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                dependency.id.to_string(),
                dependency.user_id.to_string(),
                dependency.task_id.to_string(),
                dependency.depends_on_id.to_string(),
                dependency.created_at,
            ],
        )?;
        Ok(dependency.id)
    }

    fn list_dependencies(
        &self,
        user_id: UserId,
        task_id: Option<TaskId>,
    ) -> RepoResult<Vec<TaskDependency>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEPENDENCY_SELECT_SQL}
             WHERE user_id = ?1
               AND (?2 IS NULL OR task_id = ?2 OR depends_on_id = ?2)
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            user_id.to_string(),
            task_id.map(|id| id.to_string())
        ])?;
        let mut dependencies = Vec::new();
        while let Some(row) = rows.next()? {
            dependencies.push(parse_dependency_row(row)?);
        }
        Ok(dependencies)
    }

    fn delete_dependency(&self, user_id: UserId, id: DependencyId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM task_dependencies WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_dependency_row(row: &Row<'_>) -> RepoResult<TaskDependency> {
    Ok(TaskDependency {
        id: read_uuid(row, "id")?,
        user_id: read_uuid(row, "user_id")?,
        task_id: read_uuid(row, "task_id")?,
        depends_on_id: read_uuid(row, "depends_on_id")?,
        created_at: row.get("created_at")?,
    })
}
