//! Persisted dashboard layout, one JSON document per user.
//!
//! The document is stored verbatim; decoding is lenient and lives in
//! `layout::merge` so old or hand-edited layouts still load.

use crate::model::UserId;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub trait LayoutRepository {
    /// Raw layout JSON, `None` when the user never saved one.
    fn load_layout(&self, user_id: UserId) -> RepoResult<Option<String>>;
    fn save_layout(&self, user_id: UserId, layout_json: &str, now_ms: i64) -> RepoResult<()>;
    /// Returns `true` when a stored layout was removed.
    fn delete_layout(&self, user_id: UserId) -> RepoResult<bool>;
}

pub struct SqliteLayoutRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLayoutRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LayoutRepository for SqliteLayoutRepository<'_> {
    fn load_layout(&self, user_id: UserId) -> RepoResult<Option<String>> {
        let layout = self
            .conn
            .query_row(
                "SELECT layout FROM dashboard_layouts WHERE user_id = ?1;",
                params![user_id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(layout)
    }

    fn save_layout(&self, user_id: UserId, layout_json: &str, now_ms: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO dashboard_layouts (user_id, layout, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                layout = excluded.layout,
                updated_at = excluded.updated_at;",
            params![user_id.to_string(), layout_json, now_ms],
        )?;
        Ok(())
    }

    fn delete_layout(&self, user_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM dashboard_layouts WHERE user_id = ?1;",
            params![user_id.to_string()],
        )?;
        Ok(changed > 0)
    }
}
