//! Journal entry repository contracts and SQLite implementation.

use crate::model::journal::{JournalEntry, JournalEntryId, Mood};
use crate::model::UserId;
use crate::repo::codec::{date_to_db, read_date, read_optional_enum, read_tags, read_uuid, tags_to_db};
use crate::repo::task_repo::push_pagination;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const JOURNAL_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    entry_date,
    title,
    content,
    mood,
    tags,
    created_at,
    updated_at
FROM journal_entries";

/// Inclusive date window plus pagination for journal listing.
#[derive(Debug, Clone, Default)]
pub struct JournalListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait JournalRepository {
    fn create_entry(&self, entry: &JournalEntry) -> RepoResult<JournalEntryId>;
    fn update_entry(&self, entry: &JournalEntry) -> RepoResult<()>;
    fn get_entry(&self, user_id: UserId, id: JournalEntryId) -> RepoResult<Option<JournalEntry>>;
    /// Lists entries by `entry_date DESC, created_at DESC`.
    fn list_entries(&self, user_id: UserId, query: &JournalListQuery)
        -> RepoResult<Vec<JournalEntry>>;
    fn delete_entry(&self, user_id: UserId, id: JournalEntryId) -> RepoResult<()>;
}

pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn create_entry(&self, entry: &JournalEntry) -> RepoResult<JournalEntryId> {
        self.conn.execute(
            "INSERT INTO journal_entries (
                id, user_id, entry_date, title, content, mood, tags, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                date_to_db(entry.entry_date),
                entry.title.as_deref(),
                entry.content.as_str(),
                entry.mood.map(Mood::as_str),
                tags_to_db(&entry.tags)?,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(entry.id)
    }

    fn update_entry(&self, entry: &JournalEntry) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE journal_entries
             SET
                entry_date = ?3,
                title = ?4,
                content = ?5,
                mood = ?6,
                tags = ?7,
                updated_at = ?8
             WHERE id = ?1 AND user_id = ?2;",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                date_to_db(entry.entry_date),
                entry.title.as_deref(),
                entry.content.as_str(),
                entry.mood.map(Mood::as_str),
                tags_to_db(&entry.tags)?,
                entry.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(entry.id));
        }
        Ok(())
    }

    fn get_entry(&self, user_id: UserId, id: JournalEntryId) -> RepoResult<Option<JournalEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOURNAL_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_entries(
        &self,
        user_id: UserId,
        query: &JournalListQuery,
    ) -> RepoResult<Vec<JournalEntry>> {
        let mut sql = format!("{JOURNAL_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];
        if let Some(from) = query.from {
            sql.push_str(" AND entry_date >= ?");
            bind_values.push(Value::Text(date_to_db(from)));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND entry_date <= ?");
            bind_values.push(Value::Text(date_to_db(to)));
        }
        sql.push_str(" ORDER BY entry_date DESC, created_at DESC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, user_id: UserId, id: JournalEntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM journal_entries WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    Ok(JournalEntry {
        id: read_uuid(row, "id")?,
        user_id: read_uuid(row, "user_id")?,
        entry_date: read_date(row, "entry_date")?,
        title: row.get("title")?,
        content: row.get("content")?,
        mood: read_optional_enum(row, "mood", Mood::parse)?,
        tags: read_tags(row, "tags")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
