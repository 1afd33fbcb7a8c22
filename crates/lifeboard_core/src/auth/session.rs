use crate::model::UserId;
use crate::repo::codec::read_uuid;
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// One authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; the session is invalid from this instant.
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// Records a provider-verified user locally. Re-running for an existing id
/// is a no-op.
pub fn ensure_user(conn: &Connection, user_id: UserId, email: &str) -> RepoResult<()> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(RepoError::InvalidData("user email cannot be empty".to_string()));
    }
    conn.execute(
        "INSERT INTO users (id, email) VALUES (?1, ?2)
         ON CONFLICT(id) DO NOTHING;",
        params![user_id.to_string(), email],
    )?;
    Ok(())
}

pub fn user_id_for_email(conn: &Connection, email: &str) -> RepoResult<Option<UserId>> {
    let id: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1;",
            params![email.trim().to_lowercase()],
            |row| row.get(0),
        )
        .optional()?;
    id.map(|text| {
        Uuid::parse_str(&text)
            .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in column `id`")))
    })
    .transpose()
}

/// SQLite-backed session table.
pub struct SessionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SessionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Issues a fresh token valid for `ttl_ms` from `now_ms`.
    pub fn create_session(&self, user_id: UserId, ttl_ms: i64, now_ms: i64) -> RepoResult<Session> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms.max(0)),
        };
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                session.token.as_str(),
                session.user_id.to_string(),
                session.created_at,
                session.expires_at,
            ],
        )?;
        info!("event=session_create module=auth status=ok");
        Ok(session)
    }

    /// Returns the live session for `token`; expired or unknown tokens
    /// yield `None`.
    pub fn resolve(&self, token: &str, now_ms: i64) -> RepoResult<Option<Session>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(
            "SELECT token, user_id, created_at, expires_at
             FROM sessions
             WHERE token = ?1;",
        )?;
        let mut rows = stmt.query(params![token])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let session = parse_session_row(row)?;
        if session.is_expired(now_ms) {
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Returns `true` when a session was removed.
    pub fn revoke(&self, token: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1;", params![token.trim()])?;
        info!("event=session_revoke module=auth status=ok removed={}", changed > 0);
        Ok(changed > 0)
    }

    /// Deletes every session expired at `now_ms`.
    pub fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", params![now_ms])?;
        Ok(removed)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<Session> {
    Ok(Session {
        token: row.get("token")?,
        user_id: read_uuid(row, "user_id")?,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}
