//! Profile repository: one row per user, written with upsert semantics.

use crate::model::profile::Profile;
use crate::model::UserId;
use crate::repo::codec::read_uuid;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

pub trait ProfileRepository {
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>>;
    fn upsert_profile(&self, profile: &Profile) -> RepoResult<()>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, display_name, avatar_url, timezone, bio, updated_at
             FROM profiles
             WHERE user_id = ?1;",
        )?;
        let mut rows = stmt.query(params![user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_profile_row(row)?)),
            None => Ok(None),
        }
    }

    fn upsert_profile(&self, profile: &Profile) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO profiles (user_id, display_name, avatar_url, timezone, bio, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url,
                timezone = excluded.timezone,
                bio = excluded.bio,
                updated_at = excluded.updated_at;",
            params![
                profile.user_id.to_string(),
                profile.display_name.as_str(),
                profile.avatar_url.as_deref(),
                profile.timezone.as_str(),
                profile.bio.as_deref(),
                profile.updated_at,
            ],
        )?;
        Ok(())
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<Profile> {
    Ok(Profile {
        user_id: read_uuid(row, "user_id")?,
        display_name: row.get("display_name")?,
        avatar_url: row.get("avatar_url")?,
        timezone: row.get("timezone")?,
        bio: row.get("bio")?,
        updated_at: row.get("updated_at")?,
    })
}
