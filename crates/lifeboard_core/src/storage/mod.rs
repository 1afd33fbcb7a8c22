//! File storage for user uploads.
//!
//! # Responsibility
//! - Validate uploads (size, content type) before touching disk.
//! - Store objects under `<root>/<user_id>/<uuid>-<sanitized name>` and
//!   derive their public URL.
//! - Keep an index of stored objects in the `uploads` table.
//!
//! # Invariants
//! - Object names never contain path separators or leading dots.
//! - A rejected upload leaves no file behind.

use crate::model::{now_epoch_ms, UserId};
use crate::repo::codec::read_uuid;
use crate::repo::RepoResult;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

static UNSAFE_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

const MAX_FILE_NAME_CHARS: usize = 100;

/// Storage error for upload operations.
#[derive(Debug)]
pub enum StorageError {
    EmptyFile,
    TooLarge { size: u64, max: u64 },
    UnsupportedType(String),
    Io(std::io::Error),
}

impl StorageError {
    /// `true` for errors caused by the upload itself rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "file is empty"),
            Self::TooLarge { size, max } => {
                write!(f, "file is {size} bytes; the limit is {max} bytes")
            }
            Self::UnsupportedType(content_type) => {
                write!(f, "content type `{content_type}` is not allowed")
            }
            Self::Io(err) => write!(f, "storage io error: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// One file handed over by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stored object metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub id: Uuid,
    /// Path relative to the store root, `/`-separated.
    pub object_path: String,
    pub public_url: String,
    pub content_type: String,
    pub size: u64,
}

/// Local directory acting as a public bucket.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl FileStore {
    /// `allowed_types` entries are exact MIME types or `type/*` wildcards.
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        max_bytes: u64,
        allowed_types: Vec<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
            max_bytes,
            allowed_types: allowed_types
                .into_iter()
                .map(|value| value.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks an upload without writing it.
    pub fn check(&self, request: &UploadRequest) -> Result<(), StorageError> {
        let size = request.data.len() as u64;
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        let content_type = normalize_content_type(&request.content_type);
        if !self.is_allowed(&content_type) {
            return Err(StorageError::UnsupportedType(content_type));
        }
        Ok(())
    }

    /// Validates and writes one upload for `user_id`.
    pub fn store(&self, user_id: UserId, request: &UploadRequest) -> Result<StoredFile, StorageError> {
        if let Err(err) = self.check(request) {
            warn!("event=upload_store module=storage status=rejected reason={}", reason(&err));
            return Err(err);
        }

        let id = Uuid::new_v4();
        let object_name = format!("{}-{}", id.simple(), sanitize_file_name(&request.file_name));
        let user_dir = self.root.join(user_id.to_string());
        std::fs::create_dir_all(&user_dir)?;
        std::fs::write(user_dir.join(&object_name), &request.data)?;

        let object_path = format!("{user_id}/{object_name}");
        let stored = StoredFile {
            id,
            public_url: format!(
                "{}/{}",
                self.public_base_url.trim_end_matches('/'),
                object_path
            ),
            object_path,
            content_type: normalize_content_type(&request.content_type),
            size: request.data.len() as u64,
        };
        info!(
            "event=upload_store module=storage status=ok size={} content_type={}",
            stored.size, stored.content_type
        );
        Ok(stored)
    }

    /// Deletes a previously stored object.
    pub fn remove(&self, stored: &StoredFile) -> Result<(), StorageError> {
        std::fs::remove_file(self.root.join(&stored.object_path))?;
        info!("event=upload_remove module=storage status=ok");
        Ok(())
    }

    fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(family) => content_type
                    .split_once('/')
                    .is_some_and(|(head, _)| head == family),
                None => allowed == content_type,
            }
        })
    }
}

/// Indexes a stored object for its owner.
pub fn record_upload(conn: &Connection, user_id: UserId, file: &StoredFile) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO uploads (id, user_id, object_path, public_url, content_type, size_bytes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            file.id.to_string(),
            user_id.to_string(),
            file.object_path.as_str(),
            file.public_url.as_str(),
            file.content_type.as_str(),
            i64::try_from(file.size).unwrap_or(i64::MAX),
            now_epoch_ms(),
        ],
    )?;
    Ok(())
}

/// Lists the user's uploads, newest first.
pub fn list_uploads(conn: &Connection, user_id: UserId) -> RepoResult<Vec<StoredFile>> {
    let mut stmt = conn.prepare(
        "SELECT id, object_path, public_url, content_type, size_bytes
         FROM uploads
         WHERE user_id = ?1
         ORDER BY created_at DESC, id ASC;",
    )?;
    let mut rows = stmt.query(params![user_id.to_string()])?;
    let mut files = Vec::new();
    while let Some(row) = rows.next()? {
        let size: i64 = row.get("size_bytes")?;
        files.push(StoredFile {
            id: read_uuid(row, "id")?,
            object_path: row.get("object_path")?,
            public_url: row.get("public_url")?,
            content_type: row.get("content_type")?,
            size: u64::try_from(size).unwrap_or(0),
        });
    }
    Ok(files)
}

/// Reduces a client file name to a safe single path segment.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let replaced = UNSAFE_NAME_CHARS_RE.replace_all(base, "_");
    let trimmed = replaced.trim_start_matches('.').trim_matches('_');
    let limited: String = trimmed.chars().take(MAX_FILE_NAME_CHARS).collect();
    if limited.is_empty() {
        "file".to_string()
    } else {
        limited
    }
}

fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_ascii_lowercase()
}

fn reason(err: &StorageError) -> &'static str {
    match err {
        StorageError::EmptyFile => "empty",
        StorageError::TooLarge { .. } => "too_large",
        StorageError::UnsupportedType(_) => "unsupported_type",
        StorageError::Io(_) => "io",
    }
}

#[cfg(test)]
mod tests {
    use super::{sanitize_file_name, FileStore, StorageError, UploadRequest};
    use uuid::Uuid;

    fn store(root: &std::path::Path) -> FileStore {
        FileStore::new(
            root,
            "https://files.example.com/avatars/",
            16,
            vec!["image/*".to_string(), "application/pdf".to_string()],
        )
    }

    fn request(name: &str, content_type: &str, size: usize) -> UploadRequest {
        UploadRequest {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            data: vec![7; size],
        }
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\My Photo (1).png"), "My_Photo_1_.png");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(".env"), "env");
    }

    #[test]
    fn stores_file_under_user_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let user = Uuid::new_v4();
        let files = store(dir.path());
        let stored = files
            .store(user, &request("me.png", "image/png; charset=binary", 4))
            .expect("upload accepted");

        assert_eq!(stored.size, 4);
        assert_eq!(stored.content_type, "image/png");
        assert!(stored.object_path.starts_with(&format!("{user}/")));
        assert!(stored.object_path.ends_with("-me.png"));
        assert_eq!(
            stored.public_url,
            format!("https://files.example.com/avatars/{}", stored.object_path)
        );
        assert!(dir.path().join(&stored.object_path).exists());

        files.remove(&stored).expect("remove stored object");
        assert!(!dir.path().join(&stored.object_path).exists());
        assert!(matches!(files.remove(&stored), Err(StorageError::Io(_))));
    }

    #[test]
    fn rejects_empty_oversized_and_disallowed_uploads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = store(dir.path());
        let user = Uuid::new_v4();

        assert!(matches!(
            files.store(user, &request("a.png", "image/png", 0)),
            Err(StorageError::EmptyFile)
        ));
        assert!(matches!(
            files.store(user, &request("a.png", "image/png", 17)),
            Err(StorageError::TooLarge { size: 17, max: 16 })
        ));
        assert!(matches!(
            files.store(user, &request("a.exe", "application/x-msdownload", 3)),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(!dir.path().join(user.to_string()).exists());
    }
}
