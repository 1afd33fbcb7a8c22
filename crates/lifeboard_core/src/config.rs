//! Application configuration.
//!
//! # Invariants
//! - Every field has a default; a missing config file is not an error.
//! - Relative paths are resolved against `data_dir`.

use crate::auth::RouteGuard;
use crate::logging::default_log_level;
use crate::storage::FileStore;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "lifeboard.json";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("lifeboard")
}

fn default_database_file() -> PathBuf {
    PathBuf::from("lifeboard.db")
}

fn default_log_level_string() -> String {
    default_log_level().to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_session_ttl_hours() -> u32 {
    24 * 7
}

fn default_layout_save_debounce_ms() -> u64 {
    800
}

fn default_protected_paths() -> Vec<String> {
    RouteGuard::default().protected_prefixes
}

fn default_auth_pages() -> Vec<String> {
    RouteGuard::default().auth_pages
}

fn default_sign_in_path() -> String {
    RouteGuard::default().sign_in_path
}

fn default_home_path() -> String {
    RouteGuard::default().home_path
}

fn default_uploads_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_base_url() -> String {
    "http://localhost:3000/uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/png".into(),
        "image/jpeg".into(),
        "image/gif".into(),
        "image/webp".into(),
        "application/pdf".into(),
    ]
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub root: PathBuf,
    pub public_base_url: String,
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: default_uploads_root(),
            public_base_url: default_public_base_url(),
            max_bytes: default_max_upload_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_file: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub uploads: UploadConfig,
    pub session_ttl_hours: u32,
    pub layout_save_debounce_ms: u64,
    pub protected_paths: Vec<String>,
    pub auth_pages: Vec<String>,
    pub sign_in_path: String,
    pub home_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            log_level: default_log_level_string(),
            log_dir: default_log_dir(),
            uploads: UploadConfig::default(),
            session_ttl_hours: default_session_ttl_hours(),
            layout_save_debounce_ms: default_layout_save_debounce_ms(),
            protected_paths: default_protected_paths(),
            auth_pages: default_auth_pages(),
            sign_in_path: default_sign_in_path(),
            home_path: default_home_path(),
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database_file)
    }

    pub fn log_dir_path(&self) -> PathBuf {
        self.resolve(&self.log_dir)
    }

    pub fn uploads_root(&self) -> PathBuf {
        self.resolve(&self.uploads.root)
    }

    pub fn session_ttl_ms(&self) -> i64 {
        i64::from(self.session_ttl_hours) * 60 * 60 * 1000
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard {
            protected_prefixes: self.protected_paths.clone(),
            auth_pages: self.auth_pages.clone(),
            sign_in_path: self.sign_in_path.clone(),
            home_path: self.home_path.clone(),
        }
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(
            self.uploads_root(),
            self.uploads.public_base_url.clone(),
            self.uploads.max_bytes,
            self.uploads.allowed_types.clone(),
        )
    }

    /// Rejects values no component can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_hours == 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_hours must be positive".to_string(),
            ));
        }
        if self.uploads.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "uploads.max_bytes must be positive".to_string(),
            ));
        }
        if self.uploads.allowed_types.is_empty() {
            return Err(ConfigError::Invalid(
                "uploads.allowed_types cannot be empty".to_string(),
            ));
        }
        if !self.sign_in_path.starts_with('/') || !self.home_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "sign_in_path and home_path must start with `/`".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("lifeboard")
        .join(CONFIG_FILE_NAME)
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config: AppConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, ConfigError};
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&dir.path().join("absent.json")).expect("defaults");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.layout_save_debounce_ms, 800);
    }

    #[test]
    fn partial_file_keeps_other_defaults_and_resolves_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lifeboard.json");
        std::fs::write(
            &path,
            r#"{"data_dir": "/srv/lifeboard", "uploads": {"max_bytes": 1024}}"#,
        )
        .expect("write config");

        let config = load_config(&path).expect("config");
        assert_eq!(config.database_path(), PathBuf::from("/srv/lifeboard/lifeboard.db"));
        assert_eq!(config.uploads_root(), PathBuf::from("/srv/lifeboard/uploads"));
        assert_eq!(config.uploads.max_bytes, 1024);
        assert!(!config.uploads.allowed_types.is_empty());
    }

    #[test]
    fn rejects_bad_json_and_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lifeboard.json");
        std::fs::write(&path, "{ not json").expect("write config");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        std::fs::write(&path, r#"{"session_ttl_hours": 0}"#).expect("write config");
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }
}
