//! Runtime configuration for PlaceBook core.
//!
//! # Responsibility
//! - Describe where the store, images and logs live.
//! - Resolve overrides from the process environment.
//!
//! # Invariants
//! - `data_dir` must be absolute before the runtime starts.
//! - Derived paths are always inside `data_dir` unless `log_dir` is set.

use crate::db::SchemaPolicy;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "PLACEBOOK_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "PLACEBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PLACEBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "placebook.sqlite3";
const DEFAULT_IMAGE_DIR_NAME: &str = "images";
const DEFAULT_LOG_DIR_NAME: &str = "logs";
const DEFAULT_WORKER_THREADS: usize = 2;
const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Configuration consumed by `PlaceBookRuntime::start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceBookConfig {
    pub data_dir: PathBuf,
    pub db_file_name: String,
    pub image_dir_name: String,
    pub log_level: String,
    /// Overrides `{data_dir}/logs`.
    pub log_dir: Option<PathBuf>,
    /// Skip logger setup when the host already installed one.
    pub init_logging: bool,
    pub schema_policy: SchemaPolicy,
    /// Sizes both the async workers and the blocking pool that runs store
    /// and image work.
    pub worker_threads: usize,
}

impl Default for PlaceBookConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("placebook"),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            image_dir_name: DEFAULT_IMAGE_DIR_NAME.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            init_logging: true,
            schema_policy: SchemaPolicy::default(),
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl PlaceBookConfig {
    /// Default layout rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `PLACEBOOK_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_value(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = env_value(LOG_LEVEL_ENV) {
            config.log_level = value;
        }
        if let Some(value) = env_value(LOG_DIR_ENV) {
            config.log_dir = Some(PathBuf::from(value));
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(self.data_dir.clone()));
        }
        if self.db_file_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName("db_file_name"));
        }
        if self.image_dir_name.trim().is_empty() {
            return Err(ConfigError::EmptyFileName("image_dir_name"));
        }
        let level = self.log_level.trim().to_ascii_lowercase();
        if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkerThreads);
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(&self.image_dir_name)
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_LOG_DIR_NAME))
    }
}

fn env_value(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeDataDir(PathBuf),
    EmptyFileName(&'static str),
    UnknownLogLevel(String),
    NoWorkerThreads,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeDataDir(path) => {
                write!(f, "data_dir must be an absolute path, got `{}`", path.display())
            }
            Self::EmptyFileName(field) => write!(f, "{field} cannot be empty"),
            Self::UnknownLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::NoWorkerThreads => write!(f, "worker_threads must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
