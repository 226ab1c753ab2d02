//! Process-level wiring for PlaceBook core.
//!
//! # Responsibility
//! - Turn a `PlaceBookConfig` into a ready store, image store, service and
//!   background worker pool.
//! - Release the worker pool and the connection on shutdown.
//!
//! # Invariants
//! - `start` either returns a fully wired runtime or leaves nothing running.
//! - `shutdown` waits a bounded time for in-flight work before closing the
//!   store.

use crate::config::{ConfigError, PlaceBookConfig};
use crate::db::{Database, DbError};
use crate::logging::init_logging;
use crate::media::{ImageStore, ImageStoreError};
use crate::repo::bookmark_repo::SqliteBookmarkRepository;
use crate::service::bookmark_service::BookmarkService;
use crate::service::tasks::BookmarkTasks;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const WORKER_THREAD_NAME: &str = "placebook-io";

pub type PlaceBookService = BookmarkService<SqliteBookmarkRepository>;
pub type PlaceBookTasks = BookmarkTasks<SqliteBookmarkRepository>;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Image(ImageStoreError),
    Io(std::io::Error),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Image(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for RuntimeError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ImageStoreError> for RuntimeError {
    fn from(value: ImageStoreError) -> Self {
        Self::Image(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Owned PlaceBook core instance.
pub struct PlaceBookRuntime {
    config: PlaceBookConfig,
    db: Database,
    service: Arc<PlaceBookService>,
    tasks: PlaceBookTasks,
    workers: tokio::runtime::Runtime,
}

impl PlaceBookRuntime {
    /// Validates `config`, initializes logging, opens the store and spins up
    /// the worker pool.
    ///
    /// Must not be called from inside an async context.
    pub fn start(config: PlaceBookConfig) -> Result<Self, RuntimeError> {
        let started_at = Instant::now();
        config.validate()?;

        if config.init_logging {
            init_logging(&config.log_level, config.resolved_log_dir())
                .map_err(RuntimeError::Logging)?;
        }

        std::fs::create_dir_all(&config.data_dir)?;
        let db = Database::open(config.db_path(), config.schema_policy)?;
        let images = ImageStore::open(config.image_dir())?;
        let service = Arc::new(BookmarkService::new(
            SqliteBookmarkRepository::new(db.clone()),
            images,
        ));

        let workers = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.worker_threads)
            .thread_name(WORKER_THREAD_NAME)
            .build()?;
        let tasks = BookmarkTasks::new(Arc::clone(&service), workers.handle().clone());

        info!(
            "event=runtime_start module=runtime status=ok worker_threads={} duration_ms={}",
            config.worker_threads,
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            config,
            db,
            service,
            tasks,
            workers,
        })
    }

    pub fn config(&self) -> &PlaceBookConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn service(&self) -> &Arc<PlaceBookService> {
        &self.service
    }

    pub fn tasks(&self) -> &PlaceBookTasks {
        &self.tasks
    }

    /// Stops the worker pool and closes the store.
    ///
    /// Work still queued after the grace period is abandoned; its handles
    /// resolve to `TaskError::Dropped`.
    pub fn shutdown(self) -> Result<(), RuntimeError> {
        let Self { db, workers, .. } = self;
        workers.shutdown_timeout(SHUTDOWN_GRACE);
        if let Err(err) = db.close() {
            warn!("event=runtime_shutdown module=runtime status=error error={err}");
            return Err(err.into());
        }
        info!("event=runtime_shutdown module=runtime status=ok");
        Ok(())
    }
}
