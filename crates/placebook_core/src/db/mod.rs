//! SQLite storage bootstrap, schema policy and change tracking.
//!
//! # Responsibility
//! - Open and configure SQLite connections for PlaceBook core.
//! - Apply schema migrations in deterministic order, or recreate the store
//!   when the on-disk schema cannot be migrated.
//! - Own the shared storage handle and its invalidation tracker.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Change notifications are published only after the connection lock is
//!   released.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod handle;
pub mod invalidation;
pub mod migrations;
mod open;

pub use handle::{Database, WeakDatabase};
pub use invalidation::{InvalidationTracker, Subscription, TableChange};
pub use migrations::SchemaPolicy;
pub use open::{open_db, open_db_in_memory, open_db_with_policy};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The handle was closed by `Database::close`.
    Closed,
    /// A thread panicked while holding the connection lock.
    LockPoisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Closed => write!(f, "database handle is closed"),
            Self::LockPoisoned => write!(f, "database connection lock is poisoned"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Closed | Self::LockPoisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
