//! Shared storage handle.
//!
//! # Responsibility
//! - Own one migrated SQLite connection behind a mutex.
//! - Pair the connection with its invalidation tracker.
//! - Provide an explicit close for process shutdown.
//!
//! # Invariants
//! - Every clone refers to the same connection and tracker.
//! - After `close`, every access returns `DbError::Closed`.

use super::invalidation::{InvalidationTracker, Subscription, TableChange};
use super::migrations::SchemaPolicy;
use super::open::{open_db_in_memory, open_db_with_policy};
use super::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, Weak};

struct DatabaseInner {
    conn: Mutex<Option<Connection>>,
    tracker: Arc<InvalidationTracker>,
}

/// Cloneable handle to the bookmark store.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

/// Non-owning handle used by observers so they do not keep the store alive.
#[derive(Clone)]
pub struct WeakDatabase {
    inner: Weak<DatabaseInner>,
}

impl WeakDatabase {
    pub fn upgrade(&self) -> Option<Database> {
        self.inner.upgrade().map(|inner| Database { inner })
    }
}

impl Database {
    /// Opens a file-backed store and applies migrations under `policy`.
    pub fn open(path: impl AsRef<Path>, policy: SchemaPolicy) -> DbResult<Self> {
        Ok(Self::from_connection(open_db_with_policy(path, policy)?))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                conn: Mutex::new(Some(conn)),
                tracker: Arc::new(InvalidationTracker::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDatabase {
        WeakDatabase {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&mut Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut guard = self
            .inner
            .conn
            .lock()
            .map_err(|_| E::from(DbError::LockPoisoned))?;
        let conn = guard.as_mut().ok_or_else(|| E::from(DbError::Closed))?;
        f(conn)
    }

    /// Registers a change observer on this store.
    pub fn subscribe(
        &self,
        observer: impl Fn(&TableChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.tracker.subscribe(observer)
    }

    /// Publishes one committed change. Must be called without the connection
    /// lock held.
    pub fn notify(&self, change: TableChange) {
        self.inner.tracker.publish(change);
    }

    pub fn observer_count(&self) -> usize {
        self.inner.tracker.observer_count()
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .conn
            .lock()
            .map_or(true, |guard| guard.is_none())
    }

    /// Closes the underlying connection. Idempotent.
    pub fn close(&self) -> DbResult<()> {
        let taken = {
            let mut guard = self.inner.conn.lock().map_err(|_| DbError::LockPoisoned)?;
            guard.take()
        };
        if let Some(conn) = taken {
            conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
            info!("event=db_close module=db status=ok");
        }
        Ok(())
    }
}
