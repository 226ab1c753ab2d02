//! Bookmark repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `bookmarks` table.
//! - Provide reactive queries that re-emit full snapshots after writes.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Bookmark::validate()` before SQL mutations.
//! - Inserts ignore id conflicts; updates replace the whole row and are a
//!   no-op for unknown ids.
//! - A change is published only when a write changed at least one row.
//! - List queries skip persisted rows that fail validation; point lookups
//!   report them as `RepoError::InvalidData`.

use crate::db::{Database, DbError, Subscription, TableChange};
use crate::model::bookmark::{Bookmark, BookmarkId, BookmarkValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub const BOOKMARKS_TABLE: &str = "bookmarks";

const BOOKMARK_SELECT_SQL: &str = "SELECT
    id,
    place_id,
    name,
    address,
    latitude,
    longitude,
    phone,
    notes,
    category
FROM bookmarks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for bookmark persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookmarkValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted bookmark data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BookmarkValidationError> for RepoError {
    fn from(value: BookmarkValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for bookmark records.
pub trait BookmarkRepository {
    /// Inserts a bookmark. Returns `None` when an existing row with the same
    /// id made the insert a no-op.
    fn insert_bookmark(&self, bookmark: &Bookmark) -> RepoResult<Option<BookmarkId>>;
    /// Replaces the row matching `bookmark.id`. Returns whether a row changed.
    fn update_bookmark(&self, bookmark: &Bookmark) -> RepoResult<bool>;
    fn load_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>>;
    fn load_all(&self) -> RepoResult<Vec<Bookmark>>;
    /// Deletes by id. Returns whether a row was removed.
    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<bool>;
    /// Emits the current list immediately, then again after every change.
    fn observe_all<F>(&self, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Vec<Bookmark>) + Send + Sync + 'static;
    /// Emits the current record immediately, then again after every change
    /// to that id. Emits `None` once the record is gone.
    fn observe_bookmark<F>(&self, id: BookmarkId, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Option<Bookmark>) + Send + Sync + 'static;
}

/// SQLite-backed bookmark repository over a shared `Database` handle.
#[derive(Clone)]
pub struct SqliteBookmarkRepository {
    db: Database,
}

impl SqliteBookmarkRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn publish(&self, row_id: BookmarkId) {
        self.db.notify(TableChange {
            table: BOOKMARKS_TABLE,
            row_id: Some(row_id),
        });
    }
}

impl BookmarkRepository for SqliteBookmarkRepository {
    fn insert_bookmark(&self, bookmark: &Bookmark) -> RepoResult<Option<BookmarkId>> {
        bookmark.validate()?;

        let inserted = self.db.with_conn(|conn| -> RepoResult<Option<BookmarkId>> {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO bookmarks (
                    id,
                    place_id,
                    name,
                    address,
                    latitude,
                    longitude,
                    phone,
                    notes,
                    category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    bookmark.id,
                    bookmark.place_id.as_deref(),
                    bookmark.name.as_str(),
                    bookmark.address.as_str(),
                    bookmark.latitude,
                    bookmark.longitude,
                    bookmark.phone.as_str(),
                    bookmark.notes.as_str(),
                    bookmark.category.as_str(),
                ],
            )?;

            if changed == 0 {
                return Ok(None);
            }
            Ok(Some(conn.last_insert_rowid()))
        })?;

        match inserted {
            Some(id) => {
                debug!("event=bookmark_insert module=repo status=ok bookmark_id={id}");
                self.publish(id);
            }
            None => warn!(
                "event=bookmark_insert module=repo status=ignored reason=id_conflict bookmark_id={}",
                bookmark.id.unwrap_or_default()
            ),
        }
        Ok(inserted)
    }

    fn update_bookmark(&self, bookmark: &Bookmark) -> RepoResult<bool> {
        let Some(id) = bookmark.id else {
            return Ok(false);
        };
        bookmark.validate()?;

        let changed = self.db.with_conn(|conn| -> RepoResult<usize> {
            Ok(conn.execute(
                "UPDATE OR REPLACE bookmarks
                 SET
                    place_id = ?2,
                    name = ?3,
                    address = ?4,
                    latitude = ?5,
                    longitude = ?6,
                    phone = ?7,
                    notes = ?8,
                    category = ?9
                 WHERE id = ?1;",
                params![
                    id,
                    bookmark.place_id.as_deref(),
                    bookmark.name.as_str(),
                    bookmark.address.as_str(),
                    bookmark.latitude,
                    bookmark.longitude,
                    bookmark.phone.as_str(),
                    bookmark.notes.as_str(),
                    bookmark.category.as_str(),
                ],
            )?)
        })?;

        if changed == 0 {
            debug!("event=bookmark_update module=repo status=noop bookmark_id={id}");
            return Ok(false);
        }
        self.publish(id);
        Ok(true)
    }

    fn load_bookmark(&self, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
        self.db.with_conn(|conn| load_bookmark_in(conn, id))
    }

    fn load_all(&self) -> RepoResult<Vec<Bookmark>> {
        self.db.with_conn(|conn| load_all_in(conn))
    }

    fn delete_bookmark(&self, id: BookmarkId) -> RepoResult<bool> {
        let changed = self.db.with_conn(|conn| -> RepoResult<usize> {
            Ok(conn.execute("DELETE FROM bookmarks WHERE id = ?1;", [id])?)
        })?;

        if changed == 0 {
            return Ok(false);
        }
        debug!("event=bookmark_delete module=repo status=ok bookmark_id={id}");
        self.publish(id);
        Ok(true)
    }

    fn observe_all<F>(&self, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Vec<Bookmark>) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let emit = Arc::clone(&callback);
        let weak_db = self.db.downgrade();

        let subscription = self.db.subscribe(move |change| {
            if change.table != BOOKMARKS_TABLE {
                return;
            }
            let Some(db) = weak_db.upgrade() else {
                return;
            };
            match db.with_conn(|conn| load_all_in(conn)) {
                Ok(bookmarks) => emit(bookmarks),
                Err(err) => warn!(
                    "event=bookmark_observe module=repo status=error scope=all error={err}"
                ),
            }
        });

        callback(self.load_all()?);
        Ok(subscription)
    }

    fn observe_bookmark<F>(&self, id: BookmarkId, callback: F) -> RepoResult<Subscription>
    where
        F: Fn(Option<Bookmark>) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let emit = Arc::clone(&callback);
        let weak_db = self.db.downgrade();

        let subscription = self.db.subscribe(move |change| {
            if change.table != BOOKMARKS_TABLE {
                return;
            }
            if change.row_id.is_some_and(|row_id| row_id != id) {
                return;
            }
            let Some(db) = weak_db.upgrade() else {
                return;
            };
            match db.with_conn(|conn| load_bookmark_in(conn, id)) {
                Ok(bookmark) => emit(bookmark),
                Err(err) => warn!(
                    "event=bookmark_observe module=repo status=error scope=one bookmark_id={id} error={err}"
                ),
            }
        });

        callback(self.load_bookmark(id)?);
        Ok(subscription)
    }
}

fn load_bookmark_in(conn: &Connection, id: BookmarkId) -> RepoResult<Option<Bookmark>> {
    let mut stmt = conn.prepare(&format!("{BOOKMARK_SELECT_SQL} WHERE id = ?1;"))?;
    let raw = stmt
        .query_row([id], |row| Ok(read_row(row)))
        .optional()?;
    raw.transpose()
}

fn load_all_in(conn: &Connection) -> RepoResult<Vec<Bookmark>> {
    let mut stmt = conn.prepare(&format!("{BOOKMARK_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut bookmarks = Vec::new();

    while let Some(row) = rows.next()? {
        match read_row(row) {
            Ok(bookmark) => bookmarks.push(bookmark),
            Err(RepoError::InvalidData(message)) => {
                warn!("event=bookmark_load module=repo status=skipped error={message}");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(bookmarks)
}

fn read_row(row: &Row<'_>) -> RepoResult<Bookmark> {
    let bookmark = Bookmark {
        id: Some(row.get("id")?),
        place_id: row.get("place_id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        phone: row.get("phone")?,
        notes: row.get("notes")?,
        category: row.get("category")?,
    };

    bookmark.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "bookmark {} failed validation: {err}",
            bookmark.id.unwrap_or_default()
        ))
    })?;
    Ok(bookmark)
}
