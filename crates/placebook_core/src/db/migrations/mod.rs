//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Recreate the store empty when the on-disk schema is not migratable and
//!   the policy allows it.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Destructive recreation drops every user table in one transaction.

use crate::db::{DbError, DbResult};
use log::warn;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_bookmarks.sql"),
}];

/// What to do when the on-disk schema version has no migration path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Drop all tables and rebuild an empty store at the latest version.
    #[default]
    DestructiveFallback,
    /// Refuse to open and return `DbError::UnsupportedSchemaVersion`.
    Strict,
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// The version check and every migration run inside one immediate
/// transaction, so concurrent first opens of the same file serialize.
pub fn apply_migrations(conn: &mut Connection, policy: SchemaPolicy) -> DbResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut current_version = current_user_version(&tx)?;
    let latest = latest_version();

    if current_version > latest {
        match policy {
            SchemaPolicy::Strict => {
                return Err(DbError::UnsupportedSchemaVersion {
                    db_version: current_version,
                    latest_supported: latest,
                });
            }
            SchemaPolicy::DestructiveFallback => {
                warn!(
                    "event=db_recreate module=db status=start db_version={} latest_supported={}",
                    current_version, latest
                );
                drop_all_tables(&tx)?;
                current_version = 0;
            }
        }
    }

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> DbResult<()> {
    let tables = {
        let mut stmt = conn.prepare(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%';",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        names
    };

    for table in &tables {
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{}\";",
            table.replace('"', "\"\"")
        ))?;
    }
    conn.execute_batch("PRAGMA user_version = 0;")?;

    warn!(
        "event=db_recreate module=db status=ok dropped_tables={}",
        tables.len()
    );
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
