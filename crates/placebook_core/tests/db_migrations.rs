use placebook_core::db::migrations::latest_version;
use placebook_core::db::{open_db, open_db_in_memory, open_db_with_policy, DbError, SchemaPolicy};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "bookmarks");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placebook.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO bookmarks (name) VALUES ('Corner Cafe');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_eq!(bookmark_count(&conn_second), 1);
}

#[test]
fn newer_schema_is_recreated_empty_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE bookmarks (id INTEGER PRIMARY KEY, legacy TEXT);
         INSERT INTO bookmarks (legacy) VALUES ('stale');
         CREATE TABLE leftovers (value TEXT);
         PRAGMA user_version = 999;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "bookmarks");
    assert_eq!(bookmark_count(&conn), 0);
    assert!(!table_exists(&conn, "leftovers"));
}

#[test]
fn newer_schema_is_rejected_under_strict_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db_with_policy(&path, SchemaPolicy::Strict).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn bookmark_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        table_exists(conn, table_name),
        "table {table_name} does not exist"
    );
}
