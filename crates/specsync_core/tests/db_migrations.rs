use specsync_core::db::migrations::{apply_migrations, latest_version};
use specsync_core::db::{create_catalog, create_catalog_in_memory, open_catalog, DbError};
use rusqlite::Connection;
use tempfile::TempDir;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_catalog_reaches_latest_version() {
    let conn = create_catalog_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let index_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_catalog_raw_article';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index_count, 1);
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = create_catalog_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(user_version(&conn), latest_version());
}

#[test]
fn newer_schema_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}

#[test]
fn external_catalog_without_user_version_opens_read_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gerpaas.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE catalog_raw (spec_article TEXT NOT NULL, spec_description TEXT, kg_per_unit REAL);
             INSERT INTO catalog_raw VALUES ('GE-KT2-20-A100-1,2-PG', 'Лоток', 2.5);",
        )
        .unwrap();
    }

    let conn = open_catalog(&path).unwrap();
    assert_eq!(user_version(&conn), 0);
}

#[test]
fn file_catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");
    drop(create_catalog(&path).unwrap());

    let conn = create_catalog(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
}
