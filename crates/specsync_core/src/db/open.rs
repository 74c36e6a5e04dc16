//! Catalog connection bootstrap.
//!
//! # Responsibility
//! - Open an existing catalog file read-only and check its table.
//! - Create writable file or in-memory catalogs with migrations applied.
//!
//! # Invariants
//! - `open_catalog` never creates a file; a missing path is `MissingStore`.
//! - Returned writable connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Table holding raw catalog rows.
pub const CATALOG_TABLE: &str = "catalog_raw";

/// Opens an existing catalog file for lookups only.
///
/// # Side effects
/// - Emits `catalog_open` logging events with duration and status.
pub fn open_catalog(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=catalog_open module=db status=start mode=read_only path={}",
        path.display()
    );

    let result = open_read_only(path);
    match &result {
        Ok(_) => info!(
            "event=catalog_open module=db status=ok mode=read_only duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=catalog_open module=db status=error mode=read_only duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Creates (or opens) a writable catalog file and applies migrations.
pub fn create_catalog(path: impl AsRef<Path>) -> DbResult<Connection> {
    let mut conn = Connection::open(path)?;
    bootstrap_writable(&mut conn)?;
    info!("event=catalog_create module=db status=ok mode=file");
    Ok(conn)
}

/// Creates an in-memory writable catalog with migrations applied.
pub fn create_catalog_in_memory() -> DbResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_writable(&mut conn)?;
    info!("event=catalog_create module=db status=ok mode=memory");
    Ok(conn)
}

fn open_read_only(path: &Path) -> DbResult<Connection> {
    if !path.is_file() {
        return Err(DbError::MissingStore(path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_catalog_table(&conn)?;
    Ok(conn)
}

fn bootstrap_writable(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)
}

fn ensure_catalog_table(conn: &Connection) -> DbResult<()> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [CATALOG_TABLE],
        |row| row.get(0),
    )?;
    if found == 0 {
        return Err(DbError::MissingTable(CATALOG_TABLE));
    }
    Ok(())
}
