//! SQLite catalog storage bootstrap.
//!
//! # Responsibility
//! - Open the parts catalog read-only for lookups.
//! - Create writable catalogs with the schema applied (imports, fixtures).
//!
//! # Invariants
//! - Read-only opens never mutate the file, migrations included.
//! - Writable catalogs track their schema version via `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{create_catalog, create_catalog_in_memory, open_catalog, CATALOG_TABLE};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Catalog file does not exist.
    MissingStore(PathBuf),
    /// Catalog file lacks the expected table.
    MissingTable(&'static str),
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
                "catalog schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingStore(path) => write!(f, "catalog file not found: {}", path.display()),
            Self::MissingTable(table) => write!(f, "catalog table `{table}` not found"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingStore(_) | Self::MissingTable(_) => {
                None
            }
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
