//! Catalog repository contracts, SQLite implementation and degraded store.
//!
//! # Responsibility
//! - Resolve finished article codes to catalog rows by exact match.
//! - Offer prefix search for near-match suggestions.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Exact lookups never pick among duplicates: more than one row yields a
//!   count with no entry.
//! - `CatalogStore` never fails a lookup; open and query errors degrade to
//!   "not found" and are logged.

use crate::db::{open_catalog, DbError};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const PREFIX_DEFAULT_LIMIT: u32 = 10;
const PREFIX_LIMIT_MAX: u32 = 50;

const CATALOG_SELECT_SQL: &str = "SELECT
    spec_article,
    spec_description,
    kg_per_unit
FROM catalog_raw";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
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

/// One catalog row.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub article: String,
    /// Empty when the row stores `NULL`.
    pub description: String,
    /// Mass in kg per meter (linear stock) or per piece.
    pub mass_per_unit: Option<f64>,
}

impl CatalogEntry {
    pub fn new(article: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            article: article.into(),
            description: description.into(),
            mass_per_unit: None,
        }
    }

    pub fn with_mass(mut self, kg: f64) -> Self {
        self.mass_per_unit = Some(kg);
        self
    }
}

/// Outcome of an exact lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogLookup {
    pub match_count: usize,
    /// Present only when exactly one row matched.
    pub entry: Option<CatalogEntry>,
}

impl CatalogLookup {
    pub fn not_found() -> Self {
        Self::default()
    }

    fn from_rows(mut rows: Vec<CatalogEntry>) -> Self {
        let match_count = rows.len();
        let entry = if match_count == 1 { rows.pop() } else { None };
        Self { match_count, entry }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.match_count > 1
    }
}

/// Read interface over catalog rows.
pub trait CatalogRepository {
    fn find_exact(&self, article: &str) -> RepoResult<CatalogLookup>;
    /// Rows whose article starts with `prefix`, sorted by article.
    fn find_by_prefix(&self, prefix: &str, limit: Option<u32>) -> RepoResult<Vec<CatalogEntry>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn find_exact(&self, article: &str) -> RepoResult<CatalogLookup> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{CATALOG_SELECT_SQL} WHERE spec_article = ?1;"))?;
        let rows = stmt
            .query_map([article], parse_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CatalogLookup::from_rows(rows))
    }

    fn find_by_prefix(&self, prefix: &str, limit: Option<u32>) -> RepoResult<Vec<CatalogEntry>> {
        let limit = normalize_limit(limit);
        let pattern = format!("{}%", escape_like(prefix));
        let mut stmt = self.conn.prepare_cached(&format!(
            "{CATALOG_SELECT_SQL}
             WHERE spec_article LIKE ?1 ESCAPE '\\'
             ORDER BY spec_article ASC
             LIMIT ?2;"
        ))?;
        let rows = stmt
            .query_map(params![pattern, i64::from(limit)], parse_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Inserts rows in one transaction and returns the inserted count.
pub fn import_entries(conn: &mut Connection, entries: &[CatalogEntry]) -> RepoResult<usize> {
    if let Some(blank) = entries.iter().find(|entry| entry.article.trim().is_empty()) {
        return Err(RepoError::InvalidData(format!(
            "empty article for description `{}`",
            blank.description
        )));
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO catalog_raw (spec_article, spec_description, kg_per_unit)
             VALUES (?1, ?2, ?3);",
        )?;
        for entry in entries {
            let description = (!entry.description.is_empty()).then_some(entry.description.as_str());
            stmt.execute(params![entry.article, description, entry.mass_per_unit])?;
        }
    }
    tx.commit()?;
    Ok(entries.len())
}

/// Catalog handle held for one run.
///
/// Owns at most one open connection; without one every lookup is
/// "not found".
pub struct CatalogStore {
    conn: Option<Connection>,
}

impl CatalogStore {
    /// Opens `path` read-only. Failure is logged here once and yields an
    /// unavailable store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match open_catalog(path) {
            Ok(conn) => Self { conn: Some(conn) },
            Err(err) => {
                warn!(
                    "event=catalog_store module=repo status=degraded path={} error={}",
                    path.display(),
                    err
                );
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { conn: None }
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    pub fn find_exact(&self, article: &str) -> CatalogLookup {
        let Some(conn) = &self.conn else {
            return CatalogLookup::not_found();
        };
        match SqliteCatalogRepository::new(conn).find_exact(article) {
            Ok(lookup) => lookup,
            Err(err) => {
                warn!(
                    "event=catalog_lookup module=repo status=error article={} error={}",
                    article, err
                );
                CatalogLookup::not_found()
            }
        }
    }

    pub fn find_by_prefix(&self, prefix: &str, limit: Option<u32>) -> Vec<CatalogEntry> {
        let Some(conn) = &self.conn else {
            return Vec::new();
        };
        SqliteCatalogRepository::new(conn)
            .find_by_prefix(prefix, limit)
            .unwrap_or_else(|err| {
                debug!(
                    "event=catalog_prefix module=repo status=error prefix={} error={}",
                    prefix, err
                );
                Vec::new()
            })
    }
}

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    let article: String = row.get(0)?;
    let mass_per_unit = mass_from_value(&article, row.get(2)?);
    Ok(CatalogEntry {
        article,
        description: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        mass_per_unit,
    })
}

/// Reads `kg_per_unit` leniently; a bad mass never costs the row.
///
/// External catalogs may store locale text such as `2,4`.
fn mass_from_value(article: &str, value: Value) -> Option<f64> {
    let parsed = match value {
        Value::Null => return None,
        Value::Integer(kg) => Some(kg as f64),
        Value::Real(kg) => Some(kg),
        Value::Text(raw) => raw
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|kg| kg.is_finite()),
        Value::Blob(_) => None,
    };
    if parsed.is_none() {
        warn!(
            "event=catalog_mass module=repo status=warn article={} reason=unparsable",
            article
        );
    }
    parsed
}

fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PREFIX_DEFAULT_LIMIT,
        Some(value) => value.min(PREFIX_LIMIT_MAX),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
