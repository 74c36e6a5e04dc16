//! Family-to-rule mapping table.
//!
//! # Responsibility
//! - Hold one `MappingRow` per family identifier, loaded once per run.
//! - Parse the `[FamilyMap]` section: `Family = base | category | additional`.
//!
//! # Invariants
//! - Family lookup is case-insensitive.
//! - A field written as `-` is stored as an explicit empty string.
//! - Later duplicate keys overwrite earlier ones.
//! - The table is immutable once built; runs receive it by reference.

use crate::config::ini::IniDocument;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const FAMILY_MAP_SECTION: &str = "FamilyMap";

const EMPTY_MARKER: &str = "-";

/// Base article, category label and auxiliary text for one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    pub family_name: String,
    pub base_article: String,
    pub category: String,
    pub additional: String,
}

impl MappingRow {
    /// Parses the right-hand side of one `[FamilyMap]` entry.
    pub fn parse(family_name: &str, value: &str) -> Self {
        let mut parts = value.split('|').map(normalize_field);
        Self {
            family_name: family_name.trim().to_string(),
            base_article: parts.next().unwrap_or_default(),
            category: parts.next().unwrap_or_default(),
            additional: parts.next().unwrap_or_default(),
        }
    }
}

/// Immutable family lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    rows: HashMap<String, MappingRow>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from rows; later rows win on duplicate families.
    pub fn from_rows(rows: impl IntoIterator<Item = MappingRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(row);
        }
        table
    }

    /// Reads the `[FamilyMap]` section; other sections are ignored.
    pub fn from_ini(doc: &IniDocument) -> Self {
        let Some(section) = doc.section(FAMILY_MAP_SECTION) else {
            info!("event=mapping_load module=mapping status=ok rows=0 reason=section_missing");
            return Self::new();
        };

        let table = Self::from_rows(
            section
                .entries()
                .map(|(family, value)| MappingRow::parse(family, value)),
        );
        info!(
            "event=mapping_load module=mapping status=ok rows={}",
            table.len()
        );
        table
    }

    pub fn get(&self, family_name: &str) -> Option<&MappingRow> {
        self.rows.get(&family_key(family_name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn insert(&mut self, row: MappingRow) {
        self.rows.insert(family_key(&row.family_name), row);
    }
}

fn family_key(family_name: &str) -> String {
    family_name.trim().to_lowercase()
}

fn normalize_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == EMPTY_MARKER {
        return String::new();
    }
    trimmed.to_string()
}
