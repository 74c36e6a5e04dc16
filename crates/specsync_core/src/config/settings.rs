//! Run-wide coating/thickness selection.
//!
//! # Responsibility
//! - Resolve the user's current thickness and coating choice from the
//!   `[Combobocks_Setting]` section, with stable defaults.
//! - Expose the option lists offered to the selection surface.
//!
//! # Invariants
//! - Resolution never fails: unparsable thickness falls back to
//!   `DEFAULT_THICKNESS_MM` with a warning.

use crate::article::format::parse_number;
use crate::config::ini::IniDocument;
use log::warn;
use serde::{Deserialize, Serialize};

pub const SETTINGS_SECTION: &str = "Combobocks_Setting";
pub const DEFAULT_THICKNESS_MM: f64 = 0.8;
pub const DEFAULT_COATING: &str = "Сендзимір";

const KEY_THICKNESS_CURRENT: &str = "ThkCur";
const KEY_COATING_CURRENT: &str = "CoatCur";
const KEY_THICKNESS_SET: &str = "ThkSet";
const KEY_COATING_SET: &str = "CoatSet";

const DEFAULT_THICKNESS_SET: &str = "1,0 мм | 1,2 мм | 1,5 мм | 2,0 мм";
const DEFAULT_COATING_SET: &str = "Сендзимир | Занурення";

/// Global selection applied to every element built by the default path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub thickness_mm: f64,
    pub coating: String,
    pub thickness_options: Vec<String>,
    pub coating_options: Vec<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            thickness_mm: DEFAULT_THICKNESS_MM,
            coating: DEFAULT_COATING.to_string(),
            thickness_options: split_options(DEFAULT_THICKNESS_SET),
            coating_options: split_options(DEFAULT_COATING_SET),
        }
    }
}

impl SyncSettings {
    /// Reads the selection section; absent keys keep their defaults.
    pub fn from_ini(doc: &IniDocument) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = doc.get(SETTINGS_SECTION, KEY_THICKNESS_CURRENT) {
            settings.thickness_mm = parse_thickness_mm(raw);
        }
        if let Some(raw) = doc.get(SETTINGS_SECTION, KEY_COATING_CURRENT) {
            if !raw.trim().is_empty() {
                settings.coating = raw.trim().to_string();
            }
        }
        if let Some(raw) = doc.get(SETTINGS_SECTION, KEY_THICKNESS_SET) {
            let options = split_options(raw);
            if !options.is_empty() {
                settings.thickness_options = options;
            }
        }
        if let Some(raw) = doc.get(SETTINGS_SECTION, KEY_COATING_SET) {
            let options = split_options(raw);
            if !options.is_empty() {
                settings.coating_options = options;
            }
        }

        settings
    }

    /// Overrides the thickness from free text such as `1,5 мм`.
    pub fn with_thickness_text(mut self, raw: &str) -> Self {
        self.thickness_mm = parse_thickness_mm(raw);
        self
    }

    pub fn with_coating(mut self, coating: impl Into<String>) -> Self {
        self.coating = coating.into();
        self
    }
}

/// Parses a thickness selection, falling back to the default on bad input.
pub fn parse_thickness_mm(raw: &str) -> f64 {
    match parse_number(raw) {
        Ok(value) if value > 0.0 => value,
        Ok(value) => {
            warn!(
                "event=settings_thickness module=config status=warn reason=non_positive value={} fallback={}",
                value, DEFAULT_THICKNESS_MM
            );
            DEFAULT_THICKNESS_MM
        }
        Err(err) => {
            warn!(
                "event=settings_thickness module=config status=warn reason=unparsable error={} fallback={}",
                err, DEFAULT_THICKNESS_MM
            );
            DEFAULT_THICKNESS_MM
        }
    }
}

fn split_options(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}
