//! Article code formatting helpers.
//!
//! # Responsibility
//! - Convert coating names, thickness, width and height into the fixed
//!   tokens of the article grammar.
//! - Parse free-text numeric parameter values.
//!
//! # Invariants
//! - Token helpers are pure apart from warnings; bad input is replaced by a
//!   documented default, never an error.
//! - Thickness always renders with one decimal and a comma separator.

use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const COATING_PREGALVANIZED: &str = "PG";
pub const COATING_HOT_DIP: &str = "HDG";
pub const COATING_ALUMINUM: &str = "AL";

pub const DEFAULT_THICKNESS_MM: f64 = 1.0;
pub const DEFAULT_WIDTH_CM: i64 = 1;
pub const DEFAULT_HEIGHT_MM: i64 = 100;

const UNIT_SUFFIXES: &[&str] = &["мм", "mm"];

/// Free-text numeric parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    EmptyValue,
    InvalidNumber(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "empty value"),
            Self::InvalidNumber(raw) => write!(f, "invalid number `{raw}`"),
        }
    }
}

impl Error for FormatError {}

/// Maps a coating name to its article token.
///
/// Matching is a case-insensitive substring check; unknown or empty names
/// fall back to `PG` with a warning.
pub fn coating_code(name: &str) -> &'static str {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        warn!(
            "event=format_coating module=article status=warn reason=empty fallback={}",
            COATING_PREGALVANIZED
        );
        return COATING_PREGALVANIZED;
    }

    if normalized.contains("сендз") {
        return COATING_PREGALVANIZED;
    }
    if normalized.contains("занур") || normalized.contains("цинк") {
        return COATING_HOT_DIP;
    }
    if normalized.contains("алюм") {
        return COATING_ALUMINUM;
    }

    warn!(
        "event=format_coating module=article status=warn reason=unknown coating={} fallback={}",
        name.trim(),
        COATING_PREGALVANIZED
    );
    COATING_PREGALVANIZED
}

/// Renders thickness as `X,X`.
pub fn thickness_text(mm: f64) -> String {
    let mm = if mm > 0.0 {
        mm
    } else {
        warn!(
            "event=format_thickness module=article status=warn value={} fallback={}",
            mm, DEFAULT_THICKNESS_MM
        );
        DEFAULT_THICKNESS_MM
    };
    format!("{mm:.1}").replace('.', ",")
}

/// Converts millimeters to whole centimeters (`200 -> 20`).
pub fn width_cm(mm: i64) -> i64 {
    if mm <= 0 {
        warn!(
            "event=format_width module=article status=warn value_mm={} fallback_cm={}",
            mm, DEFAULT_WIDTH_CM
        );
        return DEFAULT_WIDTH_CM;
    }
    mm / 10
}

/// Renders the height segment `A<mm>`.
pub fn height_token(mm: i64) -> String {
    let mm = if mm > 0 {
        mm
    } else {
        warn!(
            "event=format_height module=article status=warn value_mm={} fallback_mm={}",
            mm, DEFAULT_HEIGHT_MM
        );
        DEFAULT_HEIGHT_MM
    };
    format!("A{mm}")
}

/// Parses free text such as `200 мм` or `1,5` into a float.
pub fn parse_number(raw: &str) -> Result<f64, FormatError> {
    let normalized = normalize_numeric_text(raw)?;
    if let Ok(value) = normalized.parse::<i64>() {
        return Ok(value as f64);
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(FormatError::InvalidNumber(normalized))
}

/// Parses free text into an integer, rounding fractional values.
pub fn parse_int(raw: &str) -> Result<i64, FormatError> {
    let normalized = normalize_numeric_text(raw)?;
    if let Ok(value) = normalized.parse::<i64>() {
        return Ok(value);
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.round_ties_even() as i64)
        .ok_or(FormatError::InvalidNumber(normalized))
}

fn normalize_numeric_text(raw: &str) -> Result<String, FormatError> {
    let mut text = raw.trim().to_lowercase();
    if text.is_empty() {
        return Err(FormatError::EmptyValue);
    }
    for suffix in UNIT_SUFFIXES {
        text = text.replace(suffix, "");
    }
    let text: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if text.is_empty() {
        return Err(FormatError::EmptyValue);
    }
    Ok(text)
}
