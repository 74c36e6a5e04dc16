//! Dimension and angle extraction from element parameters.
//!
//! # Responsibility
//! - Resolve width/height in millimeters from the dedicated parameters or
//!   the combined size string.
//! - Resolve the angle in degrees from radian storage or display text.
//!
//! # Invariants
//! - Extraction never fails: missing width/height degrade to `0`, a missing
//!   or unparsable angle degrades to `None` (distinct from `Some(0.0)`).
//! - Only `required_int_param` reports errors, for rules that must not guess.

use crate::article::format::{parse_int, parse_number, FormatError};
use crate::model::element::{ElementSnapshot, ParamValue};
use crate::model::fields::{PARAM_ANGLE, PARAM_HEIGHT, PARAM_SIZE, PARAM_WIDTH};
use log::warn;
use std::error::Error;
use std::f64::consts::TAU;
use std::fmt::{Display, Formatter};

const SIZE_SEGMENT_SEPARATORS: &[char] = &['-', '–', '—'];
const SIZE_PAIR_SEPARATORS: &[&str] = &["×", "х", "/"];

/// Normalized element geometry consumed by the article builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width_mm: i64,
    pub height_mm: i64,
    pub angle_deg: Option<f64>,
}

/// Required parameter could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    Missing(&'static str),
    Invalid {
        param: &'static str,
        source: FormatError,
    },
}

impl Display for ParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(param) => write!(f, "parameter `{param}` not found"),
            Self::Invalid { param, source } => write!(f, "parameter `{param}`: {source}"),
        }
    }
}

impl Error for ParamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Missing(_) => None,
            Self::Invalid { source, .. } => Some(source),
        }
    }
}

/// Reads width, height and angle from one element.
pub fn extract_dimensions(element: &ElementSnapshot) -> Dimensions {
    let width = size_param_mm(element, PARAM_WIDTH);
    let height = size_param_mm(element, PARAM_HEIGHT);

    let (width_mm, height_mm) = if width > 0 && height > 0 {
        (width, height)
    } else {
        element
            .param_text(PARAM_SIZE)
            .and_then(|raw| parse_size_pairs(&raw).into_iter().next())
            .unwrap_or((0, 0))
    };

    Dimensions {
        width_mm,
        height_mm,
        angle_deg: angle_degrees(element),
    }
}

/// Reads one size parameter in millimeters, `0` when absent or unparsable.
pub fn size_param_mm(element: &ElementSnapshot, name: &str) -> i64 {
    element
        .param_text(name)
        .and_then(|raw| parse_number(&raw).ok())
        .map_or(0, |mm| mm.round_ties_even() as i64)
}

/// Parses combined size strings such as `200x100`, `200 ммх100 мм` or
/// `200/100-200/100` into `(width, height)` pairs.
pub fn parse_size_pairs(raw: &str) -> Vec<(i64, i64)> {
    raw.split(SIZE_SEGMENT_SEPARATORS)
        .filter_map(parse_size_segment)
        .collect()
}

fn parse_size_segment(segment: &str) -> Option<(i64, i64)> {
    let mut normalized: String = segment
        .to_lowercase()
        .replace("мм", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    for separator in SIZE_PAIR_SEPARATORS {
        normalized = normalized.replace(separator, "x");
    }

    let mut parts = normalized.split('x');
    let width = parts.next()?.parse::<i64>().ok()?;
    let height = parts.next()?.parse::<i64>().ok()?;
    Some((width, height))
}

/// Reads the angle in degrees.
///
/// Numeric storage inside `(0, 2π)` is radians; otherwise the display text
/// is parsed after stripping `°` and normalizing the decimal comma.
pub fn angle_degrees(element: &ElementSnapshot) -> Option<f64> {
    let value = element.param(PARAM_ANGLE)?;

    if let ParamValue::Number { value: radians, .. } = value {
        if *radians > 0.0 && *radians < TAU {
            return Some(radians.to_degrees());
        }
    }

    let text = value.as_text().replace('°', "").replace(',', ".");
    match text.trim().parse::<f64>() {
        Ok(degrees) if degrees.is_finite() => Some(degrees),
        _ => {
            warn!(
                "event=angle_extract module=host status=warn element_id={} reason=unparsable",
                element.id
            );
            None
        }
    }
}

/// Reads an integer parameter through the safe numeric parser.
pub fn required_int_param(element: &ElementSnapshot, param: &'static str) -> Result<i64, ParamError> {
    let value = element.param(param).ok_or(ParamError::Missing(param))?;
    parse_int(&value.as_text()).map_err(|source| ParamError::Invalid { param, source })
}
