//! Element snapshot model.
//!
//! # Responsibility
//! - Describe one host-model element as the engine sees it: identity, family,
//!   named parameters and the optional placement data used by side logs.
//! - Provide tolerant parameter accessors that never fail on missing data.
//!
//! # Invariants
//! - The engine never creates or deletes elements; snapshots are read-only
//!   views and every mutation goes through a host write batch.
//! - Parameter lookups are by exact name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable host-side element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw parameter value as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// Free text.
    Text(String),
    /// Integer storage (flags, counts).
    Integer(i64),
    /// Floating storage with the host's optional display rendering.
    ///
    /// Angles are stored in radians; `display` carries the user-facing text
    /// (for example `45,00°` or `200 мм`).
    Number {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
    },
}

impl ParamValue {
    /// Convenience constructor for a number without display text.
    pub fn number(value: f64) -> Self {
        Self::Number {
            value,
            display: None,
        }
    }

    /// Textual rendering: display string when present, else the raw value.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Number {
                display: Some(display),
                ..
            } => display.clone(),
            Self::Number { value, .. } => value.to_string(),
        }
    }

    /// Numeric storage value, if the parameter is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Number { value, .. } => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// Point in host model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Axis-aligned bounding box in host model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

/// Read-only view of one host element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    /// Family name for loadable families, element name for system trays.
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl ElementSnapshot {
    /// Creates a snapshot with no parameters or placement data.
    pub fn new(id: i64, family_name: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            family_name: family_name.into(),
            type_name: None,
            params: BTreeMap::new(),
            bounding_box: None,
            location: None,
            host_name: None,
        }
    }

    /// Builder-style parameter insertion, mostly for fixtures and adapters.
    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Builder-style text parameter insertion.
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_param(name, ParamValue::Text(value.into()))
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns the trimmed textual rendering, `None` for missing or blank.
    pub fn param_text(&self, name: &str) -> Option<String> {
        let text = self.param(name)?.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Returns whether an integer-like flag parameter equals `1`.
    pub fn param_flag(&self, name: &str) -> bool {
        match self.param(name) {
            Some(ParamValue::Integer(value)) => *value == 1,
            Some(ParamValue::Number { value, .. }) => (*value - 1.0).abs() < f64::EPSILON,
            Some(ParamValue::Text(value)) => value.trim() == "1",
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementSnapshot, ParamValue};

    #[test]
    fn number_renders_display_text_when_present() {
        let value = ParamValue::Number {
            value: 0.785,
            display: Some("45,00°".to_string()),
        };
        assert_eq!(value.as_text(), "45,00°");
        assert_eq!(ParamValue::number(200.0).as_text(), "200");
    }

    #[test]
    fn param_text_treats_blank_as_missing() {
        let element = ElementSnapshot::new(1, "fam").with_text("GE_Варіант", "   ");
        assert_eq!(element.param_text("GE_Варіант"), None);
        assert_eq!(element.param_text("missing"), None);
    }

    #[test]
    fn param_flag_accepts_integer_number_and_text() {
        let element = ElementSnapshot::new(1, "fam")
            .with_param("Left", ParamValue::Integer(1))
            .with_param("Right", ParamValue::number(0.0))
            .with_text("Top", "1");
        assert!(element.param_flag("Left"));
        assert!(!element.param_flag("Right"));
        assert!(element.param_flag("Top"));
        assert!(!element.param_flag("Bottom"));
    }
}
