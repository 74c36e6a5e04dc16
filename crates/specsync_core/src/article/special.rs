//! Named special-case articles: reducers and bend connectors.
//!
//! # Responsibility
//! - Recognize the fixed family names that bypass the general builder.
//! - Validate their preconditions and assemble their bespoke codes.
//!
//! # Invariants
//! - Reducers require height `100` and a second width above `100`.
//! - Connectors require height `50` or `100`; thickness is fixed by height
//!   and the run's thickness selection is ignored.

use crate::article::format::coating_code;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const REDUCER_FAMILY: &str = "470_DKC_S5_Lightweight Reducer";
pub const HORIZONTAL_CONNECTOR_FAMILY: &str = "470_DKC_S5_Horizontal Bend_CPO0-45";
pub const INNER_VERTICAL_CONNECTOR_FAMILY: &str = "470_DKC_S5_Int Vertical Bend_1-89";
pub const OUTER_VERTICAL_CONNECTOR_FAMILY: &str = "470_DKC_S5_Ext Vertical Bend_1-89";

pub const REDUCER_HEIGHT_MM: i64 = 100;
pub const REDUCER_MIN_SECOND_WIDTH_MM: i64 = 100;
const REDUCER_FIRST_WIDTH_CM: i64 = 10;
const REDUCER_THICKNESS: &str = "2,0";

/// Variant value that turns a vertical bend into an `SDE` connector.
pub const SDE_VARIANT: &str = "SDE";

/// Family handled by a bespoke rule instead of the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    Reducer,
    HorizontalConnector,
    VerticalConnector,
}

impl SpecialKind {
    pub fn from_family(family_name: &str) -> Option<Self> {
        let name = family_name.trim();
        if name.eq_ignore_ascii_case(REDUCER_FAMILY) {
            Some(Self::Reducer)
        } else if name.eq_ignore_ascii_case(HORIZONTAL_CONNECTOR_FAMILY) {
            Some(Self::HorizontalConnector)
        } else if name.eq_ignore_ascii_case(INNER_VERTICAL_CONNECTOR_FAMILY)
            || name.eq_ignore_ascii_case(OUTER_VERTICAL_CONNECTOR_FAMILY)
        {
            Some(Self::VerticalConnector)
        } else {
            None
        }
    }
}

/// Reducer offset direction from the `Left`/`Right` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerDirection {
    Symmetric,
    Left,
    Right,
}

impl ReducerDirection {
    /// `Right` wins when both flags are set.
    pub fn from_flags(left: bool, right: bool) -> Self {
        if right {
            Self::Right
        } else if left {
            Self::Left
        } else {
            Self::Symmetric
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Symmetric => "R",
            Self::Left => "RL",
            Self::Right => "RR",
        }
    }
}

/// Connector product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorLine {
    /// Horizontal bend connector.
    Yde,
    /// Vertical bend connector, only on explicit `SDE` variant.
    Sde,
}

impl ConnectorLine {
    fn prefix(self) -> &'static str {
        match self {
            Self::Yde => "GE-YDE",
            Self::Sde => "GE-SDE",
        }
    }
}

/// Precondition failure of a special-case rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialRuleError {
    ReducerHeight(i64),
    ReducerSecondWidth(i64),
    ConnectorHeight(i64),
}

impl Display for SpecialRuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReducerHeight(height) => write!(
                f,
                "reducer height {height} mm is not in the catalog (only {REDUCER_HEIGHT_MM} mm is allowed)"
            ),
            Self::ReducerSecondWidth(width) => write!(
                f,
                "reducer second width {width} mm is not allowed (must be > {REDUCER_MIN_SECOND_WIDTH_MM} mm)"
            ),
            Self::ConnectorHeight(height) => {
                write!(f, "connector height {height} mm is not in the catalog (50 or 100 mm)")
            }
        }
    }
}

impl Error for SpecialRuleError {}

/// Builds `GE-KT2-<dir>-10-<w2cm>-A100-2,0-<coat>`.
pub fn reducer_article(
    height_mm: i64,
    second_width_mm: i64,
    direction: ReducerDirection,
    coating: &str,
) -> Result<String, SpecialRuleError> {
    if height_mm != REDUCER_HEIGHT_MM {
        return Err(SpecialRuleError::ReducerHeight(height_mm));
    }
    if second_width_mm <= REDUCER_MIN_SECOND_WIDTH_MM {
        return Err(SpecialRuleError::ReducerSecondWidth(second_width_mm));
    }

    Ok(format!(
        "GE-KT2-{}-{}-{}-A{}-{}-{}",
        direction.token(),
        REDUCER_FIRST_WIDTH_CM,
        second_width_mm / 10,
        REDUCER_HEIGHT_MM,
        REDUCER_THICKNESS,
        coating_code(coating)
    ))
}

/// Builds `GE-YDE-<h>-<thk>-<coat>` or `GE-SDE-<h>-<thk>-<coat>`.
pub fn connector_article(
    line: ConnectorLine,
    height_mm: i64,
    coating: &str,
) -> Result<String, SpecialRuleError> {
    let thickness = match height_mm {
        50 => "1,5",
        100 => "2,0",
        other => return Err(SpecialRuleError::ConnectorHeight(other)),
    };
    Ok(format!(
        "{}-{height_mm}-{thickness}-{}",
        line.prefix(),
        coating_code(coating)
    ))
}
