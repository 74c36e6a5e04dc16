//! Fixed base prefixes for bend family archetypes.
//!
//! Six archetypes are keyed by family-name substring; the angle picks the
//! `90` variant at or above `RIGHT_ANGLE_THRESHOLD_DEG`, else the `45` one.
//! Covers are listed before bends so the more specific name wins.
//! Archetype prefixes already carry the angle, so their shape is fixed with
//! no further angle splice.

use crate::article::builder::{AngleRule, TemplateKind};

/// Angles at or above this threshold select the 90° variant.
pub const RIGHT_ANGLE_THRESHOLD_DEG: f64 = 80.0;

/// One bend family archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BendArchetype {
    pub family_marker: &'static str,
    pub right_angle_prefix: &'static str,
    pub half_angle_prefix: &'static str,
    pub is_cover: bool,
}

impl BendArchetype {
    /// Shape used to extend the prefix into a full code.
    pub fn template_kind(&self) -> TemplateKind {
        if self.is_cover {
            TemplateKind::Cover(AngleRule::Never)
        } else {
            TemplateKind::Fitting(AngleRule::Never)
        }
    }

    pub fn prefix_for(&self, angle: Option<f64>) -> &'static str {
        let right_angle = angle.map_or(true, |degrees| degrees >= RIGHT_ANGLE_THRESHOLD_DEG);
        if right_angle {
            self.right_angle_prefix
        } else {
            self.half_angle_prefix
        }
    }
}

pub const BEND_ARCHETYPES: &[BendArchetype] = &[
    BendArchetype {
        family_marker: "horizontal bend cover",
        right_angle_prefix: "GE-DK90-",
        half_angle_prefix: "GE-DK45-",
        is_cover: true,
    },
    BendArchetype {
        family_marker: "int vertical bend cover",
        right_angle_prefix: "GE-IBK90-",
        half_angle_prefix: "GE-IBK45-",
        is_cover: true,
    },
    BendArchetype {
        family_marker: "ext vertical bend cover",
        right_angle_prefix: "GE-OBK90-",
        half_angle_prefix: "GE-OBK45-",
        is_cover: true,
    },
    BendArchetype {
        family_marker: "horizontal bend",
        right_angle_prefix: "GE-D90-",
        half_angle_prefix: "GE-D45-",
        is_cover: false,
    },
    BendArchetype {
        family_marker: "int vertical bend",
        right_angle_prefix: "GE-IB90-",
        half_angle_prefix: "GE-IB45-",
        is_cover: false,
    },
    BendArchetype {
        family_marker: "ext vertical bend",
        right_angle_prefix: "GE-OB90-",
        half_angle_prefix: "GE-OB45-",
        is_cover: false,
    },
];

/// Finds the archetype whose marker occurs in `family_name`.
pub fn find_archetype(family_name: &str) -> Option<&'static BendArchetype> {
    let lower = family_name.to_lowercase();
    BEND_ARCHETYPES
        .iter()
        .find(|archetype| lower.contains(archetype.family_marker))
}

/// Resolves the fixed base prefix for a bend family.
///
/// A missing angle selects the 90° variant.
pub fn bend_base_article(family_name: &str, angle: Option<f64>) -> Option<&'static str> {
    find_archetype(family_name).map(|archetype| archetype.prefix_for(angle))
}

/// Base prefix plus fixed shape for a bend family.
pub fn bend_template(
    family_name: &str,
    angle: Option<f64>,
) -> Option<(&'static str, TemplateKind)> {
    let archetype = find_archetype(family_name)?;
    Some((archetype.prefix_for(angle), archetype.template_kind()))
}
