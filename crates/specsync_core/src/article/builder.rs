//! General article code builder.
//!
//! # Responsibility
//! - Classify a base template into tray, cover or fitting shape.
//! - Append dimension, thickness and coating tokens per shape and splice the
//!   rounded angle where the template accepts one.
//!
//! # Invariants
//! - `build_article` is pure: identical inputs give identical codes.
//! - Output never contains doubled separators and never starts or ends with
//!   one.
//! - An empty base yields an empty code; callers treat that as failure.
//!
//! Grammar:
//! - tray:    `<base>-<wcm>-A<h>-<t>-<coat>`
//! - cover:   `<base>[<angle>]-<wcm>-<t>-<coat>`
//! - fitting: `<base>[<angle>]-<wcm>-A<h>-<t>-<coat>`, horizontal fittings
//!   keep the separator before the angle (`GE-D-30-…`)

use crate::article::format::{coating_code, height_token, thickness_text, width_cm};
use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("valid separator regex"));

const SEPARATOR: char = '-';

const COVER_MARKERS: &[&str] = &["ktk", "bk", "k1"];
const COVER_SUFFIX: &str = "k-";
const FITTING_MARKERS: &[&str] = &["d", "ib", "ob"];

const DK_COVER_PREFIX: &str = "GE-DK";
const OUTER_COVER_PREFIX: &str = "GE-OBK";
const INNER_COVER_PREFIX: &str = "GE-IBK";
const HORIZONTAL_MARKER: &str = "-D";
const INNER_VERTICAL_MARKER: &str = "-IB";
const OUTER_VERTICAL_MARKER: &str = "-OB";

const DK_COVER_ANGLES: &[i64] = &[45];
const VERTICAL_ANGLES: &[i64] = &[45, 90];

/// Which rounded angles a template splices into the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleRule {
    /// Straight form; the angle is ignored.
    Never,
    /// Horizontal fittings take any angle, appended after the separator.
    Any,
    /// Only the listed angles are spliced; others fall back to straight form.
    Only(&'static [i64]),
}

impl AngleRule {
    /// Returns the rounded angle to splice, if any.
    pub fn splice(self, angle: Option<f64>) -> Option<i64> {
        let rounded = round_angle(angle?);
        match self {
            Self::Never => None,
            Self::Any => Some(rounded),
            Self::Only(accepted) => accepted.contains(&rounded).then_some(rounded),
        }
    }

    /// Whether the angle is glued to the prefix (`GE-IB90-`) rather than
    /// appended as its own segment (`GE-D-30-`).
    fn joins_prefix(self) -> bool {
        !matches!(self, Self::Any)
    }
}

/// Product shape derived from the base template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Tray,
    Cover(AngleRule),
    Fitting(AngleRule),
}

/// Classifies a base template by substring checks.
///
/// Cover markers take precedence over fitting markers; anything else is a
/// straight tray run.
pub fn classify_template(base: &str) -> TemplateKind {
    let working = with_trailing_separator(base.trim());
    let lower = working.to_lowercase();
    let upper = working.to_uppercase();

    if COVER_MARKERS.iter().any(|marker| lower.contains(marker)) || lower.ends_with(COVER_SUFFIX)
    {
        let rule = if upper.starts_with(DK_COVER_PREFIX) {
            AngleRule::Only(DK_COVER_ANGLES)
        } else if upper.starts_with(OUTER_COVER_PREFIX) || upper.starts_with(INNER_COVER_PREFIX) {
            AngleRule::Only(VERTICAL_ANGLES)
        } else {
            AngleRule::Never
        };
        return TemplateKind::Cover(rule);
    }

    if FITTING_MARKERS.iter().any(|marker| lower.contains(marker)) {
        let rule = if upper.contains(HORIZONTAL_MARKER) {
            AngleRule::Any
        } else if upper.contains(INNER_VERTICAL_MARKER) || upper.contains(OUTER_VERTICAL_MARKER) {
            AngleRule::Only(VERTICAL_ANGLES)
        } else {
            AngleRule::Never
        };
        return TemplateKind::Fitting(rule);
    }

    TemplateKind::Tray
}

/// Synthesizes the article code for one element.
pub fn build_article(
    base_article: &str,
    width_mm: i64,
    height_mm: i64,
    thickness_mm: f64,
    coating: &str,
    angle: Option<f64>,
) -> String {
    let kind = classify_template(base_article);
    build_article_as(kind, base_article, width_mm, height_mm, thickness_mm, coating, angle)
}

/// Same as `build_article` with the shape already decided by the caller.
pub fn build_article_as(
    kind: TemplateKind,
    base_article: &str,
    width_mm: i64,
    height_mm: i64,
    thickness_mm: f64,
    coating: &str,
    angle: Option<f64>,
) -> String {
    let base = base_article.trim();
    if base.is_empty() {
        return String::new();
    }

    let working = with_trailing_separator(base);
    let width = width_cm(width_mm);
    let thickness = thickness_text(thickness_mm);
    let coat = coating_code(coating);

    let raw = match kind {
        TemplateKind::Tray => {
            let height = height_token(height_mm);
            format!("{working}{width}-{height}-{thickness}-{coat}")
        }
        TemplateKind::Cover(rule) => {
            let head = spliced_head(&working, rule, angle);
            format!("{head}{width}-{thickness}-{coat}")
        }
        TemplateKind::Fitting(rule) => {
            let head = spliced_head(&working, rule, angle);
            let height = height_token(height_mm);
            format!("{head}{width}-{height}-{thickness}-{coat}")
        }
    };

    normalize_separators(&raw)
}

/// Rounds an angle in degrees, ties to even.
pub fn round_angle(angle: f64) -> i64 {
    angle.round_ties_even() as i64
}

/// Collapses separator runs and trims separators from both ends.
pub fn normalize_separators(code: &str) -> String {
    REPEATED_SEPARATOR_RE
        .replace_all(code, "-")
        .trim_matches(SEPARATOR)
        .to_string()
}

fn spliced_head(working: &str, rule: AngleRule, angle: Option<f64>) -> String {
    match rule.splice(angle) {
        Some(degrees) if rule.joins_prefix() => {
            format!("{}{degrees}-", working.trim_end_matches(SEPARATOR))
        }
        Some(degrees) => format!("{working}{degrees}-"),
        None => working.to_string(),
    }
}

fn with_trailing_separator(base: &str) -> String {
    format!("{}{SEPARATOR}", base.trim_end_matches(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::{
        build_article, build_article_as, classify_template, normalize_separators, round_angle,
        AngleRule, TemplateKind,
    };

    #[test]
    fn classifies_trays_covers_and_fittings() {
        assert_eq!(classify_template("GE-KT2-"), TemplateKind::Tray);
        assert_eq!(
            classify_template("GE-DK-"),
            TemplateKind::Cover(AngleRule::Only(&[45]))
        );
        assert_eq!(
            classify_template("GE-OBK"),
            TemplateKind::Cover(AngleRule::Only(&[45, 90]))
        );
        assert_eq!(
            classify_template("GE-KTK1-"),
            TemplateKind::Cover(AngleRule::Never)
        );
        assert_eq!(classify_template("GE-D-"), TemplateKind::Fitting(AngleRule::Any));
        assert_eq!(
            classify_template("GE-IB-"),
            TemplateKind::Fitting(AngleRule::Only(&[45, 90]))
        );
        assert_eq!(
            classify_template("GE-YDE-"),
            TemplateKind::Fitting(AngleRule::Never)
        );
    }

    #[test]
    fn builds_tray_code() {
        assert_eq!(
            build_article("GE-KT2-", 200, 100, 1.2, "Сендзимір", None),
            "GE-KT2-20-A100-1,2-PG"
        );
        assert_eq!(
            build_article("GE-KT2", 300, 60, 1.5, "занурення", Some(30.0)),
            "GE-KT2-30-A60-1,5-HDG"
        );
    }

    #[test]
    fn builds_angled_and_straight_covers() {
        assert_eq!(
            build_article("GE-DK-", 200, 0, 1.2, "занурення", Some(45.0)),
            "GE-DK45-20-1,2-HDG"
        );
        assert_eq!(
            build_article("GE-DK-", 200, 0, 1.2, "занурення", Some(90.0)),
            "GE-DK-20-1,2-HDG"
        );
        assert_eq!(
            build_article("GE-OBK-", 400, 0, 1.2, "Сендзимір", Some(89.6)),
            "GE-OBK90-40-1,2-PG"
        );
        assert_eq!(
            build_article("GE-KTK1-", 200, 100, 1.2, "Сендзимір", Some(45.0)),
            "GE-KTK1-20-1,2-PG"
        );
    }

    #[test]
    fn builds_fittings_with_angle_rules() {
        assert_eq!(
            build_article("GE-D-", 200, 100, 1.2, "Сендзимір", Some(30.2)),
            "GE-D-30-20-A100-1,2-PG"
        );
        assert_eq!(
            build_article("GE-D", 200, 100, 1.2, "Сендзимір", Some(90.0)),
            "GE-D-90-20-A100-1,2-PG"
        );
        assert_eq!(
            build_article("GE-IB-", 200, 100, 1.2, "Сендзимір", Some(45.0)),
            "GE-IB45-20-A100-1,2-PG"
        );
        assert_eq!(
            build_article("GE-OB-", 200, 100, 1.2, "Сендзимір", Some(60.0)),
            "GE-OB-20-A100-1,2-PG"
        );
        assert_eq!(
            build_article("GE-D-", 200, 100, 1.2, "Сендзимір", None),
            "GE-D-20-A100-1,2-PG"
        );
    }

    #[test]
    fn explicit_kind_overrides_classification() {
        assert_eq!(
            build_article_as(
                TemplateKind::Cover(AngleRule::Never),
                "GE-DK90-",
                200,
                100,
                1.2,
                "Сендзимір",
                Some(90.0)
            ),
            "GE-DK90-20-1,2-PG"
        );
    }

    #[test]
    fn empty_base_yields_empty_code() {
        assert_eq!(build_article("  ", 200, 100, 1.2, "PG", None), "");
    }

    #[test]
    fn angle_rounding_is_half_to_even() {
        assert_eq!(round_angle(44.5), 44);
        assert_eq!(round_angle(45.5), 46);
        assert_eq!(round_angle(89.6), 90);
    }

    #[test]
    fn normalization_collapses_and_trims() {
        assert_eq!(normalize_separators("--GE---KT2--20-"), "GE-KT2-20");
    }

    #[test]
    fn built_codes_never_carry_stray_separators() {
        let bases = ["GE-KT2-", "-GE-DK--", "GE-OBK", "GE-IB---", "GE-D", "GE-KTK1-", "-"];
        let angles = [None, Some(0.0), Some(45.0), Some(90.0), Some(-30.0)];
        for base in bases {
            for angle in angles {
                for (width, height) in [(200, 100), (0, 0), (-50, -10)] {
                    let code = build_article(base, width, height, 1.2, "", angle);
                    assert!(!code.contains("--"), "{code}");
                    assert!(!code.starts_with('-') && !code.ends_with('-'), "{code}");
                    assert_eq!(code, build_article(base, width, height, 1.2, "", angle));
                }
            }
        }
    }
}
