//! Element routing ahead of article synthesis.
//!
//! # Responsibility
//! - Decide once per element which rule family handles it: accessory,
//!   named special case or the mapping-driven default path.
//! - Translate accessory type names for descriptions.
//!
//! # Invariants
//! - Accessory markers are checked first, then special families.
//! - A vertical bend without the `SDE` variant routes to the default path.

use crate::article::special::{ConnectorLine, SpecialKind, SDE_VARIANT};
use crate::model::element::ElementSnapshot;
use crate::model::fields::PARAM_VARIANT;

/// Family names treated as accessories when no list is configured.
pub const DEFAULT_ACCESSORY_MARKERS: &[&str] = &["999_DKC_Accessories"];

pub const ACCESSORY_ARTICLE: &str = "GE-AX-";
const UNKNOWN_ACCESSORY_TYPE: &str = "Невідомий";

/// Special rule selected for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRoute {
    Reducer,
    Connector(ConnectorLine),
}

/// Processing path for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Accessory,
    Special(SpecialRoute),
    Default,
}

/// Returns the default marker list as owned strings.
pub fn default_accessory_markers() -> Vec<String> {
    DEFAULT_ACCESSORY_MARKERS
        .iter()
        .map(|marker| marker.to_string())
        .collect()
}

pub fn is_accessory(family_name: &str, markers: &[String]) -> bool {
    let name = family_name.trim();
    markers
        .iter()
        .any(|marker| marker.trim().eq_ignore_ascii_case(name))
}

/// Whether the user picked the `SDE` connector variant.
pub fn is_sde_variant(element: &ElementSnapshot) -> bool {
    element
        .param_text(PARAM_VARIANT)
        .is_some_and(|variant| variant.eq_ignore_ascii_case(SDE_VARIANT))
}

pub fn route_element(element: &ElementSnapshot, accessory_markers: &[String]) -> Route {
    let family = element.family_name.as_str();
    if is_accessory(family, accessory_markers) {
        return Route::Accessory;
    }

    match SpecialKind::from_family(family) {
        Some(SpecialKind::Reducer) => Route::Special(SpecialRoute::Reducer),
        Some(SpecialKind::HorizontalConnector) => {
            Route::Special(SpecialRoute::Connector(ConnectorLine::Yde))
        }
        Some(SpecialKind::VerticalConnector) if is_sde_variant(element) => {
            Route::Special(SpecialRoute::Connector(ConnectorLine::Sde))
        }
        Some(SpecialKind::VerticalConnector) | None => Route::Default,
    }
}

/// Ukrainian name for an accessory type; unknown names are kept verbatim.
pub fn translate_accessory_type(type_name: Option<&str>) -> String {
    let Some(name) = type_name.map(str::trim).filter(|name| !name.is_empty()) else {
        return UNKNOWN_ACCESSORY_TYPE.to_string();
    };

    match name.to_lowercase().as_str() {
        "bolt" => "Болт".to_string(),
        "nut" => "Гайка".to_string(),
        "plate" | "plain" => "Пластина".to_string(),
        "holder" => "Тримач".to_string(),
        _ => name.to_string(),
    }
}

pub fn accessory_description(type_name: Option<&str>) -> String {
    format!("Аксесуар ({})", translate_accessory_type(type_name))
}

#[cfg(test)]
mod tests {
    use super::{
        accessory_description, default_accessory_markers, route_element, Route, SpecialRoute,
    };
    use crate::article::special::ConnectorLine;
    use crate::model::element::ElementSnapshot;
    use crate::model::fields::PARAM_VARIANT;

    #[test]
    fn accessories_route_before_anything_else() {
        let markers = default_accessory_markers();
        let element = ElementSnapshot::new(1, "999_dkc_accessories");
        assert_eq!(route_element(&element, &markers), Route::Accessory);
        assert_eq!(
            route_element(&ElementSnapshot::new(2, "999_DKC_Accessories v2"), &markers),
            Route::Default
        );
    }

    #[test]
    fn vertical_bend_needs_sde_variant() {
        let markers = default_accessory_markers();
        let plain = ElementSnapshot::new(1, "470_DKC_S5_Int Vertical Bend_1-89");
        assert_eq!(route_element(&plain, &markers), Route::Default);

        let sde = plain.clone().with_text(PARAM_VARIANT, " sde ");
        assert_eq!(
            route_element(&sde, &markers),
            Route::Special(SpecialRoute::Connector(ConnectorLine::Sde))
        );

        let horizontal = ElementSnapshot::new(2, "470_DKC_S5_Horizontal Bend_CPO0-45");
        assert_eq!(
            route_element(&horizontal, &markers),
            Route::Special(SpecialRoute::Connector(ConnectorLine::Yde))
        );
    }

    #[test]
    fn accessory_types_are_translated() {
        assert_eq!(accessory_description(Some("Bolt")), "Аксесуар (Болт)");
        assert_eq!(accessory_description(Some("plain")), "Аксесуар (Пластина)");
        assert_eq!(accessory_description(Some("Clamp M8")), "Аксесуар (Clamp M8)");
        assert_eq!(accessory_description(None), "Аксесуар (Невідомий)");
        assert_eq!(accessory_description(Some("  ")), "Аксесуар (Невідомий)");
    }
}
