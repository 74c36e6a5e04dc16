//! Host parameter names, categories and derived specification fields.
//!
//! # Responsibility
//! - Name every host parameter the engine reads or writes.
//! - Map category labels to coarse groups and the quantity/unit rule.
//! - Hold the derived field set written back per element.
//!
//! # Invariants
//! - `DerivedFields::cleared()` is the state every element starts from in a
//!   run, so no derived field survives from a previous run.

use serde::{Deserialize, Serialize};

pub const PARAM_WIDTH: &str = "DKC_ШиринаЛотка";
pub const PARAM_HEIGHT: &str = "DKC_ВысотаЛотка";
pub const PARAM_SECOND_WIDTH: &str = "DKC_ШиринаЛотка2";
pub const PARAM_SIZE: &str = "Размер";
pub const PARAM_ANGLE: &str = "DKC_Angle";
pub const PARAM_VARIANT: &str = "GE_Варіант";
pub const PARAM_LEFT: &str = "Left";
pub const PARAM_RIGHT: &str = "Right";
pub const PARAM_ACTUAL_LENGTH: &str = "DKC_ДлинаФакт";
pub const PARAM_MATERIAL: &str = "Material";
pub const PARAM_COMMENT: &str = "Комментарии";
pub const PARAM_LEVEL: &str = "Уровень";

pub const PARAM_ARTICLE: &str = "GE_Артикул";
pub const PARAM_CATEGORY: &str = "GE_Категорія";
pub const PARAM_DESCRIPTION: &str = "GE_Найменування";
pub const PARAM_QUANTITY: &str = "GE_Кількість";
pub const PARAM_UNIT: &str = "DKC_Единица измерения";
pub const PARAM_ADDITIONAL: &str = "GE_Додаткові";
pub const PARAM_MASS_PER_METER: &str = "DKC_Масса погонного метра";
pub const PARAM_MASS_PER_PIECE: &str = "DKC_Масса";

pub const CATEGORY_LINEAR_STOCK: &str = "1. Кабельні лотки";
pub const CATEGORY_CONNECTING_PARTS: &str = "2. З'єднувальні деталі";
pub const CATEGORY_INSTALLATION_PRODUCTS: &str = "3. Монтажні вироби";
pub const CATEGORY_OTHER: &str = "4. Інші";

pub const UNIT_METERS: &str = "м";
pub const UNIT_PIECE: &str = "шт.";

/// Coarse category group selected by the label's numeric prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    /// `1.*` trays and tray covers, counted in running meters.
    LinearStock,
    /// `2.*` fittings and fitting covers.
    ConnectingParts,
    /// `3.*` accessories and mounting hardware.
    InstallationProducts,
    Other,
}

impl CategoryGroup {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim_start();
        if trimmed.starts_with("1.") {
            Self::LinearStock
        } else if trimmed.starts_with("2.") {
            Self::ConnectingParts
        } else if trimmed.starts_with("3.") {
            Self::InstallationProducts
        } else {
            Self::Other
        }
    }

    /// Quantity/unit pair written for this group.
    ///
    /// Linear stock gets quantity `0` so the schedule's length/1000 formula
    /// yields running meters.
    pub fn quantity_unit(self) -> (&'static str, &'static str) {
        match self {
            Self::LinearStock => ("0", UNIT_METERS),
            Self::ConnectingParts | Self::InstallationProducts | Self::Other => ("1", UNIT_PIECE),
        }
    }
}

/// Mass value resolved from the catalog and the parameter it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct MassWrite {
    pub param: &'static str,
    pub kg: f64,
}

/// Specification fields the engine owns on every element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub article: String,
    pub category: String,
    pub description: String,
    pub quantity: String,
    pub unit: String,
    pub additional: String,
    #[serde(skip)]
    pub mass: Option<MassWrite>,
}

impl DerivedFields {
    /// Empty field set used to reset an element before recomputation.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        self.article.is_empty()
            && self.category.is_empty()
            && self.description.is_empty()
            && self.quantity.is_empty()
            && self.unit.is_empty()
            && self.additional.is_empty()
            && self.mass.is_none()
    }

    /// Applies the category label together with its quantity/unit rule.
    pub fn assign_category(&mut self, category: &str) -> CategoryGroup {
        let group = CategoryGroup::from_label(category);
        let (quantity, unit) = group.quantity_unit();
        self.category = category.to_string();
        self.quantity = quantity.to_string();
        self.unit = unit.to_string();
        group
    }

    /// Text parameters in write order.
    pub fn text_params(&self) -> [(&'static str, &str); 6] {
        [
            (PARAM_ARTICLE, self.article.as_str()),
            (PARAM_CATEGORY, self.category.as_str()),
            (PARAM_DESCRIPTION, self.description.as_str()),
            (PARAM_QUANTITY, self.quantity.as_str()),
            (PARAM_UNIT, self.unit.as_str()),
            (PARAM_ADDITIONAL, self.additional.as_str()),
        ]
    }
}
