//! Specification synchronization use-case.
//!
//! # Responsibility
//! - Visit every candidate element once, route it, build its article and
//!   resolve its description and mass from the catalog.
//! - Accumulate run statistics and hand all writes to the host as one batch.
//!
//! # Invariants
//! - Every visited element gets a write: its computed fields, or cleared
//!   fields when it is unmapped or failed. Stale values never survive a run.
//! - Per-element failures, panics included, are counted and never abort the
//!   batch. Only host enumerate/commit failures surface from `run`.
//! - Mapping table, catalog and settings are read-only for the whole run.

use crate::article::bend::bend_template;
use crate::article::builder::{build_article, build_article_as};
use crate::article::special::{
    connector_article, reducer_article, ConnectorLine, ReducerDirection, SpecialRuleError,
    REDUCER_HEIGHT_MM,
};
use crate::config::settings::SyncSettings;
use crate::host::dimensions::{extract_dimensions, required_int_param, ParamError};
use crate::host::{HostError, ModelHost, WriteBatch};
use crate::logging::sanitize_message;
use crate::model::element::ElementSnapshot;
use crate::model::fields::{
    CategoryGroup, DerivedFields, MassWrite, CATEGORY_CONNECTING_PARTS,
    CATEGORY_INSTALLATION_PRODUCTS, CATEGORY_OTHER, PARAM_ACTUAL_LENGTH, PARAM_HEIGHT,
    PARAM_LEFT, PARAM_MASS_PER_METER, PARAM_MASS_PER_PIECE, PARAM_RIGHT, PARAM_SECOND_WIDTH,
};
use crate::model::mapping::MappingTable;
use crate::repo::catalog_repo::CatalogStore;
use crate::service::accessory_log::AccessoryLog;
use crate::service::classify::{
    accessory_description, default_accessory_markers, route_element, Route, SpecialRoute,
    ACCESSORY_ARTICLE,
};
use crate::service::summary::{RunStatistics, RunSummary};
use log::{debug, error, info, warn};
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use uuid::Uuid;

const MAX_PANIC_MESSAGE_CHARS: usize = 160;

/// Run-level failure; the batch was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Host(HostError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
        }
    }
}

impl From<HostError> for SyncError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}

/// Why one element could not be specified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    EmptyFamily,
    Param(ParamError),
    Rule(SpecialRuleError),
    EmptyArticle { family: String },
    Panic(String),
}

impl Display for ElementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFamily => write!(f, "element has no family name"),
            Self::Param(err) => write!(f, "{err}"),
            Self::Rule(err) => write!(f, "{err}"),
            Self::EmptyArticle { family } => {
                write!(f, "cannot build article for family `{family}`: empty base article")
            }
            Self::Panic(message) => write!(f, "unexpected failure: {message}"),
        }
    }
}

impl Error for ElementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Param(err) => Some(err),
            Self::Rule(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParamError> for ElementError {
    fn from(value: ParamError) -> Self {
        Self::Param(value)
    }
}

impl From<SpecialRuleError> for ElementError {
    fn from(value: SpecialRuleError) -> Self {
        Self::Rule(value)
    }
}

/// Result of processing one element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementOutcome {
    Written {
        group: CategoryGroup,
        fields: DerivedFields,
    },
    /// Family has no mapping row; fields stay cleared, no error counted.
    Unmapped,
    Failed(ElementError),
}

/// Optional behavior knobs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Family names treated as accessories (case-insensitive equality).
    pub accessory_markers: Vec<String>,
    pub accessory_log: Option<AccessoryLog>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            accessory_markers: default_accessory_markers(),
            accessory_log: None,
        }
    }
}

/// Synchronization engine over immutable run inputs.
pub struct SpecSynchronizer<'a> {
    mapping: &'a MappingTable,
    catalog: &'a CatalogStore,
    settings: &'a SyncSettings,
    options: SyncOptions,
}

impl<'a> SpecSynchronizer<'a> {
    pub fn new(
        mapping: &'a MappingTable,
        catalog: &'a CatalogStore,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            mapping,
            catalog,
            settings,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs one synchronization over every candidate element of `host`.
    ///
    /// # Errors
    /// - `SyncError::Host` when the host cannot list elements or rejects the
    ///   batch; nothing is applied in that case.
    pub fn run<H: ModelHost + ?Sized>(&self, host: &mut H) -> Result<RunSummary, SyncError> {
        let started_at = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(
            "event=sync_run module=service status=start run_id={} thickness_mm={} coating={} mappings={} catalog_available={}",
            run_id,
            self.settings.thickness_mm,
            self.settings.coating,
            self.mapping.len(),
            self.catalog.is_available()
        );

        let elements = host.candidate_elements().map_err(|err| {
            error!(
                "event=sync_run module=service status=error run_id={} stage=enumerate error={}",
                run_id, err
            );
            SyncError::from(err)
        })?;

        let mut stats = RunStatistics::new();
        let mut batch = WriteBatch::new();
        for element in &elements {
            let outcome = catch_unwind(AssertUnwindSafe(|| self.process_element(element, &run_id)))
                .unwrap_or_else(|payload| {
                    ElementOutcome::Failed(ElementError::Panic(panic_message(payload)))
                });

            match outcome {
                ElementOutcome::Written { group, fields } => {
                    stats.record_processed(group);
                    batch.push(element.id, fields);
                }
                ElementOutcome::Unmapped => {
                    stats.record_unmapped();
                    batch.push(element.id, DerivedFields::cleared());
                }
                ElementOutcome::Failed(err) => {
                    let message = format!("{err} (ElementId={})", element.id);
                    error!(
                        "event=element_sync module=service status=error run_id={} element_id={} error={}",
                        run_id, element.id, err
                    );
                    stats.record_error(message);
                    batch.push(element.id, DerivedFields::cleared());
                }
            }
        }

        host.commit(batch).map_err(|err| {
            error!(
                "event=sync_run module=service status=error run_id={} stage=commit error={}",
                run_id, err
            );
            SyncError::from(err)
        })?;

        let summary = stats.into_summary(run_id);
        info!(
            "event=sync_run module=service status=ok run_id={} elements={} processed={} unmapped={} errors={} duration_ms={}",
            summary.run_id,
            elements.len(),
            summary.processed,
            summary.skipped_unmapped,
            summary.error_count,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    /// Computes the derived fields of one element without touching the host.
    pub fn process_element(&self, element: &ElementSnapshot, run_id: &str) -> ElementOutcome {
        if element.family_name.trim().is_empty() {
            return ElementOutcome::Failed(ElementError::EmptyFamily);
        }

        let result = match route_element(element, &self.options.accessory_markers) {
            Route::Accessory => Ok(self.process_accessory(element, run_id)),
            Route::Special(SpecialRoute::Reducer) => self.process_reducer(element),
            Route::Special(SpecialRoute::Connector(line)) => self.process_connector(element, line),
            Route::Default => self.process_default(element),
        };

        match result {
            Ok(Some((group, fields))) => {
                debug!(
                    "event=element_sync module=service status=ok element_id={} article={} category={}",
                    element.id, fields.article, fields.category
                );
                ElementOutcome::Written { group, fields }
            }
            Ok(None) => ElementOutcome::Unmapped,
            Err(err) => ElementOutcome::Failed(err),
        }
    }

    fn process_accessory(
        &self,
        element: &ElementSnapshot,
        run_id: &str,
    ) -> Option<(CategoryGroup, DerivedFields)> {
        if let Some(log) = &self.options.accessory_log {
            match log.record(element, run_id) {
                Ok(true) => info!(
                    "event=accessory_log module=service status=ok element_id={}",
                    element.id
                ),
                Ok(false) => debug!(
                    "event=accessory_log module=service status=skip element_id={} reason=already_recorded",
                    element.id
                ),
                Err(err) => warn!(
                    "event=accessory_log module=service status=error element_id={} path={} error={}",
                    element.id,
                    log.path().display(),
                    err
                ),
            }
        }

        let mut fields = DerivedFields::cleared();
        fields.article = ACCESSORY_ARTICLE.to_string();
        fields.description = accessory_description(element.type_name.as_deref());
        let group = fields.assign_category(CATEGORY_INSTALLATION_PRODUCTS);
        Some((group, fields))
    }

    fn process_reducer(
        &self,
        element: &ElementSnapshot,
    ) -> Result<Option<(CategoryGroup, DerivedFields)>, ElementError> {
        let height = required_int_param(element, PARAM_HEIGHT)?;
        if height != REDUCER_HEIGHT_MM {
            return Err(SpecialRuleError::ReducerHeight(height).into());
        }
        let second_width = required_int_param(element, PARAM_SECOND_WIDTH)?;
        let direction = ReducerDirection::from_flags(
            element.param_flag(PARAM_LEFT),
            element.param_flag(PARAM_RIGHT),
        );

        let article = reducer_article(height, second_width, direction, &self.settings.coating)?;
        Ok(Some(self.special_fields(element, article)))
    }

    fn process_connector(
        &self,
        element: &ElementSnapshot,
        line: ConnectorLine,
    ) -> Result<Option<(CategoryGroup, DerivedFields)>, ElementError> {
        let height = required_int_param(element, PARAM_HEIGHT)?;
        let article = connector_article(line, height, &self.settings.coating)?;
        Ok(Some(self.special_fields(element, article)))
    }

    fn special_fields(
        &self,
        element: &ElementSnapshot,
        article: String,
    ) -> (CategoryGroup, DerivedFields) {
        let mut fields = DerivedFields::cleared();
        fields.article = article;
        if let Some(row) = self.mapping.get(&element.family_name) {
            fields.additional = row.additional.clone();
        }
        let group = fields.assign_category(CATEGORY_CONNECTING_PARTS);
        self.apply_catalog(element, &mut fields);
        (group, fields)
    }

    fn process_default(
        &self,
        element: &ElementSnapshot,
    ) -> Result<Option<(CategoryGroup, DerivedFields)>, ElementError> {
        let Some(row) = self.mapping.get(&element.family_name) else {
            warn!(
                "event=element_sync module=service status=skip element_id={} family={} reason=unmapped",
                element.id, element.family_name
            );
            return Ok(None);
        };

        let category = if row.category.is_empty() {
            CATEGORY_OTHER
        } else {
            row.category.as_str()
        };

        let dims = extract_dimensions(element);
        let bend = row
            .base_article
            .is_empty()
            .then(|| bend_template(&element.family_name, dims.angle_deg))
            .flatten();
        let article = match bend {
            Some((prefix, kind)) => build_article_as(
                kind,
                prefix,
                dims.width_mm,
                dims.height_mm,
                self.settings.thickness_mm,
                &self.settings.coating,
                None,
            ),
            None => build_article(
                &row.base_article,
                dims.width_mm,
                dims.height_mm,
                self.settings.thickness_mm,
                &self.settings.coating,
                dims.angle_deg,
            ),
        };
        if article.is_empty() {
            return Err(ElementError::EmptyArticle {
                family: element.family_name.clone(),
            });
        }

        let mut fields = DerivedFields::cleared();
        fields.article = article;
        fields.additional = row.additional.clone();
        let group = fields.assign_category(category);
        self.apply_catalog(element, &mut fields);
        Ok(Some((group, fields)))
    }

    fn apply_catalog(&self, element: &ElementSnapshot, fields: &mut DerivedFields) {
        let lookup = self.catalog.find_exact(&fields.article);
        match (lookup.match_count, lookup.entry) {
            (1, Some(entry)) => {
                fields.description = entry.description;
                fields.mass = entry.mass_per_unit.map(|kg| MassWrite {
                    param: mass_param(element),
                    kg,
                });
            }
            (0, _) => warn!(
                "event=catalog_lookup module=service status=warn element_id={} article={} reason=not_found",
                element.id, fields.article
            ),
            (count, _) => warn!(
                "event=catalog_lookup module=service status=warn element_id={} article={} reason=ambiguous matches={}",
                element.id, fields.article, count
            ),
        }
    }
}

/// Linear stock (elements carrying an actual length) takes mass per meter.
fn mass_param(element: &ElementSnapshot) -> &'static str {
    if element.has_param(PARAM_ACTUAL_LENGTH) {
        PARAM_MASS_PER_METER
    } else {
        PARAM_MASS_PER_PIECE
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    sanitize_message(&message, MAX_PANIC_MESSAGE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::{ElementError, ElementOutcome, SpecSynchronizer};
    use crate::article::special::SpecialRuleError;
    use crate::config::settings::SyncSettings;
    use crate::host::dimensions::ParamError;
    use crate::model::element::{ElementSnapshot, ParamValue};
    use crate::model::fields::{
        CategoryGroup, DerivedFields, PARAM_HEIGHT, PARAM_RIGHT, PARAM_SECOND_WIDTH, PARAM_WIDTH,
    };
    use crate::model::mapping::{MappingRow, MappingTable};
    use crate::repo::catalog_repo::CatalogStore;

    fn settings() -> SyncSettings {
        SyncSettings::default()
            .with_thickness_text("1,2")
            .with_coating("Сендзимір")
    }

    fn written(outcome: ElementOutcome) -> (CategoryGroup, DerivedFields) {
        match outcome {
            ElementOutcome::Written { group, fields } => (group, fields),
            other => panic!("expected written outcome, got {other:?}"),
        }
    }

    #[test]
    fn default_path_builds_from_mapping() {
        let mapping = MappingTable::from_rows([MappingRow::parse(
            "470_DKC_S5_Tray",
            "GE-KT2- | 1. Кабельні лотки | S5",
        )]);
        let catalog = CatalogStore::unavailable();
        let settings = settings();
        let sync = SpecSynchronizer::new(&mapping, &catalog, &settings);

        let element = ElementSnapshot::new(1, "470_DKC_S5_Tray")
            .with_text(PARAM_WIDTH, "200")
            .with_text(PARAM_HEIGHT, "100");
        let (group, fields) = written(sync.process_element(&element, "run"));

        assert_eq!(group, CategoryGroup::LinearStock);
        assert_eq!(fields.article, "GE-KT2-20-A100-1,2-PG");
        assert_eq!(fields.quantity, "0");
        assert_eq!(fields.additional, "S5");
        assert!(fields.description.is_empty());
    }

    #[test]
    fn empty_category_falls_back_to_other() {
        let mapping = MappingTable::from_rows([MappingRow::parse("Fam", "GE-KT2- | - | -")]);
        let catalog = CatalogStore::unavailable();
        let settings = settings();
        let sync = SpecSynchronizer::new(&mapping, &catalog, &settings);

        let (group, fields) = written(sync.process_element(&ElementSnapshot::new(1, "Fam"), "run"));
        assert_eq!(group, CategoryGroup::Other);
        assert_eq!(fields.category, "4. Інші");
        assert_eq!(fields.unit, "шт.");
    }

    #[test]
    fn empty_base_uses_bend_archetype_without_second_angle() {
        let mapping = MappingTable::from_rows([MappingRow::parse(
            "470_DKC_S5_Horizontal Bend",
            "- | 2. З'єднувальні деталі | -",
        )]);
        let catalog = CatalogStore::unavailable();
        let settings = settings();
        let sync = SpecSynchronizer::new(&mapping, &catalog, &settings);

        let element = ElementSnapshot::new(1, "470_DKC_S5_Horizontal Bend")
            .with_text(PARAM_WIDTH, "300")
            .with_text(PARAM_HEIGHT, "60")
            .with_param("DKC_Angle", ParamValue::number(std::f64::consts::FRAC_PI_4));
        let (_, fields) = written(sync.process_element(&element, "run"));
        assert_eq!(fields.article, "GE-D45-30-A60-1,2-PG");
    }

    #[test]
    fn unmapped_family_is_not_an_error() {
        let mapping = MappingTable::new();
        let catalog = CatalogStore::unavailable();
        let settings = settings();
        let sync = SpecSynchronizer::new(&mapping, &catalog, &settings);

        assert_eq!(
            sync.process_element(&ElementSnapshot::new(1, "Unknown"), "run"),
            ElementOutcome::Unmapped
        );
        assert_eq!(
            sync.process_element(&ElementSnapshot::new(2, "  "), "run"),
            ElementOutcome::Failed(ElementError::EmptyFamily)
        );
    }

    #[test]
    fn reducer_rules_are_checked_in_order() {
        let mapping = MappingTable::new();
        let catalog = CatalogStore::unavailable();
        let settings = settings();
        let sync = SpecSynchronizer::new(&mapping, &catalog, &settings);
        let family = "470_DKC_S5_Lightweight Reducer";

        let wrong_height = ElementSnapshot::new(1, family).with_text(PARAM_HEIGHT, "60");
        assert_eq!(
            sync.process_element(&wrong_height, "run"),
            ElementOutcome::Failed(ElementError::Rule(SpecialRuleError::ReducerHeight(60)))
        );

        let missing_width = ElementSnapshot::new(2, family).with_text(PARAM_HEIGHT, "100 мм");
        assert_eq!(
            sync.process_element(&missing_width, "run"),
            ElementOutcome::Failed(ElementError::Param(ParamError::Missing(PARAM_SECOND_WIDTH)))
        );

        let ok = ElementSnapshot::new(3, family)
            .with_text(PARAM_HEIGHT, "100")
            .with_text(PARAM_SECOND_WIDTH, "300")
            .with_param(PARAM_RIGHT, ParamValue::Integer(1));
        let (group, fields) = written(sync.process_element(&ok, "run"));
        assert_eq!(group, CategoryGroup::ConnectingParts);
        assert_eq!(fields.article, "GE-KT2-RR-10-30-A100-2,0-PG");
        assert_eq!(fields.quantity, "1");
    }
}
