//! Article code synthesis and specification synchronization for cable-tray
//! models.
//!
//! The crate owns the rules; hosts (document adapters, the CLI's JSON
//! model) only supply element snapshots and apply write batches.

pub mod article;
pub mod config;
pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use article::builder::{build_article, TemplateKind};
pub use config::settings::SyncSettings;
pub use config::{ConfigError, ConfigResult, SpecConfig};
pub use db::{create_catalog, create_catalog_in_memory, open_catalog, DbError, DbResult};
pub use host::{HostError, HostResult, InMemoryModel, ModelHost, WriteBatch};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::element::{ElementId, ElementSnapshot, ParamValue};
pub use model::fields::{CategoryGroup, DerivedFields};
pub use model::mapping::{MappingRow, MappingTable};
pub use repo::catalog_repo::{
    import_entries, CatalogEntry, CatalogLookup, CatalogRepository, CatalogStore, RepoError,
    RepoResult, SqliteCatalogRepository,
};
pub use service::accessory_log::AccessoryLog;
pub use service::summary::{CategoryCounts, RunSummary};
pub use service::sync_service::{
    ElementError, ElementOutcome, SpecSynchronizer, SyncError, SyncOptions,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
