//! Configuration loading.
//!
//! # Responsibility
//! - Read the versioned INI configuration holding the family map and the
//!   coating/thickness selection.
//! - Degrade to empty/default data when the file is missing or unreadable.
//!
//! # Invariants
//! - `SpecConfig::load` never fails; the failure is logged once.

pub mod ini;
pub mod settings;

use crate::model::mapping::MappingTable;
use ini::IniDocument;
use log::{error, info};
use settings::SyncSettings;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file failure.
#[derive(Debug)]
pub enum ConfigError {
    Missing(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "config file not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Missing(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Mapping table and selection resolved for one run.
#[derive(Debug, Clone, Default)]
pub struct SpecConfig {
    pub mapping: MappingTable,
    pub settings: SyncSettings,
}

impl SpecConfig {
    pub fn from_ini_str(text: &str) -> Self {
        let doc = IniDocument::parse(text);
        Self {
            mapping: MappingTable::from_ini(&doc),
            settings: SyncSettings::from_ini(&doc),
        }
    }

    /// Reads and parses the config file, surfacing I/O failures.
    pub fn try_load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_ini_str(&text))
    }

    /// Like [`SpecConfig::try_load`], but logs the failure and falls back to
    /// an empty mapping table with default settings.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!(
                    "event=config_load module=config status=ok path={} families={}",
                    path.display(),
                    config.mapping.len()
                );
                config
            }
            Err(err) => {
                error!(
                    "event=config_load module=config status=error path={} error={}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }
}
