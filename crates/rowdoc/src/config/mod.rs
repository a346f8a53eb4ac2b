//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::key::{UniqueKey, UniqueKeyBuilder};
use crate::xml::{TemporalFormat, TemporalZone};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl KeyConfig {
    /// Builder carrying the declaration, parameter lists and URL mode.
    ///
    /// Untyped key columns still need [`UniqueKeyBuilder::add_column_types`].
    pub fn builder(&self) -> Result<UniqueKeyBuilder> {
        Ok(UniqueKeyBuilder::new(&self.unique_key)?
            .content_sql_columns(&self.content_sql_parameters)?
            .acl_sql_columns(&self.acl_sql_parameters)?
            .doc_id_is_url(self.doc_id_is_url))
    }

    /// Build the key directly; every column must be typed in the declaration.
    pub fn build_key(&self) -> Result<UniqueKey> {
        self.builder()?.build()
    }
}

impl XmlConfig {
    /// Temporal formatter for the configured zone.
    pub fn temporal_format(&self) -> Result<TemporalFormat> {
        Ok(TemporalFormat::new(self.time_zone.parse::<TemporalZone>()?))
    }
}
