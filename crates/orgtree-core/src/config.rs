//! Hierarchy settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Optional TOML file
//! 3. Environment variables: `ORGTREE__*` (double underscore nests keys,
//!    e.g. `ORGTREE__DEFAULTS__DISTINCT_NAME_LEVELS=2`)

use std::collections::HashMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{OrgTreeError, Result};
use crate::policy::DEFAULT_DISTINCT_NAME_LEVELS;

/// Settings applied to data sources without their own section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub distinct_name_levels: usize,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            distinct_name_levels: DEFAULT_DISTINCT_NAME_LEVELS,
        }
    }
}

/// Naming rules for one data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceSettings {
    /// Overrides `defaults.distinct_name_levels`
    pub distinct_name_levels: Option<usize>,
    /// Category ids that stop the distinct-name walk
    pub stop_classifications: Vec<String>,
    /// Organization identities that stop the distinct-name walk
    pub stop_organizations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchySettings {
    pub defaults: DefaultSettings,
    pub data_sources: HashMap<String, DataSourceSettings>,
}

fn config_err(e: ConfigError) -> OrgTreeError {
    OrgTreeError::Config {
        message: e.to_string(),
    }
}

impl HierarchySettings {
    /// Load defaults, then `path` if given and present, then the environment
    ///
    /// # Errors
    /// * `Config` - If a source cannot be parsed or the result is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default(
                "defaults.distinct_name_levels",
                DEFAULT_DISTINCT_NAME_LEVELS as i64,
            )
            .map_err(config_err)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("ORGTREE")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text on top of the compiled defaults
    ///
    /// # Errors
    /// * `Config` - If the text cannot be parsed or the result is invalid
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings: Self = Config::builder()
            .set_default(
                "defaults.distinct_name_levels",
                DEFAULT_DISTINCT_NAME_LEVELS as i64,
            )
            .map_err(config_err)?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// * `Config` - If any level count is zero
    pub fn validate(&self) -> Result<()> {
        if self.defaults.distinct_name_levels == 0 {
            return Err(OrgTreeError::Config {
                message: "defaults.distinct_name_levels must be at least 1".to_string(),
            });
        }
        for (data_source_id, ds) in &self.data_sources {
            if ds.distinct_name_levels == Some(0) {
                return Err(OrgTreeError::Config {
                    message: format!(
                        "data_sources.{}.distinct_name_levels must be at least 1",
                        data_source_id
                    ),
                });
            }
        }
        Ok(())
    }
}
