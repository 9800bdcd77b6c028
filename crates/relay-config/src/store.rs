//! Configuration Store

use crate::error::ConfigError;
use crate::jec::JecConfig;
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the `key=value` integration file
pub const DEFAULT_CONF_PATH: &str = "/home/jsm/jec/conf/integration.conf";

/// Default location of the JEC JSON file
pub const DEFAULT_JEC_CONF_PATH: &str = "/home/jsm/jec/conf/jec-config.json";

/// Loads and merges the configuration layers
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    conf_path: PathBuf,
    jec_path: PathBuf,
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONF_PATH, DEFAULT_JEC_CONF_PATH)
    }
}

impl ConfigurationStore {
    /// Create a store reading the given files
    pub fn new(conf_path: impl Into<PathBuf>, jec_path: impl Into<PathBuf>) -> Self {
        Self {
            conf_path: conf_path.into(),
            jec_path: jec_path.into(),
        }
    }

    pub fn conf_path(&self) -> &Path {
        &self.conf_path
    }

    pub fn jec_path(&self) -> &Path {
        &self.jec_path
    }

    /// Load the effective configuration without overrides
    pub fn load(&self) -> Result<Settings, ConfigError> {
        self.load_with_overrides(&[])
    }

    /// Load the effective configuration
    ///
    /// Both files must be readable and the JEC base URL valid before any
    /// layer is merged. Overrides are `key=value` strings applied last.
    pub fn load_with_overrides(&self, overrides: &[String]) -> Result<Settings, ConfigError> {
        let conf_text =
            std::fs::read_to_string(&self.conf_path).map_err(|source| ConfigError::Read {
                path: self.conf_path.clone(),
                source,
            })?;
        let jec = JecConfig::load(&self.jec_path)?;

        let mut settings = Settings::default();
        settings.merge_key_value(&conf_text);
        settings.merge_jec(&jec);
        for entry in overrides {
            settings.apply_override(entry)?;
        }

        let settings = settings.validate()?;
        info!(
            "Loaded configuration from {} and {}",
            self.conf_path.display(),
            self.jec_path.display()
        );
        Ok(settings)
    }
}
