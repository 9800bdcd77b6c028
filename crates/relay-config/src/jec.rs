//! JEC JSON Configuration Layer

use crate::error::ConfigError;
use crate::settings::validate_base_url;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Raw `jec-config.json` document
#[derive(Debug, Default, Deserialize)]
struct JecDocument {
    #[serde(rename = "apiKey", alias = "apikey", default)]
    api_key: String,
    #[serde(rename = "baseUrl", alias = "baseurl", default)]
    base_url: String,
}

/// Validated JEC configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JecConfig {
    /// API key, possibly empty
    pub api_key: String,
    /// Absolute base URL without trailing slash
    pub base_url: String,
}

impl JecConfig {
    /// Parse a JEC document and validate its base URL
    pub fn from_json(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let document: JecDocument = Config::builder()
            .add_source(File::from_str(text, FileFormat::Json))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ConfigError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let base_url = validate_base_url(&document.base_url)?;
        debug!("Loaded JEC config from {}", path.display());

        Ok(Self {
            api_key: document.api_key,
            base_url,
        })
    }

    /// Read and validate a JEC file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<JecConfig, ConfigError> {
        JecConfig::from_json(Path::new("jec-config.json"), text)
    }

    #[test]
    fn test_parses_fields() {
        let jec = parse(r#"{"apiKey": "B", "baseUrl": "https://api.eu.atlassian.com/"}"#).unwrap();
        assert_eq!(jec.api_key, "B");
        assert_eq!(jec.base_url, "https://api.eu.atlassian.com");
    }

    #[test]
    fn test_missing_api_key_is_empty() {
        let jec = parse(r#"{"baseUrl": "https://api.atlassian.com"}"#).unwrap();
        assert!(jec.api_key.is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            parse(r#"{"apiKey": "B", "baseUrl": "api.atlassian.com"}"#),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse(r#"{"apiKey": "B"}"#),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse("{not json"), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = JecConfig::load(Path::new("/nonexistent/jec-config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
