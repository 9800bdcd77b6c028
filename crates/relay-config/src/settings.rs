//! Effective Relay Settings

use crate::error::ConfigError;
use crate::file::{classify_line, ConfigLine};
use crate::jec::JecConfig;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// Configuration keys understood by the relay
pub mod keys {
    pub const API_KEY: &str = "apiKey";
    pub const API_URL: &str = "jsm.api.url";
    pub const LOGGER: &str = "zabbix2jsm.logger";
    pub const PROXY_ENABLED: &str = "zabbix2jsm.http.proxy.enabled";
    pub const PROXY_PORT: &str = "zabbix2jsm.http.proxy.port";
    pub const PROXY_HOST: &str = "zabbix2jsm.http.proxy.host";
    pub const PROXY_PROTOCOL: &str = "zabbix2jsm.http.proxy.protocol";
    pub const PROXY_USERNAME: &str = "zabbix2jsm.http.proxy.username";
    pub const PROXY_PASSWORD: &str = "zabbix2jsm.http.proxy.password";
    pub const TIMEOUT: &str = "timeout";
}

/// Log verbosity from `zabbix2jsm.logger`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Outbound HTTP proxy settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Route delivery through the proxy
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Proxy URL scheme (`http`, `https`, `socks5`, ...)
    pub protocol: String,
    pub username: String,
    pub password: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 1111,
            protocol: "https".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ProxySettings {
    /// Proxy URL, with credentials only when both are set
    pub fn url(&self) -> String {
        if !self.username.is_empty() && !self.password.is_empty() {
            format!(
                "{}://{}:{}@{}:{}",
                self.protocol, self.username, self.password, self.host, self.port
            )
        } else {
            format!("{}://{}:{}", self.protocol, self.host, self.port)
        }
    }
}

/// Effective relay configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// JSM integration API key
    pub api_key: String,
    /// JSM API base URL, without trailing slash
    pub api_url: String,
    /// Log verbosity
    pub log_level: LogLevel,
    /// Outbound proxy
    pub proxy: ProxySettings,
    /// Total time budget (seconds) spread over delivery attempts
    pub timeout_secs: u64,
    /// Unrecognized keys, kept for diagnostics
    pub extra: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.atlassian.com".to_string(),
            log_level: LogLevel::Warning,
            proxy: ProxySettings::default(),
            timeout_secs: 60,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Set a single configuration key
    ///
    /// This is the merge step shared by the integration file and the
    /// command-line overrides: a later call for the same key replaces the
    /// earlier value. `timeout` is floored at one second; an unknown logger
    /// level falls back to `warning`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            keys::API_KEY => self.api_key = value.to_string(),
            keys::API_URL => self.api_url = value.to_string(),
            keys::LOGGER => {
                self.log_level = LogLevel::parse(value).unwrap_or_else(|| {
                    warn!("Unknown log level {:?}, using warning", value);
                    LogLevel::Warning
                });
            }
            keys::PROXY_ENABLED => self.proxy.enabled = value.eq_ignore_ascii_case("true"),
            keys::PROXY_PORT => self.proxy.port = value.parse().map_err(|_| invalid())?,
            keys::PROXY_HOST => self.proxy.host = value.to_string(),
            keys::PROXY_PROTOCOL => self.proxy.protocol = value.to_string(),
            keys::PROXY_USERNAME => self.proxy.username = value.to_string(),
            keys::PROXY_PASSWORD => self.proxy.password = value.to_string(),
            keys::TIMEOUT => {
                let secs: i64 = value.parse().map_err(|_| invalid())?;
                self.timeout_secs = secs.max(1) as u64;
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Merge the contents of a `key=value` integration file
    ///
    /// Malformed lines are logged and skipped; they never abort loading.
    pub fn merge_key_value(&mut self, text: &str) {
        for line in text.lines() {
            match classify_line(line) {
                ConfigLine::Skip => {}
                ConfigLine::Entry { key, value } => {
                    if let Err(e) = self.apply(key, value) {
                        warn!("Invalid line in config file: {} ({})", line.trim(), e);
                    }
                }
                ConfigLine::Invalid(line) => {
                    warn!("Invalid line in config file: {}", line);
                }
            }
        }
    }

    /// Merge the JEC layer
    ///
    /// The JEC API key only fills an empty key, while the JEC base URL
    /// replaces whatever the earlier layers set.
    pub fn merge_jec(&mut self, jec: &JecConfig) {
        if self.api_key.is_empty() {
            self.api_key = jec.api_key.clone();
        }
        if self.api_url != jec.base_url {
            debug!("Using JEC base URL {} instead of {}", jec.base_url, self.api_url);
            self.api_url = jec.base_url.clone();
        }
    }

    /// Apply a `key=value` override given on the command line
    pub fn apply_override(&mut self, entry: &str) -> Result<(), ConfigError> {
        match classify_line(entry) {
            ConfigLine::Entry { key, value } => self.apply(key, value),
            _ => Err(ConfigError::InvalidOverride(entry.to_string())),
        }
    }

    /// Check the fields delivery cannot do without
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        validate_base_url(&self.api_url)?;
        Ok(self)
    }

    /// All configuration keys with their current values, in a stable order
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            (keys::API_KEY.to_string(), self.api_key.clone()),
            (keys::API_URL.to_string(), self.api_url.clone()),
            (keys::LOGGER.to_string(), self.log_level.as_str().to_string()),
            (keys::PROXY_ENABLED.to_string(), self.proxy.enabled.to_string()),
            (keys::PROXY_PORT.to_string(), self.proxy.port.to_string()),
            (keys::PROXY_HOST.to_string(), self.proxy.host.clone()),
            (keys::PROXY_PROTOCOL.to_string(), self.proxy.protocol.clone()),
            (keys::PROXY_USERNAME.to_string(), self.proxy.username.clone()),
            (keys::PROXY_PASSWORD.to_string(), self.proxy.password.clone()),
            (keys::TIMEOUT.to_string(), self.timeout_secs.to_string()),
        ];
        entries.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        entries
    }
}

/// Validate an absolute base URL and strip trailing slashes
pub(crate) fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !parsed.has_host() || parsed.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
