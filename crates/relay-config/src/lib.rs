//! Relay Configuration
//!
//! Builds the effective configuration from, in increasing precedence:
//! built-in defaults, the `key=value` integration file, the JEC JSON file,
//! and per-invocation overrides.

mod error;
mod file;
mod jec;
mod settings;
mod store;

pub use error::ConfigError;
pub use file::{classify_line, ConfigLine};
pub use jec::JecConfig;
pub use settings::{keys, LogLevel, ProxySettings, Settings};
pub use store::{ConfigurationStore, DEFAULT_CONF_PATH, DEFAULT_JEC_CONF_PATH};
