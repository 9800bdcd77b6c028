//! Zabbix to JSM Alert Relay
//!
//! Parses a Zabbix alert, maps it onto the JSM integration schema and
//! delivers it with bounded retries.

mod error;
pub mod logging;
mod pipeline;

pub use error::RelayError;
pub use pipeline::{log_settings, AlertSource, Pipeline};
