//! Alert Relay Pipeline

use crate::error::RelayError;
use alert_message::{parse_message, translate, AlertRecord};
use jsm_delivery::mask::mask_entries;
use jsm_delivery::{AlertPayload, Delivery, DeliveryClient, RetryPolicy};
use relay_config::Settings;
use tracing::{debug, enabled, Level};

/// Where the alert fields come from
#[derive(Debug, Clone)]
pub enum AlertSource {
    /// Raw `key: value` text block
    Message(String),
    /// Fields given one by one, e.g. as command-line flags
    Fields(AlertRecord),
}

impl AlertSource {
    /// Zabbix-side record for this source
    pub fn into_record(self) -> AlertRecord {
        match self {
            Self::Message(text) => parse_message(&text),
            Self::Fields(record) => record,
        }
    }
}

/// Dump the effective configuration at debug level, credentials masked
pub fn log_settings(settings: &Settings) {
    if !enabled!(Level::DEBUG) {
        return;
    }
    let entries = settings.entries();
    debug!("Config:");
    for (key, value) in mask_entries(entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
        debug!("{}={}", key, value);
    }
}

/// One alert, one delivery
pub struct Pipeline {
    settings: Settings,
    client: DeliveryClient,
}

impl Pipeline {
    /// Build the pipeline from validated settings
    pub fn new(settings: Settings) -> Result<Self, RelayError> {
        log_settings(&settings);
        let client = DeliveryClient::new(&settings)?;
        Ok(Self { settings, client })
    }

    /// Replace the delivery retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.client = self.client.with_policy(policy);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Translate the alert and attach the API key
    pub fn prepare(&self, source: AlertSource) -> AlertPayload {
        let record = source.into_record();
        debug!(
            "Alert fields: {}",
            record.keys().collect::<Vec<_>>().join(", ")
        );
        AlertPayload::new(translate(&record), self.settings.api_key.clone())
    }

    /// Parse, translate and deliver a single alert
    pub async fn run(&self, source: AlertSource) -> Result<Delivery, RelayError> {
        let payload = self.prepare(source);
        Ok(self.client.send(&payload).await?)
    }
}
