//! JSM Request Payload

use alert_message::AlertRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};

const API_KEY_FIELD: &str = "apiKey";

/// Translated alert fields plus the integration API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPayload {
    fields: AlertRecord,
    api_key: String,
}

impl AlertPayload {
    pub fn new(fields: AlertRecord, api_key: impl Into<String>) -> Self {
        Self {
            fields,
            api_key: api_key.into(),
        }
    }

    pub fn fields(&self) -> &AlertRecord {
        &self.fields
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Body entries in wire order, `apiKey` last
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(key, _)| *key != API_KEY_FIELD)
            .chain(std::iter::once((API_KEY_FIELD, self.api_key.as_str())))
    }

    /// `[TriggerId: .., HostName: ..]` prefix for log lines
    pub fn log_prefix(&self) -> String {
        format!(
            "[TriggerId: {}, HostName: {}]",
            self.fields.get("triggerId").unwrap_or_default(),
            self.fields.get("hostName").unwrap_or_default()
        )
    }
}

impl Serialize for AlertPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.entries() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
