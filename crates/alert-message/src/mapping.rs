//! Zabbix to JSM Field Mapping

use crate::record::AlertRecord;
use tracing::debug;

/// Zabbix field name to JSM integration field name
pub const FIELD_MAPPING: [(&str, &str); 16] = [
    ("triggerName", "eventName"),
    ("triggerId", "triggerId"),
    ("triggerStatus", "status"),
    ("triggerSeverity", "severity"),
    ("triggerDescription", "description"),
    ("triggerUrl", "url"),
    ("triggerValue", "value"),
    ("triggerHostGroupName", "hostGroup"),
    ("hostName", "hostName"),
    ("ipAddress", "ipAddress"),
    ("eventId", "eventId"),
    ("date", "date"),
    ("time", "time"),
    ("itemKey", "itemKey"),
    ("itemValue", "itemValue"),
    ("recoveryEventStatus", "recoveryStatus"),
];

/// JSM name for a Zabbix field, if the field is recognized
pub fn target_key(source: &str) -> Option<&'static str> {
    FIELD_MAPPING
        .iter()
        .find(|(zabbix, _)| *zabbix == source)
        .map(|(_, jsm)| *jsm)
}

/// Project a parsed alert onto the JSM schema
///
/// Unrecognized fields are dropped and recognized fields that are absent
/// stay absent. Output follows the mapping table order.
pub fn translate(record: &AlertRecord) -> AlertRecord {
    let translated: AlertRecord = FIELD_MAPPING
        .iter()
        .filter_map(|(zabbix, jsm)| record.get(zabbix).map(|value| (*jsm, value)))
        .collect();

    let dropped = record.len().saturating_sub(translated.len());
    if dropped > 0 {
        debug!("Dropped {} unrecognized alert fields", dropped);
    }
    translated
}
