//! Alert Message Parser
//!
//! A message is a sequence of `key: value` lines. Lines that do not start a
//! new key continue the value of the previous one.

use crate::record::AlertRecord;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

fn key_line() -> &'static Regex {
    static KEY_LINE: OnceLock<Regex> = OnceLock::new();
    KEY_LINE.get_or_init(|| Regex::new(r"^(\w+):\s*(.*)").expect("key line pattern is valid"))
}

/// Field currently being accumulated
struct PendingField<'a> {
    key: String,
    lines: Vec<&'a str>,
}

impl PendingField<'_> {
    fn flush_into(self, record: &mut AlertRecord) {
        let value = self.lines.join("\n").trim().to_string();
        record.insert(self.key, value);
    }
}

/// Parse a raw alert text block into an ordered record
///
/// Never fails: empty or unstructured input yields an empty record.
/// Continuation lines that appear before the first key line are dropped,
/// and a repeated key replaces the earlier value.
pub fn parse_message(text: &str) -> AlertRecord {
    let mut record = AlertRecord::new();
    let mut pending: Option<PendingField<'_>> = None;

    for line in text.lines() {
        if let Some(caps) = key_line().captures(line) {
            if let Some(field) = pending.take() {
                field.flush_into(&mut record);
            }
            let first = caps.get(2).map_or("", |m| m.as_str());
            pending = Some(PendingField {
                key: caps[1].to_string(),
                lines: vec![first],
            });
        } else if let Some(field) = pending.as_mut() {
            field.lines.push(line);
        } else {
            trace!("Discarding line with no preceding key: {:?}", line);
        }
    }

    if let Some(field) = pending.take() {
        field.flush_into(&mut record);
    }

    debug!("Parsed alert message into {} fields", record.len());
    record
}
