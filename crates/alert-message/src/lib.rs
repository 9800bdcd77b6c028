//! Alert Message Handling
//!
//! Turns the text block a Zabbix media script hands us into an ordered
//! field record, and projects that record onto the JSM integration schema.

mod mapping;
mod parser;
mod record;

pub use mapping::{target_key, translate, FIELD_MAPPING};
pub use parser::parse_message;
pub use record::AlertRecord;
