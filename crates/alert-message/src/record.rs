//! Ordered Alert Record

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping of alert field names to values
///
/// Keys keep the position of their first insertion. Inserting an existing
/// key replaces its value in place, so the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertRecord {
    entries: Vec<(String, String)>,
}

impl AlertRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the record holds a field
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterate field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for AlertRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key.into(), value.into());
        }
        record
    }
}

impl Serialize for AlertRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
