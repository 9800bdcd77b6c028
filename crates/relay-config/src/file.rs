//! `key=value` Integration File Format

/// One line of an integration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLine<'a> {
    /// Blank line or `#` comment
    Skip,
    /// `key=value`, split on the first `=`, both sides trimmed
    Entry { key: &'a str, value: &'a str },
    /// Line with no `=`
    Invalid(&'a str),
}

/// Classify a single line of the integration file
pub fn classify_line(line: &str) -> ConfigLine<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ConfigLine::Skip;
    }

    match line.split_once('=') {
        Some((key, value)) => ConfigLine::Entry {
            key: key.trim(),
            value: value.trim(),
        },
        None => ConfigLine::Invalid(line),
    }
}
