//! Credential Masking for Diagnostics

/// Replacement text for sensitive values
pub const MASK: &str = "*******";

/// Whether a key names a credential
///
/// Case-sensitive: `password` or `key` anywhere in the name.
pub fn is_sensitive(key: &str) -> bool {
    key.contains("password") || key.contains("key")
}

/// Value to show in logs for `key`
pub fn mask_value<'a>(key: &str, value: &'a str) -> &'a str {
    if is_sensitive(key) {
        MASK
    } else {
        value
    }
}

/// Mask every sensitive entry
pub fn mask_entries<'a, I>(entries: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), mask_value(key, value).to_string()))
        .collect()
}

/// Render entries as `{key: value, ...}` with sensitive values masked
pub fn render_masked<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let body = entries
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key, mask_value(key, value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}
