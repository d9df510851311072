//! Canonical form of service and entry names used for routing

/// Collapse a human readable name into its routing identifier.
///
/// The name is lower-cased, every run of characters outside `[a-z0-9]` becomes a
/// single `-`, and leading/trailing dashes are dropped. Different names may map to
/// the same identifier, e.g. `"Billing API"` and `"billing_api"`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_dash = false;
            normalized.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    normalized
}
