//! URL-safe identifiers derived from display names.

/// Lowercase ASCII alphanumerics; every run of other characters
/// becomes a single `-`, never leading or trailing.
///
/// `"Food & Beverage"` → `"food-beverage"`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
