//! Validation helpers applied at the host boundary

/// Normalize a user-supplied component name to PascalCase.
///
/// Splits on whitespace, hyphens and underscores, capitalizes the first
/// letter of each segment and keeps the rest of the segment untouched, so
/// `"my nav-bar"` becomes `"MyNavBar"` and `"userCard"` stays `"UserCard"`.
pub fn normalize_component_name(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// Whether a normalized name is usable as a JSX component identifier:
/// a leading ASCII uppercase letter followed by identifier characters.
pub fn is_valid_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
