use std::collections::HashSet;

/// Identifiers follow `[A-Za-z][A-Za-z0-9_]*`.
pub fn is_valid_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() =>
            chars.all(|char| char.is_ascii_alphanumeric() || char == '_'),
        _ => false
    }
}

pub fn are_valid_identifiers<S: AsRef<str>>(ids: &[S]) -> bool {
    ids.iter().all(|id| is_valid_identifier(id.as_ref()))
}

pub fn are_unique_identifiers<S: AsRef<str>>(ids: &[S]) -> bool {
    let mut seen = HashSet::new();
    ids.iter().all(|id| seen.insert(id.as_ref()))
}

// The identifier grammar is prefix-closed, so every non-empty valid prefix is itself an identifier.
pub fn is_valid_identifier_prefix(prefix: &str) -> bool {
    is_valid_identifier(prefix)
}
