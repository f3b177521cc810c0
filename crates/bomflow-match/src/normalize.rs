//! Identifier and description normalization.

/// Normalize a part identifier for comparison: uppercase, alphanumeric
/// characters only.
///
/// "r-100", "R 100" and "R100" all normalize to "R100".
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Tokenize a description into a lowercase alphanumeric token set.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens: Vec<String> = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}
