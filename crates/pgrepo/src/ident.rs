//! Safe SQL identifier checking and column-name normalization.
//!
//! Column names are spliced into SQL text and cannot be parameterized like
//! values, so every name that reaches the compiler must pass
//! [`is_safe_identifier`]: one or two dot-separated segments, each matching
//! `[A-Za-z_][A-Za-z0-9_]*`.

use heck::ToSnakeCase;

/// Check a column name against the safe-identifier pattern.
///
/// Accepts `segment` or `qualifier.segment`. Rejects everything else,
/// including empty segments, a leading digit, quoting, and more than one dot.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut segments = 0;
    for segment in name.split('.') {
        segments += 1;
        if segments > 2 || !is_safe_segment(segment) {
            return false;
        }
    }
    true
}

fn is_safe_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Snake-case column normalizer, the default naming-convention translation.
///
/// Dot qualifiers survive: each segment is converted independently, so
/// `users.createdBy` becomes `users.created_by`.
pub fn snake_case(raw: &str) -> String {
    raw.split('.')
        .map(|segment| segment.to_snake_case())
        .collect::<Vec<_>>()
        .join(".")
}

/// Identity normalizer for callers whose column names are already SQL names.
pub fn verbatim(raw: &str) -> String {
    raw.to_string()
}
