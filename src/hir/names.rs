//! Keyword and variable name matching.
//!
//! Names compare case-insensitively with spaces and underscores ignored:
//! `Open Browser`, `open_browser` and `OpenBrowser` are the same keyword,
//! and `${User Name}` is the same variable as `@{username}`.

use smol_str::SmolStr;

/// Normalize a keyword or variable base name for comparison.
pub fn normalize_name(name: &str) -> SmolStr {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized base name of a variable token.
///
/// Accepts `${name}`, `@{name}`, `&{name}`, `%{name}`, optionally followed by
/// `=` (assignment) or `[...]` item access.
pub fn variable_base_name(token: &str) -> Option<SmolStr> {
    let token = token.trim().trim_end_matches('=').trim_end();
    let body = token.get(1..)?.strip_prefix('{')?;
    if !matches!(token.as_bytes().first(), Some(b'$' | b'@' | b'&' | b'%')) {
        return None;
    }
    let close = matching_brace(body)?;
    let rest = &body[close + 1..];
    if !rest.is_empty() && !rest.starts_with('[') {
        return None;
    }
    let name = &body[..close];
    if name.is_empty() {
        return None;
    }
    Some(normalize_name(name))
}

/// The first variable token embedded anywhere in `text`.
///
/// `Hello ${first name}!` yields `${first name}`.
pub fn find_variable(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len().saturating_sub(1) {
        if matches!(bytes[start], b'$' | b'@' | b'&' | b'%') && bytes[start + 1] == b'{' {
            // Sigils are ASCII, so `start + 2` is a char boundary.
            let Some(close) = matching_brace(&text[start + 2..]) else {
                continue;
            };
            return Some(&text[start..start + 2 + close + 1]);
        }
    }
    None
}

/// Index of the `}` closing an already-opened `{`, honoring nesting.
fn matching_brace(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(index),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split `Library.Keyword` into its owner and keyword parts.
///
/// Only the last `.` separates, so `my.pkg.Lib.Do It` gives
/// (`my.pkg.Lib`, `Do It`).
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let (owner, keyword) = name.rsplit_once('.')?;
    if owner.is_empty() || keyword.trim().is_empty() {
        return None;
    }
    Some((owner, keyword))
}
