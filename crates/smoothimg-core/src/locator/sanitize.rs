//! Filename sanitization for cache entries.

/// Linux NAME_MAX.
pub const NAME_MAX: usize = 255;

fn is_forbidden(c: char) -> bool {
    matches!(c, '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
        || c.is_control()
        || c.is_whitespace()
}

/// Sanitizes a candidate filename so it can only name a file directly inside the cache dir.
///
/// - Replaces NUL, `/`, `\`, whitespace, control and Windows-reserved characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots, spaces and underscores (so `..` becomes empty)
/// - Limits length to 255 bytes
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    truncate_on_char_boundary(trimmed, NAME_MAX).to_string()
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}
