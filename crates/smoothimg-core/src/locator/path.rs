//! Filename extraction from URL path.

use url::Url;

/// Extracts the last non-empty path segment from a URL for use as a filename hint.
///
/// Returns `None` if the path is empty/root or the segment is `.`/`..`.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
