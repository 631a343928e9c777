//! Image locators and cache filename derivation.
//!
//! A locator is the URL of a remote image. Its last path segment names the
//! cache entries, sanitized so a crafted URL cannot point outside the cache dir.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::{sanitize_filename, truncate_on_char_boundary, NAME_MAX};

use crate::digest;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Prefix of the fallback name used when the URL yields no usable filename.
const FALLBACK_PREFIX: &str = "image-";

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("invalid image URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported URL scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),
}

/// A parsed HTTP(S) image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    url: Url,
}

impl Locator {
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let url = Url::parse(input.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(Locator { url }),
            other => Err(LocatorError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Safe local filename for this locator.
    ///
    /// Uses the sanitized last path segment; falls back to `image-<digest of URL>`
    /// when nothing usable remains.
    ///
    /// - `https://example.com/photos/cat.jpg` → `"cat.jpg"`
    /// - `https://example.com/` → `"image-<16 hex>"`
    pub fn file_name(&self) -> String {
        let sanitized = filename_from_url_path(&self.url)
            .map(|s| sanitize_filename(&s))
            .unwrap_or_default();
        if sanitized.is_empty() {
            format!(
                "{}{}",
                FALLBACK_PREFIX,
                digest::short_hex(self.url.as_str().as_bytes())
            )
        } else {
            sanitized
        }
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
