//! On-disk cache of raw and processed image files.
//!
//! Each locator maps to two files in the cache dir: `<name>` holding the
//! fetched bytes verbatim and `<name>.png` written by the external decoder.
//! Existence of the processed file is the only cache-hit signal. Files are
//! never cleaned up.

use crate::config::CacheKeyMode;
use crate::digest;
use crate::locator::{truncate_on_char_boundary, Locator, NAME_MAX};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the raw path to name the decoder output.
pub const PROCESSED_SUFFIX: &str = ".png";

/// Longest raw name that still leaves room for the processed suffix.
const RAW_NAME_MAX: usize = NAME_MAX - PROCESSED_SUFFIX.len();

/// `<16 hex>-` prepended in content mode.
const CONTENT_PREFIX_LEN: usize = digest::SHORT_HEX_LEN + 1;

/// Shortens `name` to at most `budget` bytes. Names that don't fit keep a
/// truncated head plus a digest of the full name, so distinct long names stay distinct.
fn fit_name(name: String, budget: usize) -> String {
    if name.len() <= budget {
        return name;
    }
    let tag = digest::short_hex(name.as_bytes());
    let head = truncate_on_char_boundary(&name, budget - tag.len() - 1);
    format!("{}-{}", head, tag)
}

/// Raw and processed paths for one locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub raw: PathBuf,
    pub processed: PathBuf,
}

impl CachePaths {
    /// Paths for cache entry `name` inside `dir`. `name` must already be sanitized.
    pub fn new(dir: &Path, name: &str) -> Self {
        let raw = dir.join(name);
        Self {
            processed: processed_path(&raw),
            raw,
        }
    }
}

/// Processed path for a raw path: appends `.png` (e.g. `a.jpg` → `a.jpg.png`).
pub fn processed_path(raw: &Path) -> PathBuf {
    let mut o = raw.as_os_str().to_owned();
    o.push(PROCESSED_SUFFIX);
    PathBuf::from(o)
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    mode: CacheKeyMode,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, mode: CacheKeyMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derives cache paths for `locator`. `body` is only consulted in content mode.
    ///
    /// Both file names, prefix and `.png` suffix included, fit in NAME_MAX.
    pub fn paths_for(&self, locator: &Locator, body: &[u8]) -> CachePaths {
        let name = locator.file_name();
        let name = match self.mode {
            CacheKeyMode::Filename => fit_name(name, RAW_NAME_MAX),
            CacheKeyMode::Content => format!(
                "{}-{}",
                digest::short_hex(body),
                fit_name(name, RAW_NAME_MAX - CONTENT_PREFIX_LEN)
            ),
        };
        CachePaths::new(&self.dir, &name)
    }

    /// Removes the processed file if present; a leftover from a failed decoder
    /// run would otherwise be served as a cache hit.
    pub fn discard_processed(&self, paths: &CachePaths) {
        match std::fs::remove_file(&paths.processed) {
            Ok(()) => {
                tracing::debug!(path = %paths.processed.display(), "discarded processed file")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %paths.processed.display(),
                "cannot remove processed file: {}",
                e
            ),
        }
    }

    pub fn is_processed(&self, paths: &CachePaths) -> bool {
        paths.processed.exists()
    }

    /// Writes `body` to the raw path via a temp file in the cache dir and a rename,
    /// so concurrent readers never see a partial raw file.
    pub fn write_raw(&self, paths: &CachePaths, body: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".smoothimg-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        tmp.write_all(body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&paths.raw).map_err(|e| e.error)?;
        tracing::debug!(path = %paths.raw.display(), bytes = body.len(), "wrote raw file");
        Ok(())
    }
}
