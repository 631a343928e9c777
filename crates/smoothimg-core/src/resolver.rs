//! Image resolution: fetch, cache, enhance, decode.
//!
//! One call runs the whole pipeline on the calling thread:
//!
//! 1. GET the locator (always, even when the processed file is cached).
//! 2. Derive raw/processed paths in the cache dir.
//! 3. Cached processed file: decode it and return.
//! 4. Otherwise write the raw file, run the decoder, and decode its output,
//!    falling back to the raw file when the decoder fails.
//!
//! A bitmap that cannot be decoded at all is an error, never an empty image.

use crate::bitmap::Bitmap;
use crate::cache::{CachePaths, CacheStore};
use crate::config::SmoothConfig;
use crate::decoder::{Enhance, ExternalDecoder};
use crate::fetch::{CurlFetcher, Fetch, FetchError};
use crate::locator::Locator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Which file the returned bitmap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Processed file already existed; nothing was written or spawned.
    CacheHit,
    /// Decoder succeeded; bitmap decoded from its output.
    Decoded,
    /// Decoder failed or is disabled; bitmap decoded from the raw bytes.
    FallbackRaw,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::CacheHit => "cache-hit",
            Resolution::Decoded => "decoded",
            Resolution::FallbackRaw => "fallback-raw",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub bitmap: Bitmap,
    pub resolution: Resolution,
    pub paths: CachePaths,
}

impl Resolved {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Path the bitmap was decoded from.
    pub fn source_path(&self) -> &Path {
        match self.resolution {
            Resolution::CacheHit | Resolution::Decoded => &self.paths.processed,
            Resolution::FallbackRaw => &self.paths.raw,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("resolve task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn load(path: &Path) -> Result<Bitmap, ResolveError> {
    Bitmap::load(path).map_err(|source| ResolveError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves locators to bitmaps. `decoder = None` skips enhancement entirely.
pub struct ImageResolver<F = CurlFetcher, E = ExternalDecoder> {
    fetcher: F,
    decoder: Option<E>,
    store: CacheStore,
}

impl ImageResolver<CurlFetcher, ExternalDecoder> {
    /// Resolver wired from configuration: curl fetcher, external decoder (if enabled)
    /// running in the cache dir.
    pub fn from_config(cfg: &SmoothConfig) -> anyhow::Result<Self> {
        let dir = cfg.resolved_cache_dir()?;
        let decoder = cfg
            .decoder
            .enabled
            .then(|| ExternalDecoder::from_config(&cfg.decoder).with_working_dir(&dir));
        Ok(Self::new(
            CurlFetcher::new(cfg.fetch.clone()),
            decoder,
            CacheStore::new(dir, cfg.cache_key),
        ))
    }
}

impl<F: Fetch, E: Enhance> ImageResolver<F, E> {
    pub fn new(fetcher: F, decoder: Option<E>, store: CacheStore) -> Self {
        Self {
            fetcher,
            decoder,
            store,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn resolve(&self, locator: &Locator) -> Result<Resolved, ResolveError> {
        let body = self.fetcher.fetch(locator)?;
        let paths = self.store.paths_for(locator, &body);
        tracing::debug!(
            url = %locator,
            raw = %paths.raw.display(),
            processed = %paths.processed.display(),
            "cache paths"
        );

        if self.store.is_processed(&paths) {
            let bitmap = load(&paths.processed)?;
            tracing::info!(url = %locator, width = bitmap.width(), height = bitmap.height(), "cache hit");
            return Ok(Resolved {
                bitmap,
                resolution: Resolution::CacheHit,
                paths,
            });
        }

        self.store
            .write_raw(&paths, &body)
            .map_err(|source| ResolveError::Io {
                path: paths.raw.clone(),
                source,
            })?;

        let (bitmap, resolution) = self.enhance_and_load(&paths)?;
        tracing::info!(
            url = %locator,
            width = bitmap.width(),
            height = bitmap.height(),
            resolution = resolution.as_str(),
            "resolved image"
        );
        Ok(Resolved {
            bitmap,
            resolution,
            paths,
        })
    }

    fn enhance_and_load(&self, paths: &CachePaths) -> Result<(Bitmap, Resolution), ResolveError> {
        if let Some(decoder) = &self.decoder {
            let outcome = decoder.enhance(&paths.raw, &paths.processed);
            if outcome.is_success() {
                if paths.processed.exists() {
                    match load(&paths.processed) {
                        Ok(bitmap) => return Ok((bitmap, Resolution::Decoded)),
                        Err(e) => tracing::warn!("{}; using raw file", e),
                    }
                } else {
                    tracing::warn!(
                        processed = %paths.processed.display(),
                        "decoder exited 0 without output; using raw file"
                    );
                }
            } else {
                tracing::warn!(outcome = ?outcome, "decoder did not succeed; using raw file");
            }
            // Whatever a failed run left behind would otherwise count as a cache hit.
            self.store.discard_processed(paths);
        }
        Ok((load(&paths.raw)?, Resolution::FallbackRaw))
    }
}

/// Runs [`ImageResolver::resolve`] on tokio's blocking pool so async callers
/// await the network and decoder work instead of stalling a runtime thread.
pub async fn resolve_async<F, E>(
    resolver: Arc<ImageResolver<F, E>>,
    locator: Locator,
) -> Result<Resolved, ResolveError>
where
    F: Fetch + Send + Sync + 'static,
    E: Enhance + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || resolver.resolve(&locator)).await?
}
