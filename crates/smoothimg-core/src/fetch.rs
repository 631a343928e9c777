//! HTTP GET of the image body.
//!
//! Uses the curl crate (libcurl). The transfer blocks the calling thread; use
//! [`crate::resolver::resolve_async`] from async code.

use crate::config::FetchConfig;
use crate::locator::Locator;
use thiserror::Error;

/// Failure to obtain a usable response body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("GET failed: {0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("GET returned HTTP {0}")]
    Http(u32),
    /// 2xx response without a body.
    #[error("GET returned an empty body")]
    EmptyBody,
}

/// Source of image bytes for a locator.
pub trait Fetch {
    fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, FetchError>;
}

/// libcurl-backed fetcher. One `Easy` handle per request; no shared state.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    cfg: FetchConfig,
}

impl CurlFetcher {
    pub fn new(cfg: FetchConfig) -> Self {
        Self { cfg }
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(locator.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(self.cfg.max_redirections)?;
        easy.connect_timeout(self.cfg.connect_timeout())?;
        if let Some(total) = self.cfg.timeout() {
            easy.timeout(total)?;
        }
        if let Some(ua) = &self.cfg.user_agent {
            easy.useragent(ua)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        tracing::debug!(url = %locator, bytes = body.len(), status = code, "fetched image");
        Ok(body)
    }
}
