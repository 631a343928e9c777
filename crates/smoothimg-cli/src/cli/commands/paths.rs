//! `smoothimg paths <url>` – show derived cache paths without fetching.

use anyhow::Result;
use smoothimg_core::cache::CacheStore;
use smoothimg_core::config::{CacheKeyMode, SmoothConfig};
use smoothimg_core::locator::Locator;

pub fn run_paths(cfg: &SmoothConfig, url: &str) -> Result<()> {
    let locator = Locator::parse(url)?;
    let store = CacheStore::new(cfg.resolved_cache_dir()?, CacheKeyMode::Filename);
    let paths = store.paths_for(&locator, &[]);
    println!("raw:       {}", paths.raw.display());
    println!("processed: {}", paths.processed.display());
    println!(
        "cached:    {}",
        if store.is_processed(&paths) { "yes" } else { "no" }
    );
    if cfg.cache_key == CacheKeyMode::Content {
        println!("note: content-keyed cache; real names carry a digest prefix of the fetched body");
    }
    Ok(())
}
