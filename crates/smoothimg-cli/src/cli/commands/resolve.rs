//! `smoothimg resolve <url>` – fetch, enhance, decode.

use anyhow::{Context, Result};
use smoothimg_core::config::SmoothConfig;
use smoothimg_core::locator::Locator;
use smoothimg_core::resolver::{self, ImageResolver, Resolved};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub struct ResolveArgs {
    pub url: String,
    pub output: Option<PathBuf>,
    pub json: bool,
}

fn report_json(url: &str, r: &Resolved) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "width": r.width(),
        "height": r.height(),
        "resolution": r.resolution.as_str(),
        "source": r.source_path(),
        "raw": r.paths.raw,
        "processed": r.paths.processed,
    })
}

pub async fn run_resolve(cfg: &SmoothConfig, args: ResolveArgs) -> Result<()> {
    let locator = Locator::parse(&args.url)?;
    let resolver = Arc::new(ImageResolver::from_config(cfg)?);

    let resolved = resolver::resolve_async(resolver, locator)
        .await
        .with_context(|| format!("resolve {}", args.url))?;

    if let Some(out) = &args.output {
        resolved
            .bitmap
            .save(out)
            .with_context(|| format!("write {}", out.display()))?;
        tracing::info!("saved bitmap to {}", out.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&args.url, &resolved))?);
    } else {
        println!(
            "{}x{}  {}  {}",
            resolved.width(),
            resolved.height(),
            resolved.resolution.as_str(),
            resolved.source_path().display()
        );
    }
    Ok(())
}
