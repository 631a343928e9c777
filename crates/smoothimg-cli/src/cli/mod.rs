//! CLI for the smoothimg image resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use smoothimg_core::config::{self, SmoothConfig};
use std::path::PathBuf;

use commands::{run_check_decoder, run_config_path, run_paths, run_resolve, ResolveArgs};

/// Top-level CLI for smoothimg.
#[derive(Debug, Parser)]
#[command(name = "smoothimg")]
#[command(about = "smoothimg: fetch, enhance and cache remote images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch an image, enhance it with the external decoder, and report its size.
    Resolve {
        /// Direct HTTP/HTTPS image URL.
        url: String,
        /// Directory for raw and processed files (default: config, else current dir).
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
        /// Decoder program to run instead of the configured one.
        #[arg(long, value_name = "PROG", conflicts_with = "no_decoder")]
        decoder: Option<String>,
        /// Skip the external decoder and load the raw image.
        #[arg(long)]
        no_decoder: bool,
        /// Also write the resolved bitmap to this file (format from extension).
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the raw and processed cache paths derived for a URL.
    Paths {
        /// Direct HTTP/HTTPS image URL.
        url: String,
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },

    /// Check whether the external decoder can be started.
    CheckDecoder {
        #[arg(long, value_name = "PROG")]
        decoder: Option<String>,
    },

    /// Print the path of the configuration file.
    ConfigPath,
}

/// Applies per-invocation overrides on top of the loaded config.
fn with_overrides(
    mut cfg: SmoothConfig,
    cache_dir: Option<PathBuf>,
    decoder: Option<String>,
    no_decoder: bool,
) -> SmoothConfig {
    if let Some(dir) = cache_dir {
        cfg.cache_dir = Some(dir);
    }
    if let Some(prog) = decoder {
        cfg.decoder.program = prog;
        cfg.decoder.enabled = true;
    }
    if no_decoder {
        cfg.decoder.enabled = false;
    }
    cfg
}

fn load_config() -> Result<SmoothConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve {
                url,
                cache_dir,
                decoder,
                no_decoder,
                output,
                json,
            } => {
                let cfg = with_overrides(load_config()?, cache_dir, decoder, no_decoder);
                run_resolve(&cfg, ResolveArgs { url, output, json }).await?;
            }
            CliCommand::Paths { url, cache_dir } => {
                let cfg = with_overrides(load_config()?, cache_dir, None, false);
                run_paths(&cfg, &url)?;
            }
            CliCommand::CheckDecoder { decoder } => {
                let cfg = with_overrides(load_config()?, None, decoder, false);
                run_check_decoder(&cfg)?;
            }
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
