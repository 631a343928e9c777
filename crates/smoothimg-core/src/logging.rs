//! Tracing setup. Events go to an append-only file in the XDG state dir when
//! it is writable, to stderr otherwise.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const APP_DIR: &str = "smoothimg";
const LOG_FILE: &str = "smoothimg.log";
const DEFAULT_FILTER: &str = "info,smoothimg=debug,smoothimg_core=debug";

/// Where formatted events are written.
enum LogTarget {
    File(Arc<File>),
    Stderr,
}

impl LogTarget {
    fn writer(self) -> BoxMakeWriter {
        match self {
            // `&File` is `Write`, so every event shares one handle without cloning it.
            LogTarget::File(file) => BoxMakeWriter::new(file),
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install(target: LogTarget) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(target.writer())
                .with_ansi(false),
        )
        .try_init()
        .context("a global tracing subscriber is already installed")
}

/// Log file location, `$XDG_STATE_HOME/smoothimg/smoothimg.log`.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR)?;
    Ok(xdg_dirs.get_state_home().join(APP_DIR).join(LOG_FILE))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log dir {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Sends events to the log file. Errors leave no subscriber installed, so the
/// caller can still use [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    let file = open_log_file(&path)?;
    install(LogTarget::File(Arc::new(file)))?;
    tracing::info!(path = %path.display(), "smoothimg logging initialized");
    Ok(())
}

/// Sends events to stderr. A no-op if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = install(LogTarget::Stderr);
}
