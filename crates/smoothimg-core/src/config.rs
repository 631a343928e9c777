use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// How cache filenames are keyed.
///
/// `Filename` names cache entries after the locator's last path segment only, so a
/// changed remote body behind the same filename keeps serving the old processed file.
/// `Content` prefixes the name with a digest of the fetched bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeyMode {
    #[default]
    Filename,
    Content,
}

/// HTTP fetch parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Total transfer timeout in seconds (0 = no limit).
    pub timeout_secs: u64,
    /// Maximum number of redirects followed.
    pub max_redirections: u32,
    /// Optional User-Agent header.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when the total timeout is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// External decoder parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// When false, the decoder is never spawned and the raw file is loaded.
    pub enabled: bool,
    /// Program name or path (looked up in PATH when bare).
    pub program: String,
    /// Extra arguments placed before `<raw> -o<processed>`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Kill the decoder after this many seconds (None = wait forever).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "jpeg2png".to_string(),
            args: Vec::new(),
            timeout_secs: Some(120),
        }
    }
}

/// Global configuration loaded from `~/.config/smoothimg/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmoothConfig {
    /// Directory for raw and processed files (None = process working directory).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_key: CacheKeyMode,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

impl SmoothConfig {
    /// Cache directory, falling back to the current working directory.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("smoothimg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SmoothConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SmoothConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SmoothConfig = toml::from_str(&data)?;
    Ok(cfg)
}
