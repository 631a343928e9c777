//! `smoothimg check-decoder` – verify the external decoder can be started.

use anyhow::Result;
use smoothimg_core::config::SmoothConfig;
use smoothimg_core::decoder::ExternalDecoder;

pub fn run_check_decoder(cfg: &SmoothConfig) -> Result<()> {
    let decoder = ExternalDecoder::from_config(&cfg.decoder);
    if !cfg.decoder.enabled {
        println!("decoder disabled in config ({})", decoder.program().display());
        return Ok(());
    }
    if decoder.is_available() {
        println!("decoder available: {}", decoder.program().display());
        Ok(())
    } else {
        anyhow::bail!(
            "decoder `{}` cannot be started; images will load from raw files",
            decoder.program().display()
        )
    }
}
