use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use parallax_core::session::config::SessionConfig;
use parallax_core::session::{SessionStage, StereoSession};

/// Inputs shared by every session stage.
#[derive(Args)]
pub struct SessionArgs {
    /// Left image
    pub left: PathBuf,

    /// Right image
    pub right: PathBuf,

    /// Session config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output prefix, e.g. out/run writes out/run-L.tif
    #[arg(short, long, default_value = "run")]
    pub out_prefix: PathBuf,

    /// Skip feature-based alignment of unprojected images
    #[arg(long)]
    pub no_align: bool,

    /// Invalidate disparities on near-black mask pixels
    #[arg(long)]
    pub mask_near_black: bool,

    /// Directory for cached interest points and matches
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl SessionArgs {
    pub fn load_config(&self) -> Result<SessionConfig> {
        if let Some(ref path) = self.config {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            return toml::from_str(&contents).context("Invalid session config");
        }

        let mut config = SessionConfig::new(&self.out_prefix);
        config.alignment.enabled = !self.no_align;
        config.filtering.mask_near_black = self.mask_near_black;
        config.cache_dir = self.cache_dir.clone();
        Ok(config)
    }

    pub fn open(&self) -> Result<StereoSession> {
        let config = self.load_config()?;
        Ok(StereoSession::new(config, &self.left, &self.right))
    }
}

/// Run `work` behind a spinner labelled with the stage name.
pub fn with_spinner<T>(stage: SessionStage, work: impl FnOnce() -> T) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    pb.set_message(stage.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = work();
    pb.finish_and_clear();
    Ok(out)
}
