use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use parallax_core::consts::{
    DEFAULT_CROP_WIDTH, DEFAULT_KERNEL_SIZE, DEFAULT_LOG_SIGMA, DEFAULT_LR_THRESHOLD,
};
use parallax_core::disparity::{BlockMatcher, CorrelationParams, CostFunction, SearchWindow};
use parallax_core::offset::{OffsetEstimator, OffsetParams};

#[derive(Args)]
pub struct OffsetArgs {
    /// Left image
    pub left: PathBuf,

    /// Right image
    pub right: PathBuf,

    /// Write per-row mean offsets to this file
    #[arg(long = "rowLog")]
    pub row_log: Option<PathBuf>,

    /// Laplacian-of-Gaussian prefilter sigma (0 disables)
    #[arg(long = "log", default_value_t = DEFAULT_LOG_SIGMA)]
    pub log_sigma: f32,

    /// Width of the centred strip that is correlated
    #[arg(long = "cropWidth", default_value_t = DEFAULT_CROP_WIDTH)]
    pub crop_width: usize,

    /// Minimum horizontal disparity
    #[arg(long, default_value = "-30", allow_hyphen_values = true)]
    pub h_corr_min: i32,

    /// Maximum horizontal disparity
    #[arg(long, default_value = "30", allow_hyphen_values = true)]
    pub h_corr_max: i32,

    /// Minimum vertical disparity
    #[arg(long, default_value = "-5", allow_hyphen_values = true)]
    pub v_corr_min: i32,

    /// Maximum vertical disparity
    #[arg(long, default_value = "5", allow_hyphen_values = true)]
    pub v_corr_max: i32,

    /// Correlation kernel width
    #[arg(long, default_value_t = DEFAULT_KERNEL_SIZE)]
    pub xkernel: usize,

    /// Correlation kernel height
    #[arg(long, default_value_t = DEFAULT_KERNEL_SIZE)]
    pub ykernel: usize,

    /// Left/right consistency threshold in pixels
    #[arg(long, default_value_t = DEFAULT_LR_THRESHOLD)]
    pub lrthresh: i32,

    /// Cost function: 0 absolute difference, 1 squared difference,
    /// 2 normalized cross correlation
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub correlator_type: u8,

    /// Accepted for compatibility; has no effect
    #[arg(long)]
    pub affine_subpix: bool,

    /// Coarse-to-fine search
    #[arg(long)]
    pub pyramid: bool,
}

impl OffsetArgs {
    fn params(&self) -> Result<OffsetParams> {
        let cost = CostFunction::from_index(self.correlator_type)
            .with_context(|| format!("Unknown correlator type {}", self.correlator_type))?;
        Ok(OffsetParams {
            correlation: CorrelationParams {
                search: SearchWindow {
                    h_min: self.h_corr_min,
                    h_max: self.h_corr_max,
                    v_min: self.v_corr_min,
                    v_max: self.v_corr_max,
                },
                kernel: (self.xkernel, self.ykernel),
                cost,
                lr_threshold: self.lrthresh,
                pyramid: self.pyramid,
            },
            crop_width: self.crop_width,
            log_sigma: self.log_sigma,
            affine_subpixel: self.affine_subpix,
        })
    }
}

pub fn run(args: &OffsetArgs) -> Result<()> {
    for path in [&args.left, &args.right] {
        if !path.is_file() {
            anyhow::bail!("Input image not found: {}", path.display());
        }
    }
    let params = args.params()?;
    crate::summary::print_offset_summary(args, &params);

    let matcher = BlockMatcher::default();
    let estimator = OffsetEstimator::new(&matcher, params);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    pb.set_message("Correlating strip");
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = estimator.estimate_files(&args.left, &args.right, args.row_log.as_deref());
    pb.finish_and_clear();

    let estimate = result.context("Offset estimation failed")?;
    println!(
        "{} valid pixels in {} rows",
        estimate.samples,
        estimate.valid_rows()
    );
    println!("Mean sample offset = {}", estimate.offset_x);
    println!("Mean line offset = {}", estimate.offset_y);

    Ok(())
}
