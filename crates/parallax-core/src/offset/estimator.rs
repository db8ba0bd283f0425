use std::path::Path;

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_CROP_WIDTH, DEFAULT_LOG_SIGMA};
use crate::disparity::{CorrelationParams, Correlator, DisparityField};
use crate::error::{ParallaxError, Result};
use crate::filters::log::laplacian_of_gaussian;
use crate::frame::{fill_special, Extent, Frame};
use crate::io::image_io::load_image;
use crate::stats::StreamingStats;

use super::report::{write_row_log, ReportHeader};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetParams {
    pub correlation: CorrelationParams,
    /// Width of the centred vertical strip that is correlated.
    pub crop_width: usize,
    /// Laplacian-of-Gaussian prefilter sigma; 0 disables it.
    pub log_sigma: f32,
    /// Accepted for command-line compatibility; has no effect here.
    pub affine_subpixel: bool,
}

impl Default for OffsetParams {
    fn default() -> Self {
        Self {
            correlation: CorrelationParams::default(),
            crop_width: DEFAULT_CROP_WIDTH,
            log_sigma: DEFAULT_LOG_SIGMA,
            affine_subpixel: false,
        }
    }
}

/// Column range of the correlated strip within the common image area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripCrop {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Mean disparity over the valid cells of one strip row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowOffset {
    pub row: usize,
    pub mean_dx: f64,
    pub mean_dy: f64,
    pub valid: usize,
}

#[derive(Clone, Debug)]
pub struct OffsetEstimate {
    /// Mean horizontal disparity over all valid samples.
    pub offset_x: f64,
    /// Mean vertical disparity over all valid samples.
    pub offset_y: f64,
    pub stddev_x: f64,
    pub stddev_y: f64,
    pub samples: u64,
    /// Per-row means, for diagnostics only.
    pub rows: Vec<RowOffset>,
    pub common: Extent,
    pub crop: StripCrop,
}

impl OffsetEstimate {
    /// Rows that contributed at least one valid sample.
    pub fn valid_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.valid > 0).count()
    }
}

/// Runs a correlator on a centred strip of two images and reduces the
/// disparity field to one global shift.
pub struct OffsetEstimator<'a> {
    correlator: &'a dyn Correlator,
    params: OffsetParams,
}

impl<'a> OffsetEstimator<'a> {
    pub fn new(correlator: &'a dyn Correlator, params: OffsetParams) -> Self {
        Self { correlator, params }
    }

    pub fn params(&self) -> &OffsetParams {
        &self.params
    }

    /// Estimate the offset carrying `left` onto `right`.
    pub fn estimate(&self, left: &Frame, right: &Frame) -> Result<OffsetEstimate> {
        let common = Extent {
            width: left.width().min(right.width()),
            height: left.height().min(right.height()),
        };
        if common.width == 0 || common.height == 0 {
            return Err(ParallaxError::InvalidDimensions {
                width: common.width,
                height: common.height,
            });
        }

        let left_common = edge_extend(&left.data, common);
        let right_common = edge_extend(&right.data, common);

        let crop = centered_strip(common, self.params.crop_width);
        debug!(?crop, ?common, "Cropping to centred strip");
        let left_strip = self.prepare(&left_common, crop);
        let right_strip = self.prepare(&right_common, crop);

        let field = self
            .correlator
            .correlate(&left_strip, &right_strip, &self.params.correlation)?;
        reduce(&field, common, crop)
    }

    /// Load both images, estimate, and optionally write a row log.
    ///
    /// A log that cannot be written is reported and skipped; the estimate is
    /// still returned.
    pub fn estimate_files(
        &self,
        left: &Path,
        right: &Path,
        row_log: Option<&Path>,
    ) -> Result<OffsetEstimate> {
        let left_frame = load_image(left)?;
        let right_frame = load_image(right)?;
        let estimate = self.estimate(&left_frame, &right_frame)?;

        if let Some(log_path) = row_log {
            let header = ReportHeader {
                left,
                right,
                params: &self.params,
                common: estimate.common,
                crop: estimate.crop,
            };
            match write_row_log(log_path, &header, Some(&estimate)) {
                Ok(()) => info!(path = %log_path.display(), "Wrote row offset log"),
                Err(err) => warn!(%err, "Row offset log skipped"),
            }
        }
        Ok(estimate)
    }

    fn prepare(&self, data: &Array2<f32>, crop: StripCrop) -> Array2<f32> {
        let strip = data
            .slice(s![crop.y..crop.y + crop.height, crop.x..crop.x + crop.width])
            .to_owned();
        laplacian_of_gaussian(&fill_special(&strip, 0.0), self.params.log_sigma)
    }
}

/// Resize to `extent` by edge extension: cropped where larger, padded with
/// the border value where smaller.
pub fn edge_extend(data: &Array2<f32>, extent: Extent) -> Array2<f32> {
    let (h, w) = data.dim();
    if (h, w) == (extent.height, extent.width) {
        return data.clone();
    }
    Array2::from_shape_fn((extent.height, extent.width), |(row, col)| {
        data[[row.min(h - 1), col.min(w - 1)]]
    })
}

/// Full-height strip of `crop_width` columns centred on the midpoint,
/// clipped to the image.
fn centered_strip(extent: Extent, crop_width: usize) -> StripCrop {
    let width = crop_width.clamp(1, extent.width);
    let x = (extent.width / 2).saturating_sub(crop_width / 2).min(extent.width - width);
    StripCrop {
        x,
        y: 0,
        width,
        height: extent.height,
    }
}

/// Per-row means plus sample-level mean and deviation on each axis.
fn reduce(field: &DisparityField, common: Extent, crop: StripCrop) -> Result<OffsetEstimate> {
    let mut stats_x = StreamingStats::new();
    let mut stats_y = StreamingStats::new();
    let mut rows = Vec::with_capacity(field.height());
    let mut rows_with_matches = 0;

    for row in 0..field.height() {
        let (mut sum_x, mut sum_y, mut valid) = (0.0f64, 0.0f64, 0usize);
        for col in 0..field.width() {
            let Some((dx, dy)) = field.get(col, row).vector() else {
                continue;
            };
            sum_x += dx as f64;
            sum_y += dy as f64;
            valid += 1;
            stats_x.push(dx as f64);
            stats_y.push(dy as f64);
        }
        let (mean_dx, mean_dy) = if valid > 0 {
            rows_with_matches += 1;
            (sum_x / valid as f64, sum_y / valid as f64)
        } else {
            (0.0, 0.0)
        };
        rows.push(RowOffset {
            row,
            mean_dx,
            mean_dy,
            valid,
        });
    }

    if rows_with_matches == 0 {
        return Err(ParallaxError::NoValidMatches(
            "no row of the correlated strip has a valid disparity".into(),
        ));
    }

    info!(
        offset_x = stats_x.mean(),
        offset_y = stats_y.mean(),
        samples = stats_x.count(),
        rows = rows_with_matches,
        "Estimated global offset"
    );
    Ok(OffsetEstimate {
        offset_x: stats_x.mean(),
        offset_y: stats_y.mean(),
        stddev_x: stats_x.standard_deviation(),
        stddev_y: stats_y.standard_deviation(),
        samples: stats_x.count(),
        rows,
        common,
        crop,
    })
}
