use std::path::{Path, PathBuf};

use tracing::info;

use crate::disparity::DisparityField;
use crate::error::Result;
use crate::frame::{is_special, Frame};
use crate::io::disparity::{read_disparity, write_disparity};
use crate::io::image_io::{load_image, save_image};

use super::{SessionStage, StereoSession};

impl StereoSession {
    /// Invalidate disparities that start on a near-black left mask pixel or
    /// land on a near-black (or missing) right mask pixel.
    ///
    /// Each mask is first combined with the near-black pixels of its input
    /// image and the result is written to `<prefix>-lMaskDebug.tif` and
    /// `<prefix>-rMaskDebug.tif`. Returns the input unchanged when masking
    /// is disabled.
    pub fn filter(&self, disparity: &DisparityField) -> Result<DisparityField> {
        let settings = &self.config.filtering;
        if !settings.mask_near_black {
            info!(stage = %SessionStage::Filtering, "Masking disabled, passing disparity through");
            return Ok(disparity.clone());
        }

        let paths = self.paths();
        let threshold = settings.near_black_threshold;
        let left_mask = combined_mask(&paths.left_mask(), &self.left, threshold)?;
        let right_mask = combined_mask(&paths.right_mask(), &self.right, threshold)?;
        save_image(&left_mask, &paths.left_mask_debug())?;
        save_image(&right_mask, &paths.right_mask_debug())?;
        let keep = |mask: &Frame, col: i64, row: i64| -> bool {
            if col < 0 || row < 0 || col >= mask.width() as i64 || row >= mask.height() as i64 {
                return false;
            }
            mask.data[[row as usize, col as usize]] > 0.0
        };

        let mut out = disparity.clone();
        let mut removed = 0usize;
        for row in 0..disparity.height() {
            for col in 0..disparity.width() {
                let Some(target) = disparity.target(col, row) else {
                    continue;
                };
                let left_ok = keep(&left_mask, col as i64, row as i64);
                let right_ok = keep(
                    &right_mask,
                    target.x.round() as i64,
                    target.y.round() as i64,
                );
                if !(left_ok && right_ok) {
                    out.invalidate(col, row);
                    removed += 1;
                }
            }
        }

        info!(
            stage = %SessionStage::Filtering,
            removed,
            remaining = out.valid_count(),
            "Applied near-black masks"
        );
        Ok(out)
    }

    /// File-driven [`filter`](Self::filter): reads `input` (default
    /// `<prefix>-D.disp`) and writes `<prefix>-F.disp`.
    pub fn filter_files(&self, input: Option<&Path>) -> Result<PathBuf> {
        let paths = self.paths();
        let input = input.map(Path::to_path_buf).unwrap_or_else(|| paths.disparity());
        let disparity = read_disparity(&input)?;
        let filtered = self.filter(&disparity)?;
        let output = paths.filtered_disparity();
        write_disparity(&filtered, &output)?;
        Ok(output)
    }
}

/// Binary mask: 1 where the mask file is above `threshold` and the input
/// image is not near-black. Mask pixels past the image edge keep their
/// mask value.
fn combined_mask(mask_path: &Path, image_path: &Path, threshold: f32) -> Result<Frame> {
    let mask = load_image(mask_path)?;
    let image = load_image(image_path)?;
    let mut out = mask.data.mapv(|v| if !is_special(v) && v > threshold { 1.0 } else { 0.0 });

    let rows = out.nrows().min(image.height());
    let cols = out.ncols().min(image.width());
    for row in 0..rows {
        for col in 0..cols {
            if image.data[[row, col]].max(0.0) <= threshold {
                out[[row, col]] = 0.0;
            }
        }
    }
    Ok(Frame::new(out))
}
