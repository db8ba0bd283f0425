use std::path::PathBuf;

use tracing::info;

use crate::align::{warp_frame, AlignmentMatrix, FeatureAligner};
use crate::error::{ParallaxError, Result};
use crate::features::{AlignmentCache, ImagePairKey};
use crate::frame::{Extent, Frame};
use crate::io::image_io::{load_image, normalize_to_u8, save_u8_tiff};
use crate::io::matrix::write_matrix;

use super::registration::right_to_left;
use super::{Registration, SessionStage, StereoSession};

/// Files and transform produced by [`StereoSession::preprocess`].
#[derive(Clone, Debug)]
pub struct PreprocessOutput {
    pub left: PathBuf,
    pub right: PathBuf,
    pub registration: Registration,
    /// Right-pixel to left-pixel transform used for the warp.
    pub transform: AlignmentMatrix,
    /// Joint normalization range `(lo, hi)`.
    pub range: (f32, f32),
}

impl StereoSession {
    /// Register the right image to the left and write both as normalized
    /// 8-bit images of identical size.
    pub fn preprocess(&self) -> Result<PreprocessOutput> {
        info!(
            stage = %SessionStage::Preprocessing,
            left = %self.left.display(),
            right = %self.right.display(),
            "Starting stage"
        );
        let left = load_image(&self.left)?;
        let right = load_image(&self.right)?;

        let (lo1, hi1) = left
            .valid_range()
            .ok_or_else(|| ParallaxError::NoValidPixels(self.left.clone()))?;
        let (lo2, hi2) = right
            .valid_range()
            .ok_or_else(|| ParallaxError::NoValidPixels(self.right.clone()))?;
        let (lo, hi) = (lo1.min(lo2), hi1.min(hi2));
        info!(lo, hi, "Joint normalization range");

        let paths = self.paths();
        let registration = Registration::detect(&self.left, &self.right)?;
        let transform = match &registration {
            Registration::MapProjected {
                left: left_geo,
                right: right_geo,
            } => {
                info!("Both images are map-projected, resampling right into left frame");
                let t = right_to_left(left_geo, right_geo)?;
                left_geo.write_sidecar(&paths.left_output())?;
                left_geo.write_sidecar(&paths.right_output())?;
                t
            }
            Registration::Unprojected => {
                let matrix =
                    self.alignment_matrix(&left.normalized(lo, hi), &right.normalized(lo, hi))?;
                write_matrix(&matrix, &paths.align_matrix())?;
                info!(path = %paths.align_matrix().display(), "Wrote alignment matrix");
                matrix
            }
        };

        let extent = Extent::of(&left);
        let right_registered = match transform.inverse() {
            Some(output_to_source) => warp_frame(&right, &output_to_source, extent),
            None => {
                return Err(ParallaxError::InvalidArtifact(
                    "registration transform is not invertible".into(),
                ))
            }
        };

        let left_out = paths.left_output();
        let right_out = paths.right_output();
        save_u8_tiff(&normalize_to_u8(&left, lo, hi), &left_out)?;
        save_u8_tiff(&normalize_to_u8(&right_registered, lo, hi), &right_out)?;
        info!(
            left = %left_out.display(),
            right = %right_out.display(),
            width = extent.width,
            height = extent.height,
            "Wrote registered images"
        );

        Ok(PreprocessOutput {
            left: left_out,
            right: right_out,
            registration,
            transform,
            range: (lo, hi),
        })
    }

    /// Homography from right to left, or identity when alignment is disabled
    /// or fails.
    fn alignment_matrix(&self, left: &Frame, right: &Frame) -> Result<AlignmentMatrix> {
        let settings = &self.config.alignment;
        if !settings.enabled {
            info!("Alignment disabled, using identity transform");
            return Ok(AlignmentMatrix::identity());
        }

        let cache = AlignmentCache::new(
            self.store.as_ref(),
            self.detector.as_ref(),
            settings.point_budget,
            settings.match_ratio,
        );
        let key = ImagePairKey::from_paths(&self.left, &self.right);
        let matches = cache.fetch(&key, left, right)?;
        Ok(FeatureAligner::new(settings.ransac.clone()).estimate(&matches))
    }
}
