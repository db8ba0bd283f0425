use std::path::{Path, PathBuf};

use tracing::info;

use crate::disparity::DisparityField;
use crate::error::{ParallaxError, Result};
use crate::frame::Extent;
use crate::geo::pixel_transform;
use crate::io::disparity::{read_disparity, write_disparity};
use crate::io::matrix::read_matrix;

use super::{Registration, SessionStage, StereoSession};

impl StereoSession {
    /// Express a disparity field measured on the registered pair in the
    /// original right image's pixel coordinates.
    ///
    /// On the unprojected path the alignment matrix written by
    /// [`preprocess`](Self::preprocess) must be readable; if it is not, the
    /// session cannot continue and [`ParallaxError::PersistedStateMissing`]
    /// is returned.
    pub fn point_cloud(&self, disparity: &DisparityField) -> Result<DisparityField> {
        let registration = Registration::detect(&self.left, &self.right)?;
        let out = match &registration {
            Registration::MapProjected { left, right } => {
                let left_to_right = pixel_transform(left, right).ok_or_else(|| {
                    ParallaxError::InvalidArtifact("georeference is not invertible".into())
                })?;
                disparity.remap_targets(|_, target| left_to_right.apply(target))
            }
            Registration::Unprojected => {
                let path = self.paths().align_matrix();
                let matrix = read_matrix(&path)?;
                let inverse = matrix.inverse().ok_or_else(|| ParallaxError::PersistedStateMissing {
                    path: path.clone(),
                    reason: "alignment matrix is singular".into(),
                })?;
                if !self.right.exists() {
                    return Err(ParallaxError::InputMissing(self.right.clone()));
                }
                let (width, height) = image::image_dimensions(&self.right)?;
                let bounds = Extent {
                    width: width as usize,
                    height: height as usize,
                };
                disparity.remap_targets(|_, target| inverse.apply(target).filter(|p| bounds.contains(*p)))
            }
        };

        info!(
            stage = %SessionStage::PointCloud,
            map_projected = registration.is_map_projected(),
            valid = out.valid_count(),
            "Restored original image coordinates"
        );
        Ok(out)
    }

    /// File-driven [`point_cloud`](Self::point_cloud): reads `input`
    /// (default `<prefix>-F.disp`) and writes `<prefix>-PC.disp`.
    pub fn point_cloud_files(&self, input: Option<&Path>) -> Result<PathBuf> {
        let paths = self.paths();
        let input = input
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths.filtered_disparity());
        let disparity = read_disparity(&input)?;
        let restored = self.point_cloud(&disparity)?;
        let output = paths.point_cloud_disparity();
        write_disparity(&restored, &output)?;
        Ok(output)
    }
}
