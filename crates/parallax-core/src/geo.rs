//! Affine georeferencing read from ESRI world-file sidecars.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::align::AlignmentMatrix;
use crate::error::{ParallaxError, Result};
use crate::frame::Point2;

/// Sidecar extensions tried, in order, next to an image.
const WORLD_FILE_EXTENSIONS: [&str; 5] = ["tfw", "tifw", "wld", "pgw", "jgw"];

/// Pixel-to-map affine transform:
///
/// ```text
/// map_x = a * col + b * row + c
/// map_y = d * col + e * row + f
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoReference {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for GeoReference {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }
}

impl GeoReference {
    /// An identity transform means the image is not map-projected.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_matrix(&self) -> AlignmentMatrix {
        AlignmentMatrix::from_row_slice(&[
            self.a, self.b, self.c, self.d, self.e, self.f, 0.0, 0.0, 1.0,
        ])
    }

    pub fn pixel_to_map(&self, p: Point2) -> Point2 {
        Point2::new(
            self.a * p.x + self.b * p.y + self.c,
            self.d * p.x + self.e * p.y + self.f,
        )
    }

    pub fn map_to_pixel(&self, m: Point2) -> Option<Point2> {
        self.to_matrix().inverse()?.apply(m)
    }

    /// Parse the six lines of a world file (A, D, B, E, C, F).
    pub fn parse_world_file(text: &str) -> Result<Self> {
        let values: Vec<f64> = text
            .split_whitespace()
            .map(|t| {
                t.parse::<f64>().map_err(|_| {
                    ParallaxError::InvalidArtifact(format!("bad world file value '{t}'"))
                })
            })
            .collect::<Result<_>>()?;
        if values.len() != 6 {
            return Err(ParallaxError::InvalidArtifact(format!(
                "world file needs 6 values, found {}",
                values.len()
            )));
        }
        Ok(Self {
            a: values[0],
            d: values[1],
            b: values[2],
            e: values[3],
            c: values[4],
            f: values[5],
        })
    }

    pub fn to_world_file(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            self.a, self.d, self.b, self.e, self.c, self.f
        )
    }

    /// Load the georeference for `image`, if a world-file sidecar exists.
    pub fn read_sidecar(image: &Path) -> Result<Option<Self>> {
        let Some(path) = find_sidecar(image) else {
            return Ok(None);
        };
        debug!(path = %path.display(), "Reading world file");
        let text = std::fs::read_to_string(&path)?;
        Self::parse_world_file(&text).map(Some)
    }

    pub fn write_sidecar(&self, image: &Path) -> Result<PathBuf> {
        let path = image.with_extension(WORLD_FILE_EXTENSIONS[0]);
        std::fs::write(&path, self.to_world_file())?;
        Ok(path)
    }
}

fn find_sidecar(image: &Path) -> Option<PathBuf> {
    WORLD_FILE_EXTENSIONS
        .iter()
        .map(|ext| image.with_extension(ext))
        .find(|p| p.is_file())
}

/// Whether both images carry a non-identity georeference, which selects the
/// map-projected processing path.
pub fn both_map_projected(left: Option<&GeoReference>, right: Option<&GeoReference>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if !l.is_identity() && !r.is_identity())
}

/// Pixel transform carrying `from` image coordinates into `to` image
/// coordinates through the shared map frame.
pub fn pixel_transform(from: &GeoReference, to: &GeoReference) -> Option<AlignmentMatrix> {
    let to_pixel = to.to_matrix().inverse()?;
    Some(from.to_matrix().then(&to_pixel))
}
