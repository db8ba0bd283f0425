use std::path::Path;

use tracing::debug;

use crate::align::AlignmentMatrix;
use crate::error::{ParallaxError, Result};
use crate::geo::{both_map_projected, pixel_transform, GeoReference};

/// How the right image is brought into the left image's frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Registration {
    /// Both images are map-projected; the left georeference is the common
    /// frame.
    MapProjected {
        left: GeoReference,
        right: GeoReference,
    },
    /// Feature-based homography (or identity).
    Unprojected,
}

impl Registration {
    /// Decide from the world-file sidecars of both inputs.
    pub fn detect(left: &Path, right: &Path) -> Result<Self> {
        let left_geo = GeoReference::read_sidecar(left)?;
        let right_geo = GeoReference::read_sidecar(right)?;
        let registration = match (left_geo, right_geo) {
            (Some(l), Some(r)) if both_map_projected(Some(&l), Some(&r)) => {
                Self::MapProjected { left: l, right: r }
            }
            _ => Self::Unprojected,
        };
        debug!(map_projected = registration.is_map_projected(), "Selected registration path");
        Ok(registration)
    }

    pub fn is_map_projected(&self) -> bool {
        matches!(self, Self::MapProjected { .. })
    }
}

/// Right-pixel to left-pixel transform through the shared map frame.
pub(super) fn right_to_left(left: &GeoReference, right: &GeoReference) -> Result<AlignmentMatrix> {
    pixel_transform(right, left).ok_or_else(|| {
        ParallaxError::InvalidArtifact("georeference is not invertible".into())
    })
}
