use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::DegenerateFit;
use crate::features::CorrespondenceSet;
use crate::frame::Point2;

use super::homography::{fit_homography, RansacConfig};
use super::AlignmentMatrix;

/// Estimates the homography carrying the second image onto the first from
/// point correspondences.
#[derive(Clone, Debug, Default)]
pub struct FeatureAligner {
    pub ransac: RansacConfig,
}

impl FeatureAligner {
    pub fn new(ransac: RansacConfig) -> Self {
        Self { ransac }
    }

    /// Drop every correspondence whose left or right coordinate also occurs
    /// at another index on the same side.
    ///
    /// All copies are removed, not just the extras. Surviving entries keep
    /// their relative order.
    pub fn dedupe(set: &CorrespondenceSet) -> CorrespondenceSet {
        let left_counts = count_coords(set.left());
        let right_counts = count_coords(set.right());

        CorrespondenceSet::from_pairs(
            set.iter()
                .filter(|(l, r)| left_counts[&coord_key(l)] == 1 && right_counts[&coord_key(r)] == 1)
                .map(|(l, r)| (*l, *r)),
        )
    }

    /// Fit `H` with `left ~ H right` after deduplication.
    pub fn try_estimate(&self, set: &CorrespondenceSet) -> Result<AlignmentMatrix, DegenerateFit> {
        let unique = Self::dedupe(set);
        info!(
            before = set.len(),
            after = unique.len(),
            "Removed duplicate correspondences"
        );
        let matrix = fit_homography(unique.right(), unique.left(), &self.ransac)?;
        if matrix.inverse().is_none() {
            return Err(DegenerateFit("fitted homography is singular".into()));
        }
        Ok(matrix)
    }

    /// Like [`try_estimate`](Self::try_estimate), but a failed fit falls back
    /// to identity so the session continues with unaligned images.
    pub fn estimate(&self, set: &CorrespondenceSet) -> AlignmentMatrix {
        match self.try_estimate(set) {
            Ok(matrix) => {
                info!(matrix = ?matrix.to_row_array(), "Estimated alignment homography");
                matrix
            }
            Err(err) => {
                warn!(%err, "Alignment failed, continuing with identity transform");
                AlignmentMatrix::identity()
            }
        }
    }
}

/// Exact-equality key; `-0.0` and `0.0` compare equal.
fn coord_key(p: &Point2) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

fn count_coords(points: &[Point2]) -> HashMap<(u64, u64), usize> {
    let mut counts = HashMap::with_capacity(points.len());
    for p in points {
        *counts.entry(coord_key(p)).or_insert(0) += 1;
    }
    counts
}
