use rayon::prelude::*;
use tracing::debug;

use super::{CorrespondenceSet, InterestPoint};

/// Brute-force nearest-neighbour descriptor matching with a ratio test.
///
/// A left point is matched to its nearest right point when the nearest
/// descriptor distance is below `ratio` times the second-nearest. No
/// geometric constraint is applied. Output order follows `left`.
pub fn match_points(left: &[InterestPoint], right: &[InterestPoint], ratio: f32) -> CorrespondenceSet {
    if right.len() < 2 {
        return CorrespondenceSet::default();
    }
    let ratio_sq = ratio * ratio;

    let pairs: Vec<_> = left
        .par_iter()
        .filter_map(|ip| {
            let mut best = (f32::INFINITY, usize::MAX);
            let mut second = f32::INFINITY;
            for (j, candidate) in right.iter().enumerate() {
                let Some(d) = squared_distance(&ip.descriptor, &candidate.descriptor) else {
                    continue;
                };
                if d < best.0 {
                    second = best.0;
                    best = (d, j);
                } else if d < second {
                    second = d;
                }
            }
            (best.1 != usize::MAX && best.0 < ratio_sq * second)
                .then(|| (ip.position(), right[best.1].position()))
        })
        .collect();

    debug!(
        left = left.len(),
        right = right.len(),
        matched = pairs.len(),
        "Matched interest points"
    );
    CorrespondenceSet::from_pairs(pairs)
}

/// `None` when the descriptors are not comparable.
fn squared_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum())
}
