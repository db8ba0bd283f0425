//! Homography estimation: normalized DLT inside a seeded RANSAC loop.
//!
//! The fitted model maps `src` points onto `dst` points: `dst ~ H src`.

use nalgebra::{DMatrix, Matrix3};
use rand::prelude::IndexedRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_RANSAC_INLIER_THRESHOLD, DEFAULT_RANSAC_ITERATIONS, DEFAULT_RANSAC_MIN_INLIERS,
    DEFAULT_RANSAC_SEED,
};
use crate::error::DegenerateFit;
use crate::frame::Point2;

use super::AlignmentMatrix;

/// Minimal sample size for a homography.
const MIN_SAMPLES: usize = 4;

/// Desired probability of drawing at least one all-inlier sample.
const CONFIDENCE: f64 = 0.99;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    pub max_iterations: usize,
    /// Reprojection distance (pixels) below which a correspondence is an inlier.
    pub inlier_threshold: f64,
    pub min_inliers: usize,
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_RANSAC_ITERATIONS,
            inlier_threshold: DEFAULT_RANSAC_INLIER_THRESHOLD,
            min_inliers: DEFAULT_RANSAC_MIN_INLIERS,
            seed: DEFAULT_RANSAC_SEED,
        }
    }
}

/// Robustly fit `H` with `dst ~ H src`.
///
/// Returns [`DegenerateFit`] when there are too few correspondences, no
/// sample yields a model, or the best model has fewer than
/// `config.min_inliers` inliers.
pub fn fit_homography(
    src: &[Point2],
    dst: &[Point2],
    config: &RansacConfig,
) -> Result<AlignmentMatrix, DegenerateFit> {
    let n = src.len();
    if n != dst.len() {
        return Err(DegenerateFit(format!(
            "point lists differ in length: {} vs {}",
            n,
            dst.len()
        )));
    }
    let required = config.min_inliers.max(MIN_SAMPLES);
    if n < required {
        return Err(DegenerateFit(format!(
            "need at least {required} correspondences, got {n}"
        )));
    }

    let all_indices: Vec<usize> = (0..n).collect();
    let mut sample = [0usize; MIN_SAMPLES];
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut best: Option<(Matrix3<f64>, Vec<usize>, f64)> = None;
    let mut max_iters = config.max_iterations;
    let mut iters = 0;

    while iters < max_iters {
        iters += 1;
        all_indices
            .as_slice()
            .choose_multiple(&mut rng, MIN_SAMPLES)
            .enumerate()
            .for_each(|(k, &idx)| sample[k] = idx);

        if is_degenerate(src, &sample) || is_degenerate(dst, &sample) {
            continue;
        }
        let Some(model) = dlt(src, dst, &sample) else {
            continue;
        };

        let (inliers, rms) = score(&model, src, dst, config.inlier_threshold);
        let better = match &best {
            None => !inliers.is_empty(),
            Some((_, best_inliers, best_rms)) => {
                inliers.len() > best_inliers.len()
                    || (inliers.len() == best_inliers.len() && rms < *best_rms)
            }
        };
        if better {
            let ratio = inliers.len() as f64 / n as f64;
            max_iters = adaptive_iterations(ratio, iters, config.max_iterations);
            best = Some((model, inliers, rms));
        }
    }

    let Some((model, inliers, _)) = best else {
        return Err(DegenerateFit(format!(
            "no non-degenerate sample in {iters} iterations"
        )));
    };
    if inliers.len() < required {
        return Err(DegenerateFit(format!(
            "only {} inliers, need {required}",
            inliers.len()
        )));
    }

    let refined = dlt(src, dst, &inliers).unwrap_or(model);
    debug!(
        inliers = inliers.len(),
        total = n,
        iterations = iters,
        "Homography fit converged"
    );
    Ok(AlignmentMatrix::from_matrix(refined))
}

/// Normalized DLT over the points selected by `indices`.
fn dlt(src: &[Point2], dst: &[Point2], indices: &[usize]) -> Option<Matrix3<f64>> {
    let n = indices.len();
    if n < MIN_SAMPLES {
        return None;
    }
    let src_pts: Vec<Point2> = indices.iter().map(|&i| src[i]).collect();
    let dst_pts: Vec<Point2> = indices.iter().map(|&i| dst[i]).collect();
    let (src_n, t_src) = normalize_points(&src_pts)?;
    let (dst_n, t_dst) = normalize_points(&dst_pts)?;

    let mut a = DMatrix::<f64>::zeros(2 * n.max(5), 9);
    for (i, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    // Zero rows pad the 8x9 minimal system to square so the SVD exposes the
    // null-space vector.
    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let (min_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|l, r| l.1.total_cmp(r.1))?;
    let h = v_t.row(min_idx);

    let mut h_mat = Matrix3::<f64>::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_mat[(r, c)] = h[3 * r + c];
        }
    }

    let h_mat = t_dst.try_inverse()? * h_mat * t_src;
    let scale = h_mat[(2, 2)];
    if scale.abs() <= f64::EPSILON || !h_mat.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(h_mat / scale)
}

/// Hartley normalization: zero mean, mean distance sqrt(2).
fn normalize_points(points: &[Point2]) -> Option<(Vec<Point2>, Matrix3<f64>)> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = points
        .iter()
        .map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    Some((normalized, t))
}

/// True if any three sampled points are (nearly) collinear.
fn is_degenerate(points: &[Point2], sample: &[usize]) -> bool {
    for i in 0..sample.len() {
        for j in i + 1..sample.len() {
            for k in j + 1..sample.len() {
                let (p0, p1, p2) = (points[sample[i]], points[sample[j]], points[sample[k]]);
                let area = (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x);
                if area.abs() < 1e-6 {
                    return true;
                }
            }
        }
    }
    false
}

fn score(model: &Matrix3<f64>, src: &[Point2], dst: &[Point2], threshold: f64) -> (Vec<usize>, f64) {
    let h = AlignmentMatrix::from_matrix(*model);
    let mut inliers = Vec::new();
    let mut sum_sq = 0.0;
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let Some(p) = h.apply(*s) else {
            continue;
        };
        let err = ((p.x - d.x).powi(2) + (p.y - d.y).powi(2)).sqrt();
        if err < threshold {
            inliers.push(i);
            sum_sq += err * err;
        }
    }
    let rms = if inliers.is_empty() {
        f64::INFINITY
    } else {
        (sum_sq / inliers.len() as f64).sqrt()
    };
    (inliers, rms)
}

/// Iterations needed to reach [`CONFIDENCE`] at the current inlier ratio.
fn adaptive_iterations(inlier_ratio: f64, iters_so_far: usize, max_iters: usize) -> usize {
    if inlier_ratio <= 0.0 {
        return max_iters;
    }
    let denom = (1.0 - inlier_ratio.powi(MIN_SAMPLES as i32)).max(1e-12).ln();
    if denom >= 0.0 {
        return max_iters;
    }
    let needed = ((1.0 - CONFIDENCE).ln() / denom).ceil() as usize;
    needed.clamp(iters_so_far, max_iters)
}
