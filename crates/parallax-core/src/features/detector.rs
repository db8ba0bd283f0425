use ndarray::{Array2, Zip};
use tracing::debug;

use crate::consts::{DESCRIPTOR_PATCH_SIZE, EPSILON, HARRIS_K, HARRIS_SIGMA};
use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::frame::{fill_special, Frame};

use super::InterestPoint;

/// Finds interest points and computes their descriptors.
///
/// Implementors can wrap any external feature library; the alignment cache
/// only stores, loads and matches what comes back.
pub trait FeatureDetector: Send + Sync {
    /// Locate at most `budget` interest points, strongest first. Descriptors
    /// are left empty.
    fn detect(&self, frame: &Frame, budget: usize) -> Result<Vec<InterestPoint>>;

    /// Fill in descriptors. Points that cannot be described are dropped.
    fn describe(&self, frame: &Frame, points: Vec<InterestPoint>) -> Result<Vec<InterestPoint>>;
}

/// Harris corners with zero-mean, unit-norm patch descriptors.
#[derive(Clone, Debug)]
pub struct HarrisDetector {
    /// Structure-tensor integration scale.
    pub sigma: f32,
    /// Sensitivity in `det - k * trace^2`.
    pub k: f32,
    /// Responses below this fraction of the strongest are discarded.
    pub relative_threshold: f32,
    /// Descriptor patch side length (odd).
    pub patch_size: usize,
}

impl Default for HarrisDetector {
    fn default() -> Self {
        Self {
            sigma: HARRIS_SIGMA,
            k: HARRIS_K,
            relative_threshold: 0.01,
            patch_size: DESCRIPTOR_PATCH_SIZE,
        }
    }
}

impl FeatureDetector for HarrisDetector {
    fn detect(&self, frame: &Frame, budget: usize) -> Result<Vec<InterestPoint>> {
        let data = fill_special(&frame.data, 0.0);
        let response = self.harris_response(&data);
        let (h, w) = response.dim();
        let margin = self.patch_size / 2 + 1;
        if h <= 2 * margin || w <= 2 * margin {
            return Ok(Vec::new());
        }

        let peak = response.iter().cloned().fold(0.0f32, f32::max);
        if peak <= EPSILON {
            return Ok(Vec::new());
        }
        let floor = peak * self.relative_threshold;

        let mut points = Vec::new();
        for row in margin..h - margin {
            for col in margin..w - margin {
                let r = response[[row, col]];
                if r <= floor || !is_local_max(&response, row, col) {
                    continue;
                }
                points.push(InterestPoint {
                    x: col as f32,
                    y: row as f32,
                    strength: r,
                    descriptor: Vec::new(),
                });
            }
        }

        points.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        points.truncate(budget);
        debug!(count = points.len(), budget, "Detected Harris corners");
        Ok(points)
    }

    fn describe(&self, frame: &Frame, points: Vec<InterestPoint>) -> Result<Vec<InterestPoint>> {
        let data = fill_special(&frame.data, 0.0);
        let (h, w) = data.dim();
        let half = (self.patch_size / 2) as isize;

        let described = points
            .into_iter()
            .filter_map(|mut ip| {
                let (cx, cy) = (ip.x.round() as isize, ip.y.round() as isize);
                if cx < half || cy < half || cx + half >= w as isize || cy + half >= h as isize {
                    return None;
                }
                let mut patch = Vec::with_capacity(self.patch_size * self.patch_size);
                for dy in -half..=half {
                    for dx in -half..=half {
                        patch.push(data[[(cy + dy) as usize, (cx + dx) as usize]]);
                    }
                }
                let mean = patch.iter().sum::<f32>() / patch.len() as f32;
                patch.iter_mut().for_each(|v| *v -= mean);
                let norm = patch.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm <= EPSILON {
                    return None;
                }
                patch.iter_mut().for_each(|v| *v /= norm);
                ip.descriptor = patch;
                Some(ip)
            })
            .collect();
        Ok(described)
    }
}

impl HarrisDetector {
    fn harris_response(&self, data: &Array2<f32>) -> Array2<f32> {
        let (h, w) = data.dim();
        let at = |r: isize, c: isize| -> f32 {
            data[[
                r.clamp(0, h as isize - 1) as usize,
                c.clamp(0, w as isize - 1) as usize,
            ]]
        };

        let mut ixx = Array2::<f32>::zeros((h, w));
        let mut iyy = Array2::<f32>::zeros((h, w));
        let mut ixy = Array2::<f32>::zeros((h, w));
        for row in 0..h as isize {
            for col in 0..w as isize {
                let gx = 0.5 * (at(row, col + 1) - at(row, col - 1));
                let gy = 0.5 * (at(row + 1, col) - at(row - 1, col));
                let idx = [row as usize, col as usize];
                ixx[idx] = gx * gx;
                iyy[idx] = gy * gy;
                ixy[idx] = gx * gy;
            }
        }

        let sxx = gaussian_blur_array(&ixx, self.sigma);
        let syy = gaussian_blur_array(&iyy, self.sigma);
        let sxy = gaussian_blur_array(&ixy, self.sigma);

        let mut response = Array2::<f32>::zeros((h, w));
        Zip::from(&mut response)
            .and(&sxx)
            .and(&syy)
            .and(&sxy)
            .for_each(|r, &a, &b, &c| {
                let det = a * b - c * c;
                let trace = a + b;
                *r = det - self.k * trace * trace;
            });
        response
    }
}

fn is_local_max(response: &Array2<f32>, row: usize, col: usize) -> bool {
    let v = response[[row, col]];
    for r in row - 1..=row + 1 {
        for c in col - 1..=col + 1 {
            if (r, c) == (row, col) {
                continue;
            }
            let n = response[[r, c]];
            // Ties resolve toward the earlier pixel in scan order.
            if n > v || (n == v && (r, c) < (row, col)) {
                return false;
            }
        }
    }
    true
}
