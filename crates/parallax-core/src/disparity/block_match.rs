//! Brute-force block matching with a left/right consistency check and an
//! optional coarse-to-fine pyramid.

use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{
    DEFAULT_PYRAMID_LEVELS, EPSILON, PARALLEL_PIXEL_THRESHOLD, PYRAMID_BLUR_SIGMA,
    PYRAMID_REFINE_RADIUS,
};
use crate::error::{ParallaxError, Result};
use crate::filters::gaussian_blur::gaussian_blur_array;

use super::{CorrelationParams, Correlator, CostFunction, DisparityCell, DisparityField, SearchWindow};

/// Integer disparity `(dx, dy)` per pixel.
type IntDisparity = Array2<(i32, i32)>;

#[derive(Clone, Debug)]
pub struct BlockMatcher {
    /// Maximum number of 2x downsampled levels in pyramid mode.
    pub pyramid_levels: usize,
}

impl Default for BlockMatcher {
    fn default() -> Self {
        Self {
            pyramid_levels: DEFAULT_PYRAMID_LEVELS,
        }
    }
}

impl Correlator for BlockMatcher {
    fn correlate(
        &self,
        left: &Array2<f32>,
        right: &Array2<f32>,
        params: &CorrelationParams,
    ) -> Result<DisparityField> {
        let (h, w) = left.dim();
        if right.dim() != (h, w) || h == 0 || w == 0 {
            let (rh, rw) = right.dim();
            return Err(ParallaxError::InvalidDimensions {
                width: rw,
                height: rh,
            });
        }
        if params.search.is_empty() {
            return Err(ParallaxError::NoValidMatches("empty search window".into()));
        }

        let forward = self.disparity_map(left, right, params, params.search);
        let backward = self.disparity_map(right, left, params, params.search.negated());

        let mut field = DisparityField::new(w, h);
        let threshold = params.lr_threshold;
        for ((row, col), &(dx, dy)) in forward.indexed_iter() {
            let tr = row as i32 + dy;
            let tc = col as i32 + dx;
            if tr < 0 || tc < 0 || tr >= h as i32 || tc >= w as i32 {
                continue;
            }
            let (bx, by) = backward[[tr as usize, tc as usize]];
            if (dx + bx).abs() <= threshold && (dy + by).abs() <= threshold {
                field.set(col, row, DisparityCell::valid(dx as f32, dy as f32));
            }
        }

        debug!(
            width = w,
            height = h,
            valid = field.valid_count(),
            pyramid = params.pyramid,
            "Block matching complete"
        );
        Ok(field)
    }
}

impl BlockMatcher {
    fn disparity_map(
        &self,
        left: &Array2<f32>,
        right: &Array2<f32>,
        params: &CorrelationParams,
        window: SearchWindow,
    ) -> IntDisparity {
        if params.pyramid {
            self.coarse_to_fine(left, right, params, window)
        } else {
            search_level(left, right, params, |_, _| window)
        }
    }

    /// Search the full range at the coarsest level, then refine within
    /// [`PYRAMID_REFINE_RADIUS`] of the upsampled estimate at each finer one.
    fn coarse_to_fine(
        &self,
        left: &Array2<f32>,
        right: &Array2<f32>,
        params: &CorrelationParams,
        window: SearchWindow,
    ) -> IntDisparity {
        let levels = usable_levels(left.dim(), params.kernel, self.pyramid_levels);
        let left_pyramid = build_pyramid(left, levels);
        let right_pyramid = build_pyramid(right, levels);

        let mut prior: Option<IntDisparity> = None;
        for level in (0..=levels).rev() {
            let level_window = window.scaled_down(1 << level);
            let map = search_level(&left_pyramid[level], &right_pyramid[level], params, |row, col| {
                let Some(prev) = &prior else {
                    return level_window;
                };
                let (ph, pw) = prev.dim();
                let (dx, dy) = prev[[(row / 2).min(ph - 1), (col / 2).min(pw - 1)]];
                SearchWindow::around(2 * dx, 2 * dy, PYRAMID_REFINE_RADIUS)
                    .intersect(&level_window)
                    .unwrap_or(level_window)
            });
            prior = Some(map);
        }
        prior.unwrap_or_else(|| search_level(left, right, params, |_, _| window))
    }
}

/// Best disparity per pixel; `window_at(row, col)` gives the candidates.
///
/// `(0, 0)` is tried first when in range and is only replaced by a strictly
/// lower cost.
fn search_level(
    left: &Array2<f32>,
    right: &Array2<f32>,
    params: &CorrelationParams,
    window_at: impl Fn(usize, usize) -> SearchWindow + Sync,
) -> IntDisparity {
    let (h, w) = left.dim();
    let half = ((params.kernel.0 / 2) as isize, (params.kernel.1 / 2) as isize);

    let match_row = |row: usize| -> Vec<(i32, i32)> {
        (0..w)
            .map(|col| {
                let window = window_at(row, col);
                let mut best = (f32::INFINITY, (0, 0));
                if window.contains(0, 0) {
                    best = (window_cost(left, right, row, col, (0, 0), half, params.cost), (0, 0));
                }
                for dy in window.v_min..=window.v_max {
                    for dx in window.h_min..=window.h_max {
                        if (dx, dy) == (0, 0) {
                            continue;
                        }
                        let c = window_cost(left, right, row, col, (dx, dy), half, params.cost);
                        if c < best.0 {
                            best = (c, (dx, dy));
                        }
                    }
                }
                best.1
            })
            .collect()
    };

    let rows: Vec<Vec<(i32, i32)>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(match_row).collect()
    } else {
        (0..h).map(match_row).collect()
    };

    let mut result = Array2::from_elem((h, w), (0, 0));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, d) in row_data.into_iter().enumerate() {
            result[[row, col]] = d;
        }
    }
    result
}

/// Cost of matching the kernel centred at `(row, col)` in `left` with the
/// one displaced by `d` in `right`. Samples past the border are edge-extended.
fn window_cost(
    left: &Array2<f32>,
    right: &Array2<f32>,
    row: usize,
    col: usize,
    d: (i32, i32),
    half: (isize, isize),
    cost: CostFunction,
) -> f32 {
    let (hx, hy) = half;
    let (r0, c0) = (row as isize, col as isize);
    let (dx, dy) = (d.0 as isize, d.1 as isize);

    let mut acc = 0.0f32;
    let (mut sa, mut sb, mut saa, mut sbb, mut sab) = (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for j in -hy..=hy {
        for i in -hx..=hx {
            let a = edge_sample(left, r0 + j, c0 + i);
            let b = edge_sample(right, r0 + j + dy, c0 + i + dx);
            match cost {
                CostFunction::AbsoluteDifference => acc += (a - b).abs(),
                CostFunction::SquaredDifference => acc += (a - b) * (a - b),
                CostFunction::NormalizedCrossCorrelation => {
                    sa += a;
                    sb += b;
                    saa += a * a;
                    sbb += b * b;
                    sab += a * b;
                }
            }
        }
    }

    if cost != CostFunction::NormalizedCrossCorrelation {
        return acc;
    }
    let n = ((2 * hx + 1) * (2 * hy + 1)) as f32;
    let var_a = n * saa - sa * sa;
    let var_b = n * sbb - sb * sb;
    let denom = (var_a * var_b).sqrt();
    if denom <= EPSILON {
        return 1.0;
    }
    1.0 - (n * sab - sa * sb) / denom
}

#[inline]
fn edge_sample(data: &Array2<f32>, row: isize, col: isize) -> f32 {
    let (h, w) = data.dim();
    data[[
        row.clamp(0, h as isize - 1) as usize,
        col.clamp(0, w as isize - 1) as usize,
    ]]
}

/// Levels that keep every pyramid image at least two kernels wide and tall.
fn usable_levels(dim: (usize, usize), kernel: (usize, usize), max_levels: usize) -> usize {
    let (mut h, mut w) = dim;
    let mut levels = 0;
    while levels < max_levels {
        let (nh, nw) = (h.div_ceil(2), w.div_ceil(2));
        if nh < 2 * kernel.1.max(1) || nw < 2 * kernel.0.max(1) {
            break;
        }
        h = nh;
        w = nw;
        levels += 1;
    }
    levels
}

/// Index 0 is the original; index `levels` is the coarsest.
fn build_pyramid(data: &Array2<f32>, levels: usize) -> Vec<Array2<f32>> {
    let mut pyramid = Vec::with_capacity(levels + 1);
    pyramid.push(data.clone());

    let mut current = data.clone();
    for _ in 0..levels {
        let blurred = gaussian_blur_array(&current, PYRAMID_BLUR_SIGMA);
        current = downsample_2x(&blurred);
        pyramid.push(current.clone());
    }

    pyramid
}

/// Downsample an image by 2x by taking every other pixel.
fn downsample_2x(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let new_h = h.div_ceil(2);
    let new_w = w.div_ceil(2);
    let mut result = Array2::<f32>::zeros((new_h, new_w));

    for r in 0..new_h {
        for c in 0..new_w {
            result[[r, c]] = data[[r * 2, c * 2]];
        }
    }

    result
}
