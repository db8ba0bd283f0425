use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::{Extent, Frame, Point2};

use super::AlignmentMatrix;

/// Resample `frame` onto a grid of size `extent`.
///
/// `output_to_source` maps each output pixel to a (fractional) location in
/// `frame`. Locations outside the source, or mapped to infinity, become NaN
/// special pixels.
pub fn warp_frame(frame: &Frame, output_to_source: &AlignmentMatrix, extent: Extent) -> Frame {
    let (h, w) = (extent.height, extent.width);

    let warp_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                output_to_source
                    .apply(Point2::new(col as f64, row as f64))
                    .map_or(f32::NAN, |p| bilinear_sample(&frame.data, p.y, p.x))
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(warp_row).collect()
    } else {
        (0..h).map(warp_row).collect()
    };

    let mut data = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            data[[row, col]] = val;
        }
    }
    Frame::new(data)
}

/// Bilinear interpolation at `(y, x)`; NaN outside the pixel grid.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return f32::NAN;
    }
    if !(x >= 0.0 && y >= 0.0 && x <= (w - 1) as f64 && y <= (h - 1) as f64) {
        return f32::NAN;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let v00 = data[[y0, x0]];
    let v10 = data[[y0, x1]];
    let v01 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    // Skip zero-weight taps so a special neighbour does not leak in.
    let mut sum = 0.0f32;
    for (v, weight) in [
        (v00, (1.0 - fx) * (1.0 - fy)),
        (v10, fx * (1.0 - fy)),
        (v01, (1.0 - fx) * fy),
        (v11, fx * fy),
    ] {
        if weight > 0.0 {
            sum += v * weight;
        }
    }
    sum
}
