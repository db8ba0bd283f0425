//! Laplacian-of-Gaussian prefilter applied before correlation.

use ndarray::Array2;

use super::gaussian_blur::gaussian_blur_array;

/// Blur with `sigma`, then take the 4-neighbour Laplacian:
///
/// ```text
///   0  1  0
///   1 -4  1
///   0  1  0
/// ```
///
/// Borders use edge extension so the output keeps the input shape. A
/// non-positive sigma disables the filter.
pub fn laplacian_of_gaussian(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let blurred = gaussian_blur_array(data, sigma);
    let (h, w) = blurred.dim();
    let at = |r: isize, c: isize| -> f32 {
        blurred[[
            r.clamp(0, h as isize - 1) as usize,
            c.clamp(0, w as isize - 1) as usize,
        ]]
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for row in 0..h as isize {
        for col in 0..w as isize {
            result[[row as usize, col as usize]] = -4.0 * at(row, col)
                + at(row - 1, col)
                + at(row + 1, col)
                + at(row, col - 1)
                + at(row, col + 1);
        }
    }
    result
}
