//! Alignment matrix persistence as a 3x3 float OpenEXR image.

use std::path::Path;

use image::{ImageFormat, Rgb, Rgb32FImage};

use crate::align::AlignmentMatrix;
use crate::error::{ParallaxError, Result};

/// Write the matrix row-major into a 3x3 float image (value replicated in
/// each channel).
pub fn write_matrix(matrix: &AlignmentMatrix, path: &Path) -> Result<()> {
    let values = matrix.to_row_array();
    let img = Rgb32FImage::from_fn(3, 3, |x, y| {
        let v = values[(y * 3 + x) as usize] as f32;
        Rgb([v, v, v])
    });
    img.save_with_format(path, ImageFormat::OpenExr)?;
    Ok(())
}

/// Read a matrix written by [`write_matrix`].
///
/// Every failure is reported as [`ParallaxError::PersistedStateMissing`]:
/// the file is session state and cannot be recomputed at this point.
pub fn read_matrix(path: &Path) -> Result<AlignmentMatrix> {
    let missing = |reason: String| ParallaxError::PersistedStateMissing {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(missing("file not found".into()));
    }
    let img = image::open(path)
        .map_err(|e| missing(e.to_string()))?
        .to_rgb32f();
    if img.dimensions() != (3, 3) {
        let (w, h) = img.dimensions();
        return Err(missing(format!("expected a 3x3 matrix, found {w}x{h}")));
    }

    let mut values = [0.0f64; 9];
    for (x, y, pixel) in img.enumerate_pixels() {
        values[(y * 3 + x) as usize] = pixel.0[0] as f64;
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(missing("matrix contains non-finite values".into()));
    }
    Ok(AlignmentMatrix::from_row_slice(&values))
}
