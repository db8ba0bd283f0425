use ndarray::Array2;

use crate::consts::EPSILON;

/// A single-band image.
///
/// Pixel values are f32; non-finite samples (NaN, ±inf) are special pixels
/// that carry no data and are skipped by statistics and masked on output.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Minimum and maximum over valid (finite) pixels, or `None` if every
    /// pixel is special.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &v in self.data.iter() {
            if is_special(v) {
                continue;
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Linear rescale so that `lo` maps to 0 and `hi` to 1. Special pixels
    /// become 0; values outside `[lo, hi]` are not clamped.
    pub fn normalized(&self, lo: f32, hi: f32) -> Frame {
        let span = (hi - lo).max(EPSILON);
        Frame::new(
            self.data
                .mapv(|v| if is_special(v) { 0.0 } else { (v - lo) / span }),
        )
    }
}

/// Copy of `data` with special pixels replaced by `value`.
pub fn fill_special(data: &Array2<f32>, value: f32) -> Array2<f32> {
    data.mapv(|v| if is_special(v) { value } else { v })
}

/// True when a sample holds no data.
#[inline]
pub fn is_special(v: f32) -> bool {
    !v.is_finite()
}

/// A 2-D pixel coordinate (column, row).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Dimensions of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub width: usize,
    pub height: usize,
}

impl Extent {
    pub fn of(frame: &Frame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
        }
    }

    /// Whether a (possibly fractional) coordinate falls inside the pixel grid.
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x <= self.width as f64 - 1.0
            && p.y <= self.height as f64 - 1.0
    }
}
