use ndarray::Array2;

use crate::frame::{Extent, Point2};

/// One cell of a disparity field: the offset from a left pixel to its match
/// in the right image, and whether the match is usable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisparityCell {
    pub dx: f32,
    pub dy: f32,
    pub valid: bool,
}

impl DisparityCell {
    pub fn valid(dx: f32, dy: f32) -> Self {
        Self { dx, dy, valid: true }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    /// `Some((dx, dy))` for valid cells.
    pub fn vector(&self) -> Option<(f32, f32)> {
        self.valid.then_some((self.dx, self.dy))
    }
}

/// Dense grid of optional disparity vectors, shape = (height, width).
#[derive(Clone, Debug, PartialEq)]
pub struct DisparityField {
    pub cells: Array2<DisparityCell>,
}

impl DisparityField {
    /// A field with every cell invalid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: Array2::from_elem((height, width), DisparityCell::invalid()),
        }
    }

    /// A field where every cell is valid and holds the same vector.
    pub fn uniform(width: usize, height: usize, dx: f32, dy: f32) -> Self {
        Self {
            cells: Array2::from_elem((height, width), DisparityCell::valid(dx, dy)),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn extent(&self) -> Extent {
        Extent {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn get(&self, col: usize, row: usize) -> DisparityCell {
        self.cells[[row, col]]
    }

    pub fn set(&mut self, col: usize, row: usize, cell: DisparityCell) {
        self.cells[[row, col]] = cell;
    }

    pub fn invalidate(&mut self, col: usize, row: usize) {
        self.cells[[row, col]].valid = false;
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.valid).count()
    }

    /// Matched right-image coordinate of a valid cell.
    pub fn target(&self, col: usize, row: usize) -> Option<Point2> {
        self.get(col, row)
            .vector()
            .map(|(dx, dy)| Point2::new(col as f64 + dx as f64, row as f64 + dy as f64))
    }

    /// Rewrite every valid cell through `f(source, target) -> new target`.
    ///
    /// Cells for which `f` returns `None` are marked invalid.
    pub fn remap_targets(&self, mut f: impl FnMut(Point2, Point2) -> Option<Point2>) -> Self {
        let mut out = self.clone();
        for row in 0..self.height() {
            for col in 0..self.width() {
                let Some(target) = self.target(col, row) else {
                    continue;
                };
                let source = Point2::new(col as f64, row as f64);
                let cell = match f(source, target) {
                    Some(t) => DisparityCell::valid((t.x - source.x) as f32, (t.y - source.y) as f32),
                    None => DisparityCell::invalid(),
                };
                out.set(col, row, cell);
            }
        }
        out
    }
}
