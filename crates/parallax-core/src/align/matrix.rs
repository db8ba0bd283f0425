use nalgebra::{Matrix3, Vector3};

use crate::frame::Point2;

/// A 3x3 projective transform between two image planes.
///
/// Defaults to identity. Once built it is never mutated; derive a new one
/// with [`AlignmentMatrix::inverse`] or [`AlignmentMatrix::then`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentMatrix(Matrix3<f64>);

impl Default for AlignmentMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AlignmentMatrix {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn from_matrix(m: Matrix3<f64>) -> Self {
        Self(m)
    }

    /// Build from row-major coefficients.
    pub fn from_row_slice(values: &[f64; 9]) -> Self {
        Self(Matrix3::from_row_slice(values))
    }

    /// Pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::from_row_slice(&[1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0])
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// Row-major coefficients.
    pub fn to_row_array(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        ]
    }

    pub fn is_identity(&self, tol: f64) -> bool {
        (self.0 - Matrix3::identity()).amax() <= tol
    }

    pub fn inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Transform that applies `self` first, then `next`.
    pub fn then(&self, next: &AlignmentMatrix) -> Self {
        Self(next.0 * self.0)
    }

    /// Map a point through the transform. Returns `None` for points sent to
    /// infinity.
    pub fn apply(&self, p: Point2) -> Option<Point2> {
        let h = self.0 * Vector3::new(p.x, p.y, 1.0);
        if h.z.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::new(h.x / h.z, h.y / h.z))
    }
}
