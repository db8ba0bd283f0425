use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_KERNEL_SIZE, DEFAULT_LR_THRESHOLD};
use crate::error::Result;

use super::DisparityField;

/// Inclusive disparity search range in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub h_min: i32,
    pub h_max: i32,
    pub v_min: i32,
    pub v_max: i32,
}

impl Default for SearchWindow {
    fn default() -> Self {
        Self {
            h_min: -30,
            h_max: 30,
            v_min: -5,
            v_max: 5,
        }
    }
}

impl SearchWindow {
    /// Window centred on `(dx, dy)` extending `radius` pixels each way.
    pub fn around(dx: i32, dy: i32, radius: i32) -> Self {
        Self {
            h_min: dx - radius,
            h_max: dx + radius,
            v_min: dy - radius,
            v_max: dy + radius,
        }
    }

    /// The search range seen from the other image.
    pub fn negated(&self) -> Self {
        Self {
            h_min: -self.h_max,
            h_max: -self.h_min,
            v_min: -self.v_max,
            v_max: -self.v_min,
        }
    }

    /// Range at a pyramid level `factor` times smaller, rounded outward.
    pub fn scaled_down(&self, factor: i32) -> Self {
        Self {
            h_min: self.h_min.div_euclid(factor),
            h_max: -(-self.h_max).div_euclid(factor),
            v_min: self.v_min.div_euclid(factor),
            v_max: -(-self.v_max).div_euclid(factor),
        }
    }

    pub fn intersect(&self, other: &SearchWindow) -> Option<Self> {
        let w = Self {
            h_min: self.h_min.max(other.h_min),
            h_max: self.h_max.min(other.h_max),
            v_min: self.v_min.max(other.v_min),
            v_max: self.v_max.min(other.v_max),
        };
        (!w.is_empty()).then_some(w)
    }

    pub fn is_empty(&self) -> bool {
        self.h_min > self.h_max || self.v_min > self.v_max
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        (self.h_min..=self.h_max).contains(&dx) && (self.v_min..=self.v_max).contains(&dy)
    }
}

/// Window matching cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostFunction {
    #[default]
    AbsoluteDifference,
    SquaredDifference,
    NormalizedCrossCorrelation,
}

impl CostFunction {
    /// Numeric selector used on the command line: 0, 1 or 2.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::AbsoluteDifference),
            1 => Some(Self::SquaredDifference),
            2 => Some(Self::NormalizedCrossCorrelation),
            _ => None,
        }
    }
}

impl std::fmt::Display for CostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbsoluteDifference => write!(f, "Absolute Difference"),
            Self::SquaredDifference => write!(f, "Squared Difference"),
            Self::NormalizedCrossCorrelation => write!(f, "Normalized Cross Correlation"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationParams {
    pub search: SearchWindow,
    /// Kernel size as (width, height).
    pub kernel: (usize, usize),
    pub cost: CostFunction,
    /// Maximum left/right disagreement (pixels) for a cell to stay valid.
    pub lr_threshold: i32,
    /// Coarse-to-fine search instead of a single full-resolution pass.
    pub pyramid: bool,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            search: SearchWindow::default(),
            kernel: (DEFAULT_KERNEL_SIZE, DEFAULT_KERNEL_SIZE),
            cost: CostFunction::default(),
            lr_threshold: DEFAULT_LR_THRESHOLD,
            pyramid: false,
        }
    }
}

/// Windowed disparity search between two equally sized images.
///
/// The output has the left image's shape; cell `(col, row)` holds the offset
/// to the matching right-image pixel.
pub trait Correlator: Send + Sync {
    fn correlate(
        &self,
        left: &Array2<f32>,
        right: &Array2<f32>,
        params: &CorrelationParams,
    ) -> Result<DisparityField>;
}
