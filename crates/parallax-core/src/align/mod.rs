pub mod aligner;
pub mod homography;
mod matrix;
pub mod warp;

pub use aligner::FeatureAligner;
pub use homography::{fit_homography, RansacConfig};
pub use matrix::AlignmentMatrix;
pub use warp::{bilinear_sample, warp_frame};
