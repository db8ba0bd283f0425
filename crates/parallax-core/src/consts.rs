/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Number of interest points kept per image by the detector.
pub const DEFAULT_POINT_BUDGET: usize = 500;

/// Nearest/second-nearest descriptor distance ratio for accepting a match.
pub const DEFAULT_MATCH_RATIO: f32 = 0.8;

/// Side length of the square patch sampled for each interest-point descriptor.
pub const DESCRIPTOR_PATCH_SIZE: usize = 9;

/// Harris detector sensitivity `k` in `det(M) - k * trace(M)^2`.
pub const HARRIS_K: f32 = 0.04;

/// Gaussian sigma used to integrate the Harris structure tensor.
pub const HARRIS_SIGMA: f32 = 1.5;

/// Default RANSAC inlier distance (pixels) for the homography fit.
pub const DEFAULT_RANSAC_INLIER_THRESHOLD: f64 = 10.0;

/// Default number of RANSAC iterations for the homography fit.
pub const DEFAULT_RANSAC_ITERATIONS: usize = 1000;

/// Minimum number of inliers for a homography to be accepted.
pub const DEFAULT_RANSAC_MIN_INLIERS: usize = 10;

/// Fixed RANSAC seed so repeated runs on the same pair give the same matrix.
pub const DEFAULT_RANSAC_SEED: u64 = 1_234_567;

/// Width (pixels) of the centered vertical strip used by the offset estimator.
pub const DEFAULT_CROP_WIDTH: usize = 300;

/// Default correlation kernel side length.
pub const DEFAULT_KERNEL_SIZE: usize = 15;

/// Default left/right consistency threshold (pixels).
pub const DEFAULT_LR_THRESHOLD: i32 = 2;

/// Default Laplacian-of-Gaussian prefilter sigma.
pub const DEFAULT_LOG_SIGMA: f32 = 1.4;

/// Mask pixels at or below this value are treated as near-black and excluded.
pub const DEFAULT_NEAR_BLACK_THRESHOLD: f32 = 0.0;

/// Number of pyramid levels used by the coarse-to-fine block matcher.
pub const DEFAULT_PYRAMID_LEVELS: usize = 2;

/// Gaussian blur sigma used for building the correlation pyramid.
pub const PYRAMID_BLUR_SIGMA: f32 = 1.0;

/// Search radius (pixels) around the upsampled coarse estimate at each finer level.
pub const PYRAMID_REFINE_RADIUS: i32 = 2;
