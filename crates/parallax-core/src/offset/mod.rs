//! Global pixel offset between two roughly co-registered images.

mod estimator;
pub mod report;

pub use estimator::{OffsetEstimate, OffsetEstimator, OffsetParams, RowOffset, StripCrop};
pub use report::write_row_log;
