//! Disparity fields and the correlator that produces them.

pub mod block_match;
pub mod correlator;
mod field;

pub use block_match::BlockMatcher;
pub use correlator::{CorrelationParams, Correlator, CostFunction, SearchWindow};
pub use field::{DisparityCell, DisparityField};
