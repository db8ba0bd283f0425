pub mod consts;
pub mod error;
pub mod frame;
pub mod stats;
pub mod geo;
pub mod io;
pub mod filters;
pub mod features;
pub mod align;
pub mod disparity;
pub mod offset;
pub mod session;
