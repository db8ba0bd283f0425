pub mod camera;
pub mod config;
pub mod filter;
pub mod offset;
pub mod point_cloud;
pub mod preprocess;
pub mod session;
