pub mod artifacts;
pub mod disparity;
pub mod image_io;
pub mod matrix;
