//! Two-view stereo session: register the pair before correlation and undo
//! the registration on the resulting disparity afterwards.

pub mod camera;
pub mod config;
mod filter;
mod paths;
mod point_cloud;
mod preprocess;
mod registration;
mod stereo;
mod types;

pub use camera::{select_camera_model, CameraModel, DescriptorKind, Equation, ImageInfo};
pub use paths::SessionPaths;
pub use preprocess::PreprocessOutput;
pub use registration::Registration;
pub use stereo::StereoSession;
pub use types::SessionStage;
