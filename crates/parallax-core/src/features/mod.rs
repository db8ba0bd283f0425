//! Interest points, descriptor matching and the tiered correspondence cache.

pub mod cache;
pub mod detector;
pub mod matcher;
mod types;

pub use cache::{AlignmentCache, Artifact, ArtifactKey, ArtifactStore, FileArtifactStore, MemoryArtifactStore};
pub use detector::{FeatureDetector, HarrisDetector};
pub use matcher::match_points;
pub use types::{image_id, points_file_name, CorrespondenceSet, ImagePairKey, InterestPoint};
