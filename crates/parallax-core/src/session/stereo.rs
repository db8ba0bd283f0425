use std::path::{Path, PathBuf};

use crate::features::{ArtifactStore, FeatureDetector, FileArtifactStore, HarrisDetector};

use super::config::SessionConfig;
use super::SessionPaths;

/// A left/right image pair and the settings for processing it.
///
/// Stages are independent calls made in order by a driver:
/// [`preprocess`](Self::preprocess), external correlation,
/// [`filter`](Self::filter), [`point_cloud`](Self::point_cloud). The only
/// state carried between them is the alignment matrix file on disk.
pub struct StereoSession {
    pub(super) config: SessionConfig,
    pub(super) left: PathBuf,
    pub(super) right: PathBuf,
    pub(super) detector: Box<dyn FeatureDetector>,
    pub(super) store: Box<dyn ArtifactStore>,
}

impl StereoSession {
    /// Session using the Harris detector and a file cache in
    /// [`SessionConfig::resolved_cache_dir`].
    pub fn new(config: SessionConfig, left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        let store = FileArtifactStore::new(config.resolved_cache_dir());
        Self {
            config,
            left: left.into(),
            right: right.into(),
            detector: Box::new(HarrisDetector::default()),
            store: Box::new(store),
        }
    }

    pub fn with_detector(mut self, detector: impl FeatureDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_store(mut self, store: impl ArtifactStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn paths(&self) -> SessionPaths {
        self.config.paths()
    }

    pub fn left(&self) -> &Path {
        &self.left
    }

    pub fn right(&self) -> &Path {
        &self.right
    }
}
