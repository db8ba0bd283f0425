use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::align::RansacConfig;
use crate::consts::{DEFAULT_MATCH_RATIO, DEFAULT_NEAR_BLACK_THRESHOLD, DEFAULT_POINT_BUDGET};

use super::SessionPaths;

/// Settings for one stereo session, passed explicitly to every stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Prefix for every file the session writes, e.g. `out/run` gives
    /// `out/run-L.tif`.
    pub out_prefix: PathBuf,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub filtering: FilterConfig,
    /// Where interest points and matches are cached. Defaults to the
    /// directory of `out_prefix`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(out_prefix: impl Into<PathBuf>) -> Self {
        Self {
            out_prefix: out_prefix.into(),
            alignment: AlignmentConfig::default(),
            filtering: FilterConfig::default(),
            cache_dir: None,
        }
    }

    pub fn paths(&self) -> SessionPaths {
        SessionPaths::new(&self.out_prefix)
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => self
                .out_prefix
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Feature-based alignment for images without a georeference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub enabled: bool,
    /// Interest points kept per image.
    pub point_budget: usize,
    /// Descriptor distance ratio test threshold.
    pub match_ratio: f32,
    pub ransac: RansacConfig,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            point_budget: DEFAULT_POINT_BUDGET,
            match_ratio: DEFAULT_MATCH_RATIO,
            ransac: RansacConfig::default(),
        }
    }
}

/// Disparity masking between correlation and point-cloud generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Invalidate disparities that land on near-black mask pixels.
    pub mask_near_black: bool,
    /// Mask values at or below this are near-black.
    pub near_black_threshold: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mask_near_black: false,
            near_black_threshold: DEFAULT_NEAR_BLACK_THRESHOLD,
        }
    }
}
