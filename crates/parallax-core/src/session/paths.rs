use std::path::{Path, PathBuf};

/// File names derived from a session's output prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionPaths {
    prefix: PathBuf,
}

impl SessionPaths {
    pub fn new(prefix: &Path) -> Self {
        Self {
            prefix: prefix.to_path_buf(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Normalized left image.
    pub fn left_output(&self) -> PathBuf {
        self.with_suffix("-L.tif")
    }

    /// Normalized right image, registered to the left.
    pub fn right_output(&self) -> PathBuf {
        self.with_suffix("-R.tif")
    }

    /// Homography carrying right-image pixels onto left-image pixels.
    pub fn align_matrix(&self) -> PathBuf {
        self.with_suffix("-align.exr")
    }

    /// Raw correlator output.
    pub fn disparity(&self) -> PathBuf {
        self.with_suffix("-D.disp")
    }

    pub fn filtered_disparity(&self) -> PathBuf {
        self.with_suffix("-F.disp")
    }

    /// Disparity expressed in the original image coordinates.
    pub fn point_cloud_disparity(&self) -> PathBuf {
        self.with_suffix("-PC.disp")
    }

    pub fn left_mask(&self) -> PathBuf {
        self.with_suffix("-lMask.tif")
    }

    pub fn right_mask(&self) -> PathBuf {
        self.with_suffix("-rMask.tif")
    }

    /// Left mask combined with the left input's near-black pixels.
    pub fn left_mask_debug(&self) -> PathBuf {
        self.with_suffix("-lMaskDebug.tif")
    }

    pub fn right_mask_debug(&self) -> PathBuf {
        self.with_suffix("-rMaskDebug.tif")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}
