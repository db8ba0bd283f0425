/// Stereo session stage, used for logging and progress display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStage {
    Preprocessing,
    Correlation,
    Filtering,
    PointCloud,
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocessing => write!(f, "Preprocessing"),
            Self::Correlation => write!(f, "Correlating"),
            Self::Filtering => write!(f, "Filtering disparity"),
            Self::PointCloud => write!(f, "Preparing point cloud"),
        }
    }
}
