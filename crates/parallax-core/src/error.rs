use std::path::PathBuf;

use thiserror::Error;

/// A robust homography fit that could not produce a usable model.
///
/// Returned on its own (not wrapped) by the fitting routines so callers can
/// substitute an identity transform and keep going.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("degenerate homography fit: {0}")]
pub struct DegenerateFit(pub String);

#[derive(Error, Debug)]
pub enum ParallaxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Malformed equation data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required input is missing: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("No valid matches: {0}")]
    NoValidMatches(String),

    #[error(transparent)]
    DegenerateFit(#[from] DegenerateFit),

    #[error("Alignment state missing at {}: {reason}", path.display())]
    PersistedStateMissing { path: PathBuf, reason: String },

    #[error("Cannot write log file {}: {source}", path.display())]
    LogFileUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image has no valid pixels: {}", .0.display())]
    NoValidPixels(PathBuf),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Correspondence lists differ in length: {left} vs {right}")]
    CorrespondenceMismatch { left: usize, right: usize },

    #[error("Invalid camera descriptor: {0}")]
    InvalidDescriptor(String),
}

impl ParallaxError {
    /// Whether the failure only affects a side path (logging, alignment
    /// refinement) and processing may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateFit(_) | Self::LogFileUnwritable { .. })
    }
}

pub type Result<T> = std::result::Result<T, ParallaxError>;
