use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParallaxError, Result};
use crate::frame::Point2;

/// A detected image location together with its appearance descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct InterestPoint {
    pub x: f32,
    pub y: f32,
    /// Detector response; larger is stronger.
    pub strength: f32,
    pub descriptor: Vec<f32>,
}

impl InterestPoint {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x as f64, self.y as f64)
    }
}

/// Paired coordinates: `left()[i]` corresponds to `right()[i]`.
///
/// The two sequences always have the same length and the set is immutable
/// once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorrespondenceSet {
    left: Vec<Point2>,
    right: Vec<Point2>,
}

impl CorrespondenceSet {
    pub fn new(left: Vec<Point2>, right: Vec<Point2>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(ParallaxError::CorrespondenceMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(Self { left, right })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Point2, Point2)>) -> Self {
        let (left, right) = pairs.into_iter().unzip();
        Self { left, right }
    }

    pub fn left(&self) -> &[Point2] {
        &self.left
    }

    pub fn right(&self) -> &[Point2] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point2, &Point2)> {
        self.left.iter().zip(self.right.iter())
    }
}

/// Identity of an image pair for cache lookups, built from both image ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePairKey {
    pub left: String,
    pub right: String,
}

impl ImagePairKey {
    pub fn from_paths(left: &Path, right: &Path) -> Self {
        Self {
            left: image_id(left),
            right: image_id(right),
        }
    }

    /// File name of the correspondence artifact, `<id1>__<id2>.match` with
    /// both ids escaped.
    pub fn match_file_name(&self) -> String {
        format!("{}__{}.match", escape_id(&self.left), escape_id(&self.right))
    }
}

impl std::fmt::Display for ImagePairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}__{}", self.left, self.right)
    }
}

/// Cache identity of an image: its path with only the final extension
/// removed, so same-named files in different directories stay distinct.
pub fn image_id(path: &Path) -> String {
    path.with_extension("").to_string_lossy().into_owned()
}

/// File name of a per-image interest-point artifact, `<id>.vwip` with the id
/// escaped.
pub fn points_file_name(id: &str) -> String {
    format!("{}.vwip", escape_id(id))
}

/// Flatten an id into one file-name component. Everything except ASCII
/// alphanumerics, `-` and `.` is written as `%XX`, so distinct ids never
/// share a name and `__` only ever separates the two halves of a pair.
fn escape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
