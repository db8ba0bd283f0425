#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array2;

use parallax_core::error::Result;
use parallax_core::features::{FeatureDetector, InterestPoint};
use parallax_core::frame::{Frame, Point2};
use parallax_core::io::image_io::save_image;

/// Smooth, non-repeating texture in (0, 1).
pub fn texture(x: f32, y: f32) -> f32 {
    0.5 + 0.2 * (0.37 * x + 0.11 * y * y / 7.0).sin() + 0.2 * (0.23 * y - 0.05 * x * x / 9.0).cos()
}

pub fn textured_frame(width: usize, height: usize) -> Frame {
    shifted_frame(width, height, 0.0, 0.0)
}

/// Texture whose content sits `(dx, dy)` further along than in
/// [`textured_frame`]: pixel `p` here shows what `p - (dx, dy)` shows there.
pub fn shifted_frame(width: usize, height: usize, dx: f32, dy: f32) -> Frame {
    let data = Array2::from_shape_fn((height, width), |(row, col)| {
        texture(col as f32 - dx, row as f32 - dy)
    });
    Frame::new(data)
}

pub fn constant_frame(width: usize, height: usize, value: f32) -> Frame {
    Frame::new(Array2::from_elem((height, width), value))
}

/// Write `frame` (values in [0, 1]) as an 8-bit TIFF and return its path.
pub fn write_frame(dir: &Path, name: &str, frame: &Frame) -> PathBuf {
    let path = dir.join(name);
    save_image(frame, &path).expect("write test image");
    path
}

/// Scattered, distinct points with no three on a line in typical samples.
pub fn scattered_points(count: usize) -> Vec<Point2> {
    let mut state = 12345u64;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) % 10_000) as f64 / 100.0
    };
    (0..count).map(|_| Point2::new(next() + 5.0, next() + 5.0)).collect()
}

/// Detector returning a fixed point list and counting how often it runs.
#[derive(Clone)]
pub struct ScriptedDetector {
    pub points: Vec<InterestPoint>,
    pub detect_calls: Arc<AtomicUsize>,
    pub describe_calls: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    /// Points at `positions`, each with a distinct one-hot descriptor.
    pub fn new(positions: &[Point2]) -> Self {
        let n = positions.len();
        let points = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut descriptor = vec![0.0f32; n];
                descriptor[i] = 1.0;
                InterestPoint {
                    x: p.x as f32,
                    y: p.y as f32,
                    strength: 1.0,
                    descriptor,
                }
            })
            .collect();
        Self {
            points,
            detect_calls: Arc::new(AtomicUsize::new(0)),
            describe_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn detect_count(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn describe_count(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }
}

impl FeatureDetector for ScriptedDetector {
    fn detect(&self, _frame: &Frame, budget: usize) -> Result<Vec<InterestPoint>> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .points
            .iter()
            .take(budget)
            .map(|p| InterestPoint {
                descriptor: Vec::new(),
                ..p.clone()
            })
            .collect())
    }

    fn describe(&self, _frame: &Frame, points: Vec<InterestPoint>) -> Result<Vec<InterestPoint>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(points
            .into_iter()
            .filter_map(|p| {
                self.points
                    .iter()
                    .find(|s| s.x == p.x && s.y == p.y)
                    .cloned()
            })
            .collect())
    }
}
