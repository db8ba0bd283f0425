mod common;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;

use parallax_core::align::AlignmentMatrix;
use parallax_core::disparity::DisparityField;
use parallax_core::error::ParallaxError;
use parallax_core::features::{
    Artifact, ArtifactKey, ArtifactStore, FeatureDetector, ImagePairKey, InterestPoint,
    MemoryArtifactStore,
};
use parallax_core::frame::{Frame, Point2};
use parallax_core::geo::GeoReference;
use parallax_core::io::disparity::{read_disparity, write_disparity};
use parallax_core::io::image_io::load_image;
use parallax_core::io::matrix::{read_matrix, write_matrix};
use parallax_core::session::config::SessionConfig;
use parallax_core::session::{Registration, StereoSession};

use common::{constant_frame, scattered_points, shifted_frame, textured_frame, write_frame, ScriptedDetector};

const W: usize = 60;
const H: usize = 50;

struct Fixture {
    _dir: tempfile::TempDir,
    left: PathBuf,
    right: PathBuf,
    prefix: PathBuf,
}

/// Right image content shifted by `(dx, dy)` relative to the left.
fn fixture(dx: f32, dy: f32) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let left = write_frame(dir.path(), "left.tif", &textured_frame(W, H));
    let right = write_frame(dir.path(), "right.tif", &shifted_frame(W, H, dx, dy));
    let prefix = dir.path().join("run");
    Fixture {
        _dir: dir,
        left,
        right,
        prefix,
    }
}

fn session(fx: &Fixture, config: SessionConfig) -> StereoSession {
    StereoSession::new(config, &fx.left, &fx.right)
}

fn write_geo(image: &Path, c: f64, f: f64) {
    GeoReference {
        a: 0.5,
        b: 0.0,
        c,
        d: 0.0,
        e: -0.5,
        f,
    }
    .write_sidecar(image)
    .unwrap();
}

/// Store interest points so that `right = left + (tx, ty)` for every point.
fn seed_translated_points(fx: &Fixture, store: &MemoryArtifactStore, tx: f64, ty: f64) {
    let key = ImagePairKey::from_paths(&fx.left, &fx.right);
    let detector = ScriptedDetector::new(&scattered_points(30));
    let shifted: Vec<InterestPoint> = detector
        .points
        .iter()
        .map(|p| InterestPoint {
            x: p.x + tx as f32,
            y: p.y + ty as f32,
            ..p.clone()
        })
        .collect();
    store
        .store(&ArtifactKey::Points(key.left), &Artifact::Points(detector.points.clone()))
        .unwrap();
    store
        .store(&ArtifactKey::Points(key.right), &Artifact::Points(shifted))
        .unwrap();
}

fn assert_matrix_eq(actual: &AlignmentMatrix, expected: &AlignmentMatrix, eps: f64) {
    for (a, e) in actual.to_row_array().iter().zip(expected.to_row_array()) {
        assert_abs_diff_eq!(*a, e, epsilon = eps);
    }
}

// ---------------------------------------------------------------------------
// preprocess
// ---------------------------------------------------------------------------

#[test]
fn test_preprocess_unaligned_writes_identity_matrix() {
    let fx = fixture(0.0, 0.0);
    let mut config = SessionConfig::new(&fx.prefix);
    config.alignment.enabled = false;
    let session = session(&fx, config);

    let out = session.preprocess().unwrap();
    assert_eq!(out.registration, Registration::Unprojected);
    assert!(out.transform.is_identity(0.0));

    let matrix = read_matrix(&session.paths().align_matrix()).unwrap();
    assert!(matrix.is_identity(1e-6));

    let left = load_image(&out.left).unwrap();
    let right = load_image(&out.right).unwrap();
    assert_eq!((left.width(), left.height()), (W, H));
    assert_eq!((right.width(), right.height()), (W, H));
}

#[test]
fn test_preprocess_joint_range_uses_smaller_maximum() {
    let dir = tempfile::tempdir().unwrap();
    let mut left = constant_frame(8, 8, 0.2);
    left.data[[0, 0]] = 0.8;
    let mut right = constant_frame(8, 8, 0.4);
    right.data[[0, 0]] = 0.6;
    let left = write_frame(dir.path(), "a.tif", &left);
    let right = write_frame(dir.path(), "b.tif", &right);

    let mut config = SessionConfig::new(dir.path().join("out"));
    config.alignment.enabled = false;
    let out = StereoSession::new(config, left, right).preprocess().unwrap();

    assert_abs_diff_eq!(out.range.0, 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(out.range.1, 0.6, epsilon = 1e-6);

    let written = load_image(&out.left).unwrap();
    assert_eq!(written.data[[0, 0]], 1.0);
    assert_eq!(written.data[[4, 4]], 0.0);
}

#[test]
fn test_preprocess_failed_fit_continues_with_identity() {
    let fx = fixture(0.0, 0.0);
    let detector = ScriptedDetector::new(&scattered_points(3));
    let store = MemoryArtifactStore::new();
    let session = session(&fx, SessionConfig::new(&fx.prefix))
        .with_detector(detector.clone())
        .with_store(store.clone());

    let out = session.preprocess().unwrap();
    assert_eq!(detector.detect_count(), 2);
    assert!(out.transform.is_identity(0.0));
    assert!(read_matrix(&session.paths().align_matrix()).unwrap().is_identity(1e-6));
}

#[test]
fn test_preprocess_same_named_inputs_in_different_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a")).unwrap();
    std::fs::create_dir_all(dir.path().join("b")).unwrap();
    let left = write_frame(&dir.path().join("a"), "img.tif", &textured_frame(80, 64));
    let right = write_frame(&dir.path().join("b"), "img.tif", &shifted_frame(80, 64, 4.0, 3.0));

    let out = StereoSession::new(SessionConfig::new(dir.path().join("run")), left, right)
        .preprocess()
        .unwrap();
    assert_matrix_eq(&out.transform, &AlignmentMatrix::translation(-4.0, -3.0), 0.05);
}

#[test]
fn test_preprocess_same_named_inputs_are_detected_separately() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a")).unwrap();
    std::fs::create_dir_all(dir.path().join("b")).unwrap();
    let left = write_frame(&dir.path().join("a"), "img.tif", &textured_frame(W, H));
    let right = write_frame(&dir.path().join("b"), "img.tif", &textured_frame(W, H));

    let detector = ScriptedDetector::new(&scattered_points(12));
    StereoSession::new(SessionConfig::new(dir.path().join("run")), left, right)
        .with_detector(detector.clone())
        .preprocess()
        .unwrap();
    assert_eq!(detector.detect_count(), 2);
}

/// Records the valid range of every frame handed to detection.
#[derive(Clone)]
struct RangeRecorder {
    inner: ScriptedDetector,
    ranges: Arc<Mutex<Vec<(f32, f32)>>>,
}

impl FeatureDetector for RangeRecorder {
    fn detect(&self, frame: &Frame, budget: usize) -> parallax_core::error::Result<Vec<InterestPoint>> {
        self.ranges.lock().unwrap().push(frame.valid_range().unwrap());
        self.inner.detect(frame, budget)
    }

    fn describe(
        &self,
        frame: &Frame,
        points: Vec<InterestPoint>,
    ) -> parallax_core::error::Result<Vec<InterestPoint>> {
        self.inner.describe(frame, points)
    }
}

#[test]
fn test_preprocess_detects_on_normalized_frames() {
    let fx = fixture(0.0, 0.0);
    let recorder = RangeRecorder {
        inner: ScriptedDetector::new(&scattered_points(12)),
        ranges: Arc::new(Mutex::new(Vec::new())),
    };
    session(&fx, SessionConfig::new(&fx.prefix))
        .with_detector(recorder.clone())
        .with_store(MemoryArtifactStore::new())
        .preprocess()
        .unwrap();

    let ranges = recorder.ranges.lock().unwrap();
    assert_eq!(ranges.len(), 2);
    for &(lo, hi) in ranges.iter() {
        assert_abs_diff_eq!(lo, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(hi, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_preprocess_map_projected_skips_feature_alignment() {
    let fx = fixture(3.0, 0.0);
    write_geo(&fx.left, 500.0, 900.0);
    // Right pixel x sits at map x 501.5 + 0.5 x, i.e. left pixel x + 3.
    write_geo(&fx.right, 501.5, 900.0);

    let detector = ScriptedDetector::new(&scattered_points(30));
    let store = MemoryArtifactStore::new();
    let session = session(&fx, SessionConfig::new(&fx.prefix))
        .with_detector(detector.clone())
        .with_store(store.clone());

    let out = session.preprocess().unwrap();
    assert!(out.registration.is_map_projected());
    assert_matrix_eq(&out.transform, &AlignmentMatrix::translation(3.0, 0.0), 1e-9);

    assert_eq!(detector.detect_count(), 0);
    assert_eq!(detector.describe_count(), 0);
    assert!(store.is_empty());
    assert!(!session.paths().align_matrix().exists());
    assert!(session.paths().left_output().with_extension("tfw").is_file());
    assert!(session.paths().right_output().with_extension("tfw").is_file());
}

#[test]
fn test_identity_georeference_uses_feature_path() {
    let fx = fixture(0.0, 0.0);
    GeoReference::default().write_sidecar(&fx.left).unwrap();
    write_geo(&fx.right, 10.0, 10.0);
    assert_eq!(
        Registration::detect(&fx.left, &fx.right).unwrap(),
        Registration::Unprojected
    );
}

// ---------------------------------------------------------------------------
// point cloud
// ---------------------------------------------------------------------------

#[test]
fn test_translation_round_trip_restores_original_disparity() {
    let fx = fixture(3.0, 2.0);
    let store = MemoryArtifactStore::new();
    seed_translated_points(&fx, &store, 3.0, 2.0);
    let detector = ScriptedDetector::new(&[]);
    let session = session(&fx, SessionConfig::new(&fx.prefix))
        .with_detector(detector.clone())
        .with_store(store);

    let out = session.preprocess().unwrap();
    assert_eq!(detector.detect_count(), 0);
    assert_matrix_eq(&out.transform, &AlignmentMatrix::translation(-3.0, -2.0), 1e-4);

    // Registered pair is aligned: zero disparity everywhere.
    let registered = DisparityField::uniform(W, H, 0.0, 0.0);
    let restored = session.point_cloud(&registered).unwrap();

    let cell = restored.get(10, 10);
    assert!(cell.valid);
    assert_abs_diff_eq!(cell.dx, 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(cell.dy, 2.0, epsilon = 1e-3);

    // Targets pushed past the right image are dropped.
    assert!(!restored.get(W - 2, 10).valid);
    assert!(!restored.get(10, H - 1).valid);
}

#[test]
fn test_point_cloud_map_projected_inverts_georeference() {
    let fx = fixture(3.0, 0.0);
    write_geo(&fx.left, 500.0, 900.0);
    write_geo(&fx.right, 501.5, 900.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));

    let mut field = DisparityField::uniform(W, H, 1.0, 0.0);
    field.invalidate(0, 0);
    let restored = session.point_cloud(&field).unwrap();

    assert!(!restored.get(0, 0).valid);
    let target = restored.target(20, 7).unwrap();
    assert_abs_diff_eq!(target.x, 18.0, epsilon = 1e-9);
    assert_abs_diff_eq!(target.y, 7.0, epsilon = 1e-9);
}

#[test]
fn test_point_cloud_without_matrix_is_fatal() {
    let fx = fixture(0.0, 0.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));
    let err = session
        .point_cloud(&DisparityField::uniform(4, 4, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, ParallaxError::PersistedStateMissing { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn test_point_cloud_with_corrupt_matrix_is_fatal() {
    let fx = fixture(0.0, 0.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));
    std::fs::write(session.paths().align_matrix(), b"not an image").unwrap();
    let err = session
        .point_cloud(&DisparityField::uniform(4, 4, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, ParallaxError::PersistedStateMissing { .. }));
}

#[test]
fn test_point_cloud_files_reads_filtered_and_writes_output() {
    let fx = fixture(0.0, 0.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));
    let paths = session.paths();
    write_matrix(&AlignmentMatrix::translation(-1.0, 0.0), &paths.align_matrix()).unwrap();
    write_disparity(&DisparityField::uniform(8, 8, 0.0, 0.0), &paths.filtered_disparity()).unwrap();

    let output = session.point_cloud_files(None).unwrap();
    assert_eq!(output, paths.point_cloud_disparity());
    let restored = read_disparity(&output).unwrap();
    assert_eq!(restored.target(2, 2), Some(Point2::new(3.0, 2.0)));
}

// ---------------------------------------------------------------------------
// filter
// ---------------------------------------------------------------------------

fn mask_with_black_column(width: usize, height: usize, col: usize) -> Frame {
    let mut mask = constant_frame(width, height, 1.0);
    mask.data.column_mut(col).fill(0.0);
    mask
}

#[test]
fn test_filter_disabled_passes_through() {
    let fx = fixture(0.0, 0.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));
    let mut field = DisparityField::uniform(6, 5, 1.0, -1.0);
    field.invalidate(2, 2);
    assert_eq!(session.filter(&field).unwrap(), field);
}

#[test]
fn test_filter_masks_near_black_pixels() {
    let fx = fixture(0.0, 0.0);
    let mut config = SessionConfig::new(&fx.prefix);
    config.filtering.mask_near_black = true;
    let session = session(&fx, config);
    let paths = session.paths();
    let dir = paths.prefix().parent().unwrap().to_path_buf();
    write_frame(&dir, "run-lMask.tif", &mask_with_black_column(20, 10, 5));
    write_frame(&dir, "run-rMask.tif", &mask_with_black_column(20, 10, 15));

    let filtered = session.filter(&DisparityField::uniform(20, 10, 2.0, 0.0)).unwrap();

    for row in 0..10 {
        assert!(!filtered.get(5, row).valid, "left mask");
        assert!(!filtered.get(13, row).valid, "right mask");
        assert!(!filtered.get(18, row).valid, "outside right mask");
        assert!(!filtered.get(19, row).valid, "outside right mask");
        assert!(filtered.get(4, row).valid);
    }
    assert_eq!(filtered.valid_count(), 160);
    assert!(paths.left_mask_debug().is_file());
    assert!(paths.right_mask_debug().is_file());
}

#[test]
fn test_filter_excludes_black_input_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let mut left_image = textured_frame(20, 10);
    left_image.data.row_mut(3).fill(0.0);
    let left = write_frame(dir.path(), "left.tif", &left_image);
    let right = write_frame(dir.path(), "right.tif", &textured_frame(20, 10));
    write_frame(dir.path(), "run-lMask.tif", &constant_frame(20, 10, 1.0));
    write_frame(dir.path(), "run-rMask.tif", &constant_frame(20, 10, 1.0));

    let mut config = SessionConfig::new(dir.path().join("run"));
    config.filtering.mask_near_black = true;
    let session = StereoSession::new(config, left, right);
    let filtered = session.filter(&DisparityField::uniform(20, 10, 0.0, 0.0)).unwrap();

    for col in 0..20 {
        assert!(!filtered.get(col, 3).valid);
        assert!(filtered.get(col, 4).valid);
    }
    assert_eq!(filtered.valid_count(), 180);

    let debug = load_image(&session.paths().left_mask_debug()).unwrap();
    assert_eq!(debug.data[[3, 0]], 0.0);
    assert_eq!(debug.data[[4, 0]], 1.0);
}

#[test]
fn test_filter_requires_masks_when_enabled() {
    let fx = fixture(0.0, 0.0);
    let mut config = SessionConfig::new(&fx.prefix);
    config.filtering.mask_near_black = true;
    let err = session(&fx, config)
        .filter(&DisparityField::uniform(4, 4, 0.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, ParallaxError::InputMissing(_)));
}

#[test]
fn test_filter_files_writes_filtered_disparity() {
    let fx = fixture(0.0, 0.0);
    let session = session(&fx, SessionConfig::new(&fx.prefix));
    let paths = session.paths();
    let field = DisparityField::uniform(5, 5, 0.5, 0.5);
    write_disparity(&field, &paths.disparity()).unwrap();

    let output = session.filter_files(None).unwrap();
    assert_eq!(output, paths.filtered_disparity());
    assert_eq!(read_disparity(&output).unwrap(), field);
}
