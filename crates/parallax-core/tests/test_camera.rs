mod common;

use std::io::Write;

use parallax_core::error::ParallaxError;
use parallax_core::session::{select_camera_model, CameraModel, DescriptorKind, Equation};

use common::{textured_frame, write_frame};

#[test]
fn test_standard_descriptor_uses_image_only() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_frame(dir.path(), "img.tif", &textured_frame(12, 8));
    let model = select_camera_model(&image, &dir.path().join("img.tsai")).unwrap();

    assert_eq!(model.kind(), DescriptorKind::Standard);
    assert_eq!((model.image().width, model.image().height), (12, 8));
}

#[test]
fn test_adjusted_descriptor_reads_two_equations() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_frame(dir.path(), "img.tif", &textured_frame(12, 8));
    let descriptor = dir.path().join("img.ADJUST");
    let mut f = std::fs::File::create(&descriptor).unwrap();
    writeln!(f, r#"{{"type": "polynomial", "t0": 0.0, "x": [1.0, 1.0], "y": [2.0], "z": [3.0]}}"#).unwrap();
    writeln!(f, r#"{{"type": "constant", "value": [0.0, 0.5, 1.0]}}"#).unwrap();
    drop(f);

    let model = select_camera_model(&image, &descriptor).unwrap();
    let CameraModel::Adjusted {
        position,
        orientation,
        ..
    } = model
    else {
        panic!("expected an adjusted camera");
    };
    assert_eq!(position.evaluate(2.0), [3.0, 2.0, 3.0]);
    assert_eq!(
        orientation,
        Equation::Constant {
            value: [0.0, 0.5, 1.0]
        }
    );
}

#[test]
fn test_adjusted_descriptor_needs_both_equations() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_frame(dir.path(), "img.tif", &textured_frame(4, 4));
    let descriptor = dir.path().join("img.adjust");
    std::fs::write(&descriptor, r#"{"type": "constant", "value": [1.0, 2.0, 3.0]}"#).unwrap();

    let err = select_camera_model(&image, &descriptor).unwrap_err();
    assert!(matches!(err, ParallaxError::InvalidDescriptor(_)));
}

#[test]
fn test_missing_image_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = select_camera_model(&dir.path().join("none.tif"), &dir.path().join("none.tsai"))
        .unwrap_err();
    assert!(matches!(err, ParallaxError::InputMissing(_)));
}
