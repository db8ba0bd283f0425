use std::path::PathBuf;

use parallax_core::disparity::{CorrelationParams, CostFunction, SearchWindow};
use parallax_core::offset::OffsetParams;
use parallax_core::session::config::SessionConfig;
use parallax_core::session::{SessionPaths, SessionStage};

#[test]
fn test_session_config_defaults() {
    let config = SessionConfig::new("out/run");
    assert!(config.alignment.enabled);
    assert_eq!(config.alignment.point_budget, 500);
    assert!(!config.filtering.mask_near_black);
    assert_eq!(config.resolved_cache_dir(), PathBuf::from("out"));
    assert_eq!(SessionConfig::new("run").resolved_cache_dir(), PathBuf::from("."));
}

#[test]
fn test_session_config_from_partial_toml() {
    let text = r#"
        out_prefix = "work/pair"

        [alignment]
        enabled = false

        [filtering]
        mask_near_black = true
        near_black_threshold = 0.05
    "#;
    let config: SessionConfig = toml::from_str(text).unwrap();
    assert_eq!(config.out_prefix, PathBuf::from("work/pair"));
    assert!(!config.alignment.enabled);
    assert_eq!(config.alignment.match_ratio, 0.8);
    assert_eq!(config.alignment.ransac.inlier_threshold, 10.0);
    assert!(config.filtering.mask_near_black);
    assert_eq!(config.filtering.near_black_threshold, 0.05);
    assert_eq!(config.cache_dir, None);

    let again: SessionConfig = toml::from_str(&toml::to_string(&config).unwrap()).unwrap();
    assert_eq!(again, config);
}

#[test]
fn test_session_paths() {
    let paths = SessionPaths::new(std::path::Path::new("out/run"));
    assert_eq!(paths.left_output(), PathBuf::from("out/run-L.tif"));
    assert_eq!(paths.right_output(), PathBuf::from("out/run-R.tif"));
    assert_eq!(paths.align_matrix(), PathBuf::from("out/run-align.exr"));
    assert_eq!(paths.disparity(), PathBuf::from("out/run-D.disp"));
    assert_eq!(paths.filtered_disparity(), PathBuf::from("out/run-F.disp"));
    assert_eq!(paths.point_cloud_disparity(), PathBuf::from("out/run-PC.disp"));
    assert_eq!(paths.left_mask(), PathBuf::from("out/run-lMask.tif"));
    assert_eq!(paths.right_mask(), PathBuf::from("out/run-rMask.tif"));
}

#[test]
fn test_offset_defaults() {
    let params = OffsetParams::default();
    assert_eq!(params.crop_width, 300);
    assert_eq!(params.log_sigma, 1.4);
    assert_eq!(params.correlation.kernel, (15, 15));
    assert_eq!(params.correlation.lr_threshold, 2);
    assert_eq!(params.correlation.cost, CostFunction::AbsoluteDifference);
    assert_eq!(
        params.correlation.search,
        SearchWindow {
            h_min: -30,
            h_max: 30,
            v_min: -5,
            v_max: 5
        }
    );
    assert!(!params.correlation.pyramid);
}

#[test]
fn test_cost_function_from_index() {
    assert_eq!(CostFunction::from_index(0), Some(CostFunction::AbsoluteDifference));
    assert_eq!(CostFunction::from_index(1), Some(CostFunction::SquaredDifference));
    assert_eq!(CostFunction::from_index(2), Some(CostFunction::NormalizedCrossCorrelation));
    assert_eq!(CostFunction::from_index(3), None);
}

#[test]
fn test_correlation_params_toml() {
    let params = CorrelationParams::default();
    let text = toml::to_string(&params).unwrap();
    let back: CorrelationParams = toml::from_str(&text).unwrap();
    assert_eq!(back, params);
}

#[test]
fn test_session_stage_display() {
    assert_eq!(format!("{}", SessionStage::Preprocessing), "Preprocessing");
    assert_eq!(format!("{}", SessionStage::PointCloud), "Preparing point cloud");
}
