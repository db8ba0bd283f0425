use approx::assert_abs_diff_eq;

use parallax_core::stats::StreamingStats;

const SAMPLES: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

#[test]
fn test_empty_stats_are_zero() {
    let stats = StreamingStats::new();
    assert_eq!(stats.count(), 0);
    assert_eq!(stats.mean(), 0.0);
    assert_eq!(stats.variance(), 0.0);
    assert_eq!(stats.standard_deviation(), 0.0);
}

#[test]
fn test_known_mean_and_variance() {
    let mut stats = StreamingStats::new();
    for x in SAMPLES {
        stats.push(x);
    }
    assert_eq!(stats.count(), 8);
    assert_abs_diff_eq!(stats.mean(), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.variance(), 32.0 / 7.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.standard_deviation(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_single_sample_has_zero_variance() {
    let mut stats = StreamingStats::new();
    stats.push(3.5);
    assert_eq!(stats.mean(), 3.5);
    assert_eq!(stats.variance(), 0.0);
}

#[test]
fn test_clear_matches_fresh_instance() {
    let mut stats = StreamingStats::new();
    stats.extend([100.0, -3.0, 17.0]);
    stats.clear();
    assert_eq!(stats.count(), 0);
    assert_eq!(stats.mean(), 0.0);
    assert_eq!(stats.variance(), 0.0);

    stats.extend(SAMPLES);
    assert_abs_diff_eq!(stats.mean(), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.variance(), 32.0 / 7.0, epsilon = 1e-12);
}

#[test]
fn test_large_offset_is_stable() {
    let mut stats = StreamingStats::new();
    stats.extend(SAMPLES.iter().map(|x| x + 1e9));
    assert_abs_diff_eq!(stats.mean(), 1e9 + 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(stats.variance(), 32.0 / 7.0, epsilon = 1e-6);
}
