//! Tilt angle estimation from a two-axis accelerometer sample.

use crate::models::{Angle, MotionSample};

/// Maps a raw sample to the absolute tilt angle of the device in degrees.
///
/// `|atan2(y, x)|` in degrees. Total over all inputs: `(0, 0)` yields `0`
/// and a NaN axis yields NaN, which the detector treats as a no-op sample.
pub struct AngleEstimator;

impl AngleEstimator {
    pub fn estimate(sample: &MotionSample) -> Angle {
        sample.y.atan2(sample.x).abs().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle(x: f64, y: f64) -> Angle {
        AngleEstimator::estimate(&MotionSample::new(x, y, 0))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_cardinal_directions() {
        assert_close(angle(1.0, 0.0), 0.0);
        assert_close(angle(0.0, 1.0), 90.0);
        assert_close(angle(-1.0, 0.0), 180.0);
        assert_close(angle(1.0, 1.0), 45.0);
    }

    #[test]
    fn test_negative_y_folds_to_positive() {
        assert_close(angle(0.0, -1.0), 90.0);
        assert_close(angle(1.0, -1.0), 45.0);
    }

    #[test]
    fn test_origin_is_zero() {
        assert_eq!(angle(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_nan_propagates_without_panic() {
        assert!(angle(f64::NAN, 0.5).is_nan());
        assert!(angle(0.5, f64::NAN).is_nan());
    }

    #[test]
    fn test_infinite_axes_stay_in_range() {
        let a = angle(f64::INFINITY, 1.0);
        assert!((0.0..=180.0).contains(&a));
        let a = angle(1.0, f64::NEG_INFINITY);
        assert_close(a, 90.0);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_angle_always_in_range(x in -20.0f64..20.0, y in -20.0f64..20.0) {
            let a = angle(x, y);
            prop_assert!((0.0..=180.0).contains(&a));
        }

        #[test]
        fn test_angle_symmetric_in_y(x in -5.0f64..5.0, y in -5.0f64..5.0) {
            prop_assert!((angle(x, y) - angle(x, -y)).abs() < 1e-9);
        }
    }
}
