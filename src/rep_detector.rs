use serde::{Deserialize, Serialize};

use crate::error::DetectorError;
use crate::models::Angle;

/// Hysteresis thresholds for repetition detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepThresholds {
    /// Angle at or above which a resting arm enters a rep (default: 50)
    pub rising_deg: f64,

    /// Angle at or below which an arm in a rep returns to rest (default: 30)
    pub falling_deg: f64,
}

impl Default for RepThresholds {
    fn default() -> Self {
        RepThresholds {
            rising_deg: 50.0,
            falling_deg: 30.0,
        }
    }
}

impl RepThresholds {
    /// Thresholds must lie in `0..=180` and keep a non-empty dead zone
    pub fn validate(&self) -> Result<(), DetectorError> {
        for (name, value) in [("rising_deg", self.rising_deg), ("falling_deg", self.falling_deg)] {
            if !(0.0..=180.0).contains(&value) {
                return Err(DetectorError::OutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }

        if self.rising_deg <= self.falling_deg {
            return Err(DetectorError::CollapsedBand {
                rising: self.rising_deg,
                falling: self.falling_deg,
            });
        }

        Ok(())
    }

    /// Width of the dead zone in degrees
    pub fn band_width(&self) -> f64 {
        self.rising_deg - self.falling_deg
    }
}

/// Detector state owned by one exercise session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepDetectorState {
    pub in_rep: bool,
}

/// Named view of `RepDetectorState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepPhase {
    Resting,
    InRep,
}

impl RepDetectorState {
    pub fn phase(&self) -> RepPhase {
        if self.in_rep {
            RepPhase::InRep
        } else {
            RepPhase::Resting
        }
    }
}

/// Two-threshold state machine turning tilt angles into rep events
#[derive(Debug, Clone)]
pub struct RepDetector {
    thresholds: RepThresholds,
}

impl RepDetector {
    /// Create new detector with the default 50/30 degree band
    pub fn new() -> Self {
        RepDetector {
            thresholds: RepThresholds::default(),
        }
    }

    /// Create new detector with custom thresholds
    pub fn with_thresholds(thresholds: RepThresholds) -> Result<Self, DetectorError> {
        thresholds.validate()?;
        Ok(RepDetector { thresholds })
    }

    pub fn thresholds(&self) -> &RepThresholds {
        &self.thresholds
    }

    /// Feed one angle. Returns the next state and whether a rep completed.
    ///
    /// Only the Resting -> InRep edge fires. NaN fails both comparisons and
    /// leaves the state untouched.
    pub fn consume(&self, angle: Angle, state: RepDetectorState) -> (RepDetectorState, bool) {
        match state.phase() {
            RepPhase::Resting if angle >= self.thresholds.rising_deg => {
                (RepDetectorState { in_rep: true }, true)
            }
            RepPhase::InRep if angle <= self.thresholds.falling_deg => {
                (RepDetectorState { in_rep: false }, false)
            }
            _ => (state, false),
        }
    }

    /// Count rep events over a finite angle sequence starting from rest
    pub fn count_reps<I>(&self, angles: I) -> u32
    where
        I: IntoIterator<Item = Angle>,
    {
        let mut state = RepDetectorState::default();
        let mut reps = 0;
        for angle in angles {
            let (next, fired) = self.consume(angle, state);
            state = next;
            if fired {
                reps += 1;
            }
        }
        reps
    }
}

impl Default for RepDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTING: RepDetectorState = RepDetectorState { in_rep: false };
    const IN_REP: RepDetectorState = RepDetectorState { in_rep: true };

    #[test]
    fn test_rising_edge_fires() {
        let detector = RepDetector::new();
        assert_eq!(detector.consume(60.0, RESTING), (IN_REP, true));
    }

    #[test]
    fn test_falling_edge_is_silent() {
        let detector = RepDetector::new();
        assert_eq!(detector.consume(10.0, IN_REP), (RESTING, false));
    }

    #[test]
    fn test_no_refire_while_in_rep() {
        let detector = RepDetector::new();
        assert_eq!(detector.consume(90.0, IN_REP), (IN_REP, false));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let detector = RepDetector::new();
        assert_eq!(detector.consume(50.0, RESTING), (IN_REP, true));
        assert_eq!(detector.consume(30.0, IN_REP), (RESTING, false));
        assert_eq!(detector.consume(49.999, RESTING), (RESTING, false));
        assert_eq!(detector.consume(30.001, IN_REP), (IN_REP, false));
    }

    #[test]
    fn test_nan_causes_no_transition() {
        let detector = RepDetector::new();
        assert_eq!(detector.consume(f64::NAN, RESTING), (RESTING, false));
        assert_eq!(detector.consume(f64::NAN, IN_REP), (IN_REP, false));
    }

    #[test]
    fn test_two_full_cycles_count_two() {
        let detector = RepDetector::new();
        assert_eq!(detector.count_reps([60.0, 10.0, 60.0, 10.0]), 2);
    }

    #[test]
    fn test_dead_zone_dip_does_not_double_count() {
        let detector = RepDetector::new();
        assert_eq!(detector.count_reps([60.0, 40.0, 60.0]), 1);
    }

    #[test]
    fn test_chatter_near_single_boundary() {
        let detector = RepDetector::new();
        let chatter = [49.0, 51.0, 49.0, 51.0, 49.0, 51.0, 35.0, 51.0];
        assert_eq!(detector.count_reps(chatter), 1);
    }

    #[test]
    fn test_custom_thresholds() {
        let detector = RepDetector::with_thresholds(RepThresholds {
            rising_deg: 80.0,
            falling_deg: 20.0,
        })
        .unwrap();
        assert_eq!(detector.count_reps([60.0, 10.0, 85.0, 50.0, 85.0, 15.0]), 1);
        assert_eq!(detector.thresholds().band_width(), 60.0);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let collapsed = RepThresholds {
            rising_deg: 40.0,
            falling_deg: 40.0,
        };
        assert!(matches!(
            RepDetector::with_thresholds(collapsed),
            Err(DetectorError::CollapsedBand { .. })
        ));

        let out_of_range = RepThresholds {
            rising_deg: 200.0,
            falling_deg: 30.0,
        };
        assert!(matches!(
            out_of_range.validate(),
            Err(DetectorError::OutOfRange { .. })
        ));

        let nan = RepThresholds {
            rising_deg: f64::NAN,
            falling_deg: 30.0,
        };
        assert!(nan.validate().is_err());
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_low_angles_end_rep(angle in 0.0f64..=30.0) {
            let detector = RepDetector::new();
            prop_assert_eq!(detector.consume(angle, IN_REP), (RESTING, false));
        }

        #[test]
        fn test_high_angles_start_rep(angle in 50.0f64..=180.0) {
            let detector = RepDetector::new();
            prop_assert_eq!(detector.consume(angle, RESTING), (IN_REP, true));
        }

        #[test]
        fn test_dead_zone_holds_state(angle in 30.0001f64..49.9999, in_rep in any::<bool>()) {
            let detector = RepDetector::new();
            let state = RepDetectorState { in_rep };
            prop_assert_eq!(detector.consume(angle, state), (state, false));
        }

        #[test]
        fn test_events_never_exceed_rising_crossings(
            angles in prop::collection::vec(0.0f64..180.0, 0..200)
        ) {
            let detector = RepDetector::new();
            let reps = detector.count_reps(angles.iter().copied());
            let highs = angles.iter().filter(|a| **a >= 50.0).count() as u32;
            prop_assert!(reps <= highs);
        }
    }
}
