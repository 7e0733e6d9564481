use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CatalogError;

/// Tilt angle in degrees, in `[0, 180]` for finite input
pub type Angle = f64;

/// A local-time-zone calendar date
pub type CalendarDate = NaiveDate;

/// Single accelerometer reading delivered by the motion sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Acceleration along the device x axis (g)
    pub x: f64,

    /// Acceleration along the device y axis (g)
    pub y: f64,

    /// Milliseconds since the sensor started
    pub timestamp_ms: u64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// True when both axes are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Body region an exercise works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Arms,
    Legs,
    Core,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Arms, Target::Legs, Target::Core];
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Arms => write!(f, "Arms"),
            Target::Legs => write!(f, "Legs"),
            Target::Core => write!(f, "Core"),
        }
    }
}

impl FromStr for Target {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arms" | "arm" => Ok(Target::Arms),
            "legs" | "leg" => Ok(Target::Legs),
            "core" => Ok(Target::Core),
            _ => Err(CatalogError::UnknownTarget {
                value: s.to_string(),
            }),
        }
    }
}

/// Static catalog entry describing a guided exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Identifier assigned when the catalog is loaded
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Display name, unique within a catalog
    pub name: String,

    /// Body region worked
    pub target: Target,

    /// Short instructions shown before starting
    pub description: String,

    /// Asset reference for the illustration
    #[serde(default)]
    pub image_ref: Option<String>,

    /// Estimated energy per repetition (kcal)
    pub calories_per_rep: f64,
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        target: Target,
        description: impl Into<String>,
        calories_per_rep: f64,
    ) -> Self {
        Exercise {
            id: Uuid::new_v4(),
            name: name.into(),
            target,
            description: description.into(),
            image_ref: None,
            calories_per_rep,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parsing() {
        assert_eq!("Arms".parse::<Target>().unwrap(), Target::Arms);
        assert_eq!(" legs ".parse::<Target>().unwrap(), Target::Legs);
        assert_eq!("CORE".parse::<Target>().unwrap(), Target::Core);
        assert!("back".parse::<Target>().is_err());
    }

    #[test]
    fn test_target_display_matches_parse() {
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
        }
    }

    #[test]
    fn test_sample_finiteness() {
        assert!(MotionSample::new(0.1, 0.9, 0).is_finite());
        assert!(!MotionSample::new(f64::NAN, 0.9, 0).is_finite());
        assert!(!MotionSample::new(0.0, f64::INFINITY, 0).is_finite());
    }

    #[test]
    fn test_exercise_ids_are_unique() {
        let a = Exercise::new("Arm Circles", Target::Arms, "", 0.3);
        let b = Exercise::new("Arm Circles", Target::Arms, "", 0.3);
        assert_ne!(a.id, b.id);
    }
}
