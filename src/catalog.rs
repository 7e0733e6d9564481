use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;
use crate::models::{Exercise, Target};

/// Read-only list of guided exercises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

/// On-disk catalog layout (`[[exercise]]` tables)
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "exercise")]
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// Build a catalog, rejecting entries that break catalog invariants
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for exercise in &exercises {
            if exercise.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !exercise.calories_per_rep.is_finite() || exercise.calories_per_rep < 0.0 {
                return Err(CatalogError::InvalidCalories {
                    exercise: exercise.name.clone(),
                    value: exercise.calories_per_rep,
                });
            }
            if !seen.insert(exercise.name.to_lowercase()) {
                return Err(CatalogError::Duplicate {
                    name: exercise.name.clone(),
                });
            }
        }

        Ok(Catalog { exercises })
    }

    /// Seated exercise set shipped with the app
    pub fn builtin() -> Self {
        let exercises = vec![
            Exercise::new(
                "Seated Arm Raises",
                Target::Arms,
                "Sit upright and raise your arms to shoulder level.",
                0.5,
            )
            .with_image("seated_arm_raises"),
            Exercise::new(
                "Arm Circles",
                Target::Arms,
                "Extend your arms to the side and make small circles.",
                0.3,
            )
            .with_image("arm_circles"),
            Exercise::new(
                "Elbow Flexion",
                Target::Arms,
                "Bend and extend the elbow to exercise the bicep.",
                0.3,
            )
            .with_image("elbow_flexion"),
            Exercise::new(
                "Wrist Flexion and Extension",
                Target::Arms,
                "Move your wrist up and down to improve flexibility.",
                0.1,
            )
            .with_image("wrist_flexion"),
            Exercise::new(
                "Seated Leg Lifts",
                Target::Legs,
                "Lift one leg at a time while seated.",
                0.6,
            )
            .with_image("seated_leg_lifts"),
            Exercise::new(
                "Ankle Rotations",
                Target::Legs,
                "Rotate your ankles in a circular motion.",
                0.1,
            )
            .with_image("ankle_rotations"),
            Exercise::new(
                "Torso Twists",
                Target::Core,
                "Twist your torso to the left and right while seated.",
                0.4,
            )
            .with_image("torso_twists"),
            Exercise::new(
                "Seated Forward Bends",
                Target::Core,
                "Bend forward slowly to stretch your back.",
                0.4,
            )
            .with_image("seated_forward_bends"),
        ];

        Catalog { exercises }
    }

    /// Load a catalog from a TOML file of `[[exercise]]` entries
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let parse_error = |reason: String| CatalogError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

        let catalog = Self::new(file.exercises)?;
        tracing::info!(count = catalog.len(), path = %path.display(), "Loaded exercise catalog");
        Ok(catalog)
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercises matching an optional target and a case-insensitive name
    /// fragment. An empty search matches everything.
    pub fn filter(&self, target: Option<Target>, search: &str) -> Vec<&Exercise> {
        let needle = search.trim().to_lowercase();
        self.exercises
            .iter()
            .filter(|e| target.map_or(true, |t| e.target == t))
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive exact name lookup
    pub fn find(&self, name: &str) -> Result<&Exercise, CatalogError> {
        let wanted = name.trim().to_lowercase();
        self.exercises
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
