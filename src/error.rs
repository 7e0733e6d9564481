//! Unified error hierarchy for MoveAbility
//!
//! Provides the error types shared by the sensor, storage, catalog and
//! detector layers, plus severity mapping for the tracing system.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all MoveAbility operations
#[derive(Debug, Error)]
pub enum MoveAbilityError {
    /// Motion sensor errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Exercise catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Repetition detector configuration errors
    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    /// Haptic/feedback errors
    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Motion sensor errors
#[derive(Debug, Error)]
pub enum SensorError {
    /// Device has no motion hardware (or it is disabled)
    #[error("Motion sensor unavailable: {reason}")]
    Unavailable { reason: String },

    /// Sensor was started twice without being stopped
    #[error("Motion sensor already running")]
    AlreadyRunning,

    /// Recorded sample file could not be read
    #[error("Failed to read samples from {path}: {reason}")]
    SampleFile { path: PathBuf, reason: String },
}

/// Key-value persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    /// Store could not be opened
    #[error("Failed to open store at {path}: {reason}")]
    Open { path: PathBuf, reason: String },
}

/// Exercise catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Calories-per-rep must be a finite, non-negative number
    #[error("Invalid calories per rep for {exercise}: {value}")]
    InvalidCalories { exercise: String, value: f64 },

    /// Exercise name missing or blank
    #[error("Exercise name must not be empty")]
    EmptyName,

    /// Two entries share a name
    #[error("Duplicate exercise: {name}")]
    Duplicate { name: String },

    /// Lookup failed
    #[error("Exercise not found: {name}")]
    NotFound { name: String },

    /// Unknown target group
    #[error("Unknown target: {value}")]
    UnknownTarget { value: String },

    /// Catalog file could not be parsed
    #[error("Failed to parse catalog {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Repetition detector configuration errors
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Thresholds must leave a dead zone between them
    #[error("Rising threshold {rising} must be greater than falling threshold {falling}")]
    CollapsedBand { rising: f64, falling: f64 },

    /// Threshold outside the representable angle range
    #[error("Threshold {name}={value} outside 0..=180 degrees")]
    OutOfRange { name: String, value: f64 },
}

/// Feedback collaborator errors. These never abort a session.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Feedback device unavailable")]
    Unavailable,

    #[error("Feedback delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias for MoveAbility operations
pub type Result<T> = std::result::Result<T, MoveAbilityError>;

impl MoveAbilityError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MoveAbilityError::Storage(StorageError::Sqlite(_)) | MoveAbilityError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MoveAbilityError::Sensor(SensorError::Unavailable { .. }) => ErrorSeverity::Warning,
            MoveAbilityError::Feedback(_) => ErrorSeverity::Info,
            MoveAbilityError::Catalog(CatalogError::NotFound { .. }) => ErrorSeverity::Warning,
            MoveAbilityError::Storage(StorageError::Serialization { .. }) => ErrorSeverity::Warning,
            MoveAbilityError::Storage(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            MoveAbilityError::Sensor(SensorError::Unavailable { .. }) => {
                "Motion sensing is not available on this device. Reps will not be counted automatically."
                    .to_string()
            }
            MoveAbilityError::Catalog(CatalogError::NotFound { name }) => {
                format!("No exercise called \"{}\". Run `moveability exercises` to see the list.", name)
            }
            MoveAbilityError::Storage(StorageError::Open { path, .. }) => {
                format!("Unable to open progress data at {}. Please check your configuration.", path.display())
            }
            MoveAbilityError::Configuration(reason) => {
                format!("{}. Run `moveability config --list` to see the current settings.", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }

    /// Prefix for the message shown on the terminal
    pub fn label(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "error:",
            ErrorSeverity::Warning => "warning:",
            ErrorSeverity::Info => "note:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = MoveAbilityError::Sensor(SensorError::Unavailable {
            reason: "no accelerometer".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = MoveAbilityError::Feedback(FeedbackError::Unavailable);
        assert_eq!(err.severity(), ErrorSeverity::Info);

        let err: MoveAbilityError = CatalogError::NotFound {
            name: "Jumping Jacks".to_string(),
        }
        .into();
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);
        assert_eq!(err.severity().label(), "warning:");

        let err = MoveAbilityError::Configuration("Unknown configuration key: foo".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(err.severity().label(), "error:");
    }

    #[test]
    fn test_error_retryable() {
        let err = MoveAbilityError::Io(std::io::Error::new(std::io::ErrorKind::Other, "busy"));
        assert!(err.is_retryable());

        let err = MoveAbilityError::Configuration("bad".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err: MoveAbilityError = CatalogError::NotFound {
            name: "Jumping Jacks".to_string(),
        }
        .into();
        assert!(err.user_message().contains("Jumping Jacks"));

        let err: MoveAbilityError = SensorError::Unavailable {
            reason: "simulator".to_string(),
        }
        .into();
        assert!(err.user_message().contains("not available"));

        let err = MoveAbilityError::Configuration("Expected KEY=VALUE, got detector".to_string());
        assert!(err.user_message().starts_with("Expected KEY=VALUE"));
        assert!(err.user_message().contains("config --list"));
    }
}
