// Library interface for MoveAbility modules
// This allows integration tests and benches to access the core functionality

pub mod angle;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod logging;
pub mod models;
pub mod rep_detector;
pub mod sensor;
pub mod session;
pub mod storage;
pub mod streak;

// Re-export commonly used types for convenience
pub use models::*;
pub use angle::AngleEstimator;
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::AppConfig;
pub use rep_detector::{RepDetector, RepDetectorState, RepPhase, RepThresholds};
pub use sensor::{MotionSensor, ScriptedSensor, SimulatedSensor, UnavailableSensor};
pub use session::{run_session, ExerciseSession, RepEvent, SessionStats, SessionSummary};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use streak::{DayGap, StreakRepository, StreakState, StreakStatus, StreakTracker};
pub use error::{MoveAbilityError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
