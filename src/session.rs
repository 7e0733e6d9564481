//! Exercise session: rep accounting and the sample-consuming loop.
//!
//! A session owns its detector state and stats exclusively. Once closed it
//! discards every sample, so a late delivery from the sensor can never
//! change the final result.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::angle::AngleEstimator;
use crate::error::SensorError;
use crate::feedback::RepFeedback;
use crate::models::{Angle, Exercise, MotionSample};
use crate::rep_detector::{RepDetector, RepDetectorState};
use crate::sensor::MotionSensor;

/// Rep count and energy accounting for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Confirmed repetitions so far
    pub rep_count: u32,

    /// Energy per repetition (kcal), taken from the catalog entry
    pub calories_per_rep: f64,
}

impl SessionStats {
    pub fn new(calories_per_rep: f64) -> Self {
        SessionStats {
            rep_count: 0,
            calories_per_rep,
        }
    }

    /// Account for one confirmed repetition
    #[must_use]
    pub fn on_rep_event(self) -> Self {
        SessionStats {
            rep_count: self.rep_count.saturating_add(1),
            ..self
        }
    }

    /// Unrounded `rep_count * calories_per_rep`
    pub fn calories_burned(&self) -> f64 {
        f64::from(self.rep_count) * self.calories_per_rep
    }

    /// Zero the count, keeping the per-rep rate
    #[must_use]
    pub fn reset(self) -> Self {
        SessionStats::new(self.calories_per_rep)
    }
}

/// Emitted once per confirmed repetition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepEvent {
    /// 1-based index of this rep in the session
    pub rep_number: u32,

    /// Angle of the sample that crossed the rising threshold
    pub angle: Angle,

    /// Sensor timestamp of that sample
    pub timestamp_ms: u64,
}

/// Final outcome of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub exercise: String,
    pub rep_count: u32,
    pub calories_burned: f64,

    /// Samples that arrived after the session was closed
    pub discarded_samples: u32,

    /// Samples with a non-finite axis
    pub invalid_samples: u32,

    /// True when rep detection was disabled for lack of a sensor
    pub manual_mode: bool,
}

/// One attempt at an exercise
pub struct ExerciseSession<F: RepFeedback> {
    id: Uuid,
    exercise: Exercise,
    detector: RepDetector,
    state: RepDetectorState,
    stats: SessionStats,
    feedback: F,
    closed: bool,
    manual_mode: bool,
    discarded_samples: u32,
    invalid_samples: u32,
}

impl<F: RepFeedback> ExerciseSession<F> {
    pub fn new(exercise: Exercise, detector: RepDetector, feedback: F) -> Self {
        let stats = SessionStats::new(exercise.calories_per_rep);
        ExerciseSession {
            id: Uuid::new_v4(),
            exercise,
            detector,
            state: RepDetectorState::default(),
            stats,
            feedback,
            closed: false,
            manual_mode: false,
            discarded_samples: 0,
            invalid_samples: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn detector_state(&self) -> RepDetectorState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_manual_mode(&self) -> bool {
        self.manual_mode
    }

    /// Disable rep detection; the user tracks reps themselves
    pub fn enter_manual_mode(&mut self) {
        self.manual_mode = true;
    }

    /// Run one sample through angle estimation, detection and accounting
    pub fn handle_sample(&mut self, sample: MotionSample) -> Option<RepEvent> {
        if self.closed {
            self.discarded_samples += 1;
            tracing::debug!(timestamp_ms = sample.timestamp_ms, "Discarding sample after close");
            return None;
        }

        if self.manual_mode {
            return None;
        }

        if !sample.is_finite() {
            self.invalid_samples += 1;
            tracing::trace!(?sample, "Ignoring non-finite sample");
            return None;
        }

        let angle = AngleEstimator::estimate(&sample);
        let (next, fired) = self.detector.consume(angle, self.state);
        self.state = next;

        if !fired {
            return None;
        }

        self.stats = self.stats.on_rep_event();
        let event = RepEvent {
            rep_number: self.stats.rep_count,
            angle,
            timestamp_ms: sample.timestamp_ms,
        };

        if let Err(e) = self.feedback.rep_completed(event.rep_number) {
            tracing::debug!(error = %e, "Rep feedback failed");
        }

        tracing::debug!(
            rep = event.rep_number,
            angle = event.angle,
            timestamp_ms = event.timestamp_ms,
            "Rep completed"
        );

        Some(event)
    }

    /// Stop accepting samples
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Start over from the results screen with the same exercise
    pub fn retry(&mut self) {
        self.id = Uuid::new_v4();
        self.state = RepDetectorState::default();
        self.stats = self.stats.reset();
        self.closed = false;
        self.discarded_samples = 0;
        self.invalid_samples = 0;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            exercise: self.exercise.name.clone(),
            rep_count: self.stats.rep_count,
            calories_burned: self.stats.calories_burned(),
            discarded_samples: self.discarded_samples,
            invalid_samples: self.invalid_samples,
            manual_mode: self.manual_mode,
        }
    }
}

/// Drive `session` from `sensor` until `stop` resolves or the sensor
/// stream ends.
///
/// The sensor is stopped before the session is closed; samples still queued
/// at that point go through the discard path. A sensor that fails to start
/// puts the session in manual mode and the loop just waits for `stop`.
pub async fn run_session<F, S, Fut>(
    session: &mut ExerciseSession<F>,
    sensor: &mut S,
    interval: Duration,
    stop: Fut,
) -> SessionSummary
where
    F: RepFeedback,
    S: MotionSensor + ?Sized,
    Fut: Future<Output = ()>,
{
    let span = tracing::info_span!(
        "exercise_session",
        session_id = %session.id(),
        exercise = %session.exercise().name
    );

    async move {
        tokio::pin!(stop);

        let mut stream = match sensor.start(interval) {
            Ok(rx) => Some(rx),
            Err(SensorError::Unavailable { reason }) => {
                tracing::warn!(%reason, "Motion sensor unavailable, starting in manual mode");
                session.enter_manual_mode();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Motion sensor failed to start, starting in manual mode");
                session.enter_manual_mode();
                None
            }
        };

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            manual_mode = session.is_manual_mode(),
            "Session started"
        );

        match stream.as_mut() {
            Some(rx) => loop {
                tokio::select! {
                    biased;
                    _ = &mut stop => {
                        tracing::debug!("Stop requested");
                        break;
                    }
                    next = rx.recv() => match next {
                        Some(sample) => {
                            session.handle_sample(sample);
                        }
                        None => {
                            tracing::debug!("Sensor stream ended");
                            break;
                        }
                    }
                }
            },
            None => (&mut stop).await,
        }

        sensor.stop();
        session.close();

        if let Some(rx) = stream.as_mut() {
            rx.close();
            while let Ok(sample) = rx.try_recv() {
                session.handle_sample(sample);
            }
        }

        let summary = session.summary();
        tracing::info!(
            reps = summary.rep_count,
            calories = summary.calories_burned,
            discarded = summary.discarded_samples,
            invalid = summary.invalid_samples,
            "Session finished"
        );
        summary
    }
    .instrument(span)
    .await
}
