use csv::ReaderBuilder;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SensorError;
use crate::models::MotionSample;

/// Default delivery interval of the motion sensor
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Receiving end of a running sensor
pub type SampleStream = mpsc::UnboundedReceiver<MotionSample>;

/// Source of accelerometer samples for an exercise session.
///
/// `start` hands back a channel the session pulls from. After `stop` no new
/// samples are produced, but anything already queued may still arrive.
pub trait MotionSensor {
    fn is_available(&self) -> bool;

    fn start(&mut self, interval: Duration) -> Result<SampleStream, SensorError>;

    fn stop(&mut self);
}

/// Push `samples` into a fresh channel, pacing them on a tokio interval
/// when `interval` is non-zero. Must be called inside a tokio runtime when
/// paced.
fn replay(samples: Vec<MotionSample>, interval: Duration) -> (SampleStream, Option<JoinHandle<()>>) {
    let (tx, rx) = mpsc::unbounded_channel();

    if interval.is_zero() {
        for sample in samples {
            if tx.send(sample).is_err() {
                break;
            }
        }
        return (rx, None);
    }

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        for sample in samples {
            ticker.tick().await;
            if tx.send(sample).is_err() {
                tracing::debug!("Sample receiver dropped, ending replay");
                break;
            }
        }
    });

    (rx, Some(handle))
}

/// Replays a fixed list of samples, e.g. from a recorded CSV file
pub struct ScriptedSensor {
    samples: Vec<MotionSample>,
    paced: bool,
    task: Option<JoinHandle<()>>,
    running: bool,
}

impl ScriptedSensor {
    /// Deliver every sample immediately on start
    pub fn new(samples: Vec<MotionSample>) -> Self {
        Self {
            samples,
            paced: false,
            task: None,
            running: false,
        }
    }

    /// Deliver one sample per sensor interval
    pub fn paced(samples: Vec<MotionSample>) -> Self {
        Self {
            paced: true,
            ..Self::new(samples)
        }
    }

    /// Toggle pacing after construction
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Load samples from a CSV file with `x,y,timestamp_ms` columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, SensorError> {
        let path = path.as_ref();
        let sample_file_error = |reason: String| SensorError::SampleFile {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| sample_file_error(e.to_string()))?;

        let samples = reader
            .deserialize::<MotionSample>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sample_file_error(e.to_string()))?;

        tracing::debug!(count = samples.len(), path = %path.display(), "Loaded recorded samples");
        Ok(Self::new(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl MotionSensor for ScriptedSensor {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, interval: Duration) -> Result<SampleStream, SensorError> {
        if self.running {
            return Err(SensorError::AlreadyRunning);
        }
        let interval = if self.paced { interval } else { Duration::ZERO };
        let (rx, task) = replay(self.samples.clone(), interval);
        self.task = task;
        self.running = true;
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.running = false;
    }
}

/// Synthetic seated arm raises, for demos and devices without hardware
pub struct SimulatedSensor {
    reps: u32,
    peak_deg: f64,
    samples_per_rep: u32,
    rest_samples: u32,
    task: Option<JoinHandle<()>>,
    running: bool,
}

impl SimulatedSensor {
    pub fn new(reps: u32) -> Self {
        Self {
            reps,
            peak_deg: 80.0,
            samples_per_rep: 20,
            rest_samples: 5,
            task: None,
            running: false,
        }
    }

    /// Highest tilt reached on each raise
    pub fn with_peak(mut self, peak_deg: f64) -> Self {
        self.peak_deg = peak_deg;
        self
    }

    /// Generate the full sample sequence for the given interval.
    ///
    /// Each rep sweeps `0 -> peak -> 0` as a half sine, preceded by a short
    /// rest so the detector starts from a settled position.
    pub fn generate(&self, interval: Duration) -> Vec<MotionSample> {
        let step_ms = interval.as_millis() as u64;
        let mut samples = Vec::new();
        let mut tick: u64 = 0;

        let mut push = |angle_deg: f64, samples: &mut Vec<MotionSample>| {
            let radians = angle_deg.to_radians();
            samples.push(MotionSample::new(radians.cos(), radians.sin(), tick * step_ms));
            tick += 1;
        };

        for _ in 0..self.rest_samples {
            push(0.0, &mut samples);
        }

        for _ in 0..self.reps {
            for i in 0..=self.samples_per_rep {
                let phase = std::f64::consts::PI * f64::from(i) / f64::from(self.samples_per_rep);
                push(self.peak_deg * phase.sin(), &mut samples);
            }
            for _ in 0..self.rest_samples {
                push(0.0, &mut samples);
            }
        }

        samples
    }
}

impl MotionSensor for SimulatedSensor {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, interval: Duration) -> Result<SampleStream, SensorError> {
        if self.running {
            return Err(SensorError::AlreadyRunning);
        }
        let (rx, task) = replay(self.generate(interval), interval);
        self.task = task;
        self.running = true;
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.running = false;
    }
}

/// Sensor for hardware without motion support
pub struct UnavailableSensor {
    reason: String,
}

impl UnavailableSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl MotionSensor for UnavailableSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _interval: Duration) -> Result<SampleStream, SensorError> {
        Err(SensorError::Unavailable {
            reason: self.reason.clone(),
        })
    }

    fn stop(&mut self) {}
}

impl<S: MotionSensor + ?Sized> MotionSensor for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn start(&mut self, interval: Duration) -> Result<SampleStream, SensorError> {
        (**self).start(interval)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
