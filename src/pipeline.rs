//! Sample buffering and session control around the estimator and integrator

use log::{debug, trace, warn};
use nalgebra::Vector3;

use crate::error::{FusionError, FusionResult};
use crate::orientation::Orientation;
use crate::reckoning::DeadReckoner;
use crate::types::{CycleStats, FusedOutput, FusionSettings, SensorKind, SensorSample};

/// Accelerometer and magnetometer fusion pipeline
///
/// Owns all state of a sensing session. The host calls [`feed`](Self::feed)
/// once per sensor event, in arrival order, on a single thread. A
/// [`FusedOutput`] comes back whenever a fresh accelerometer/magnetometer pair
/// completes a fusion cycle; after each successful cycle both buffered
/// readings are cleared, so the next cycle waits for a new pair.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_reckoner::{FusionPipeline, SensorSample};
///
/// let mut pipeline = FusionPipeline::new(0);
///
/// let accel = SensorSample::accelerometer(Vector3::new(0.0, 0.0, 9.80665), 20_000_000);
/// let mag = SensorSample::magnetometer(Vector3::new(0.0, 22.0, -42.0), 20_000_000);
///
/// assert!(pipeline.feed(accel).is_none()); // waiting for the magnetometer
/// let output = pipeline.feed(mag).unwrap();
///
/// assert!(output.azimuth_degrees.abs() < 1e-3); // facing north
/// assert!((output.delta_time - 0.02).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct FusionPipeline {
    settings: FusionSettings,
    reckoner: DeadReckoner,
    latest_acceleration: Option<Vector3<f32>>,
    latest_magnetic_field: Option<Vector3<f32>>,
    running: bool,
    stats: CycleStats,
}

impl FusionPipeline {
    /// Create a pipeline with default settings and start a session at `start_timestamp`
    pub fn new(start_timestamp: i64) -> Self {
        Self::from_valid_settings(FusionSettings::default(), start_timestamp)
    }

    /// Create a pipeline with the given settings and start a session at `start_timestamp`
    pub fn with_settings(settings: FusionSettings, start_timestamp: i64) -> FusionResult<Self> {
        settings.validate()?;
        Ok(Self::from_valid_settings(settings, start_timestamp))
    }

    fn from_valid_settings(settings: FusionSettings, start_timestamp: i64) -> Self {
        Self {
            settings,
            reckoner: DeadReckoner::new(settings, start_timestamp),
            latest_acceleration: None,
            latest_magnetic_field: None,
            running: true,
            stats: CycleStats::default(),
        }
    }

    /// Start a fresh session: zero velocity and position, drop buffered
    /// readings and seed the clock with `timestamp`
    pub fn start(&mut self, timestamp: i64) {
        self.reckoner.reset(timestamp);
        self.latest_acceleration = None;
        self.latest_magnetic_field = None;
        self.stats = CycleStats::default();
        self.running = true;
        debug!("sensing session started at {} ns", timestamp);
    }

    /// Stop accepting samples until the next [`start`](Self::start)
    ///
    /// Velocity, position and buffered readings are left as they are.
    pub fn stop(&mut self) {
        self.running = false;
        debug!("sensing session stopped after {} fused cycles", self.stats.fused);
    }

    /// Re-seed the clock after a pause, keeping velocity and position
    pub fn reseed(&mut self, timestamp: i64) {
        self.reckoner.reseed(timestamp);
        self.running = true;
        debug!("sensing session resumed at {} ns", timestamp);
    }

    /// Update pipeline settings
    pub fn set_settings(&mut self, settings: FusionSettings) -> FusionResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.reckoner.set_settings(settings);
        Ok(())
    }

    pub fn settings(&self) -> &FusionSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.reckoner.velocity()
    }

    pub fn position(&self) -> Vector3<f32> {
        self.reckoner.position()
    }

    pub fn previous_timestamp(&self) -> i64 {
        self.reckoner.previous_timestamp()
    }

    /// Last accelerometer reading not yet consumed by a fusion cycle
    pub fn latest_acceleration(&self) -> Option<Vector3<f32>> {
        self.latest_acceleration
    }

    /// Last magnetometer reading not yet consumed by a fusion cycle
    pub fn latest_magnetic_field(&self) -> Option<Vector3<f32>> {
        self.latest_magnetic_field
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Feed one sensor event, returning output when a fusion cycle completes
    ///
    /// Every reason for not producing output is logged and counted in
    /// [`stats`](Self::stats); use [`try_feed`](Self::try_feed) to inspect it.
    pub fn feed(&mut self, sample: SensorSample) -> Option<FusedOutput> {
        match self.try_feed(sample) {
            Ok(output) => Some(output),
            Err(FusionError::InsufficientData { missing }) => {
                trace!("{} sample buffered, waiting for {}", sample.kind, missing);
                None
            }
            Err(error @ FusionError::NonMonotonicTime { .. }) => {
                warn!("cycle at {} ns skipped: {}", sample.timestamp, error);
                None
            }
            Err(error) => {
                debug!("cycle at {} ns skipped: {}", sample.timestamp, error);
                None
            }
        }
    }

    /// Feed a raw accelerometer reading in m/s²
    pub fn feed_accelerometer(&mut self, values: [f32; 3], timestamp: i64) -> Option<FusedOutput> {
        self.feed(SensorSample::accelerometer(Vector3::from(values), timestamp))
    }

    /// Feed a raw magnetometer reading in µT
    pub fn feed_magnetometer(&mut self, values: [f32; 3], timestamp: i64) -> Option<FusedOutput> {
        self.feed(SensorSample::magnetometer(Vector3::from(values), timestamp))
    }

    /// Feed one sensor event, returning why no output was produced
    ///
    /// On any error velocity, position and the clock are untouched. Buffered
    /// readings are kept on a degenerate orientation or a backwards clock, so
    /// the next sample of either kind retries the cycle with fresh data.
    pub fn try_feed(&mut self, sample: SensorSample) -> FusionResult<FusedOutput> {
        if !self.running {
            self.stats.rejected += 1;
            return Err(FusionError::Stopped);
        }

        self.buffer(sample);

        let (accelerometer, magnetometer) =
            match (self.latest_acceleration, self.latest_magnetic_field) {
                (Some(accelerometer), Some(magnetometer)) => (accelerometer, magnetometer),
                (None, _) => return self.wait_for(SensorKind::Accelerometer),
                (_, None) => return self.wait_for(SensorKind::Magnetometer),
            };

        let orientation = Orientation::from_readings(accelerometer, magnetometer, &self.settings)
            .inspect_err(|_| self.stats.degenerate += 1)?;

        let step = self
            .reckoner
            .step(accelerometer, sample.timestamp, Some(&orientation))
            .inspect_err(|_| self.stats.non_monotonic += 1)?;

        self.latest_acceleration = None;
        self.latest_magnetic_field = None;
        self.stats.fused += 1;

        Ok(FusedOutput {
            azimuth_degrees: orientation.azimuth_degrees(),
            pitch_degrees: orientation.pitch_degrees(),
            roll_degrees: orientation.roll_degrees(),
            position: step.position,
            delta_time: step.delta_time,
            total_movement: step.total_movement,
            timestamp: sample.timestamp,
        })
    }

    fn buffer(&mut self, sample: SensorSample) {
        match sample.kind {
            SensorKind::Accelerometer => {
                let values = match &self.settings.accelerometer_calibration {
                    Some(calibration) => calibration.apply(sample.values),
                    None => sample.values,
                };
                self.latest_acceleration = Some(values);
            }
            SensorKind::Magnetometer => {
                let values = match &self.settings.magnetometer_calibration {
                    Some(calibration) => calibration.apply(sample.values),
                    None => sample.values,
                };
                self.latest_magnetic_field = Some(values);
            }
        }
    }

    fn wait_for(&mut self, missing: SensorKind) -> FusionResult<FusedOutput> {
        self.stats.waiting += 1;
        Err(FusionError::InsufficientData { missing })
    }
}
