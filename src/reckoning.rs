//! Dead reckoning by double integration of linear acceleration
//!
//! Each step removes gravity from the accelerometer reading, integrates
//! velocity and then position with semi-implicit Euler, and zeroes any
//! position axis whose magnitude is below the movement threshold. The
//! threshold masks the drift that double integration of a noisy signal
//! inevitably accumulates.

use log::trace;
use nalgebra::Vector3;

use crate::error::{FusionError, FusionResult};
use crate::math::{Vector3Ext, nanos_to_seconds};
use crate::orientation::Orientation;
use crate::types::{FusionSettings, GravityCompensation};

/// Outcome of a single integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReckoningStep {
    /// Position after threshold suppression
    pub position: Vector3<f32>,
    /// Elapsed seconds used for this step
    pub delta_time: f32,
    /// `|x| + |y| + |z|` of `position`
    pub total_movement: f32,
}

/// Velocity and position integrator
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_reckoner::{DeadReckoner, FusionSettings};
///
/// let mut reckoner = DeadReckoner::new(FusionSettings::default(), 0);
///
/// // 2 m/s² upwards on top of gravity, for 100 ms
/// let accel = Vector3::new(0.0, 0.0, 9.80665 + 2.0);
/// let step = reckoner.step(accel, 100_000_000, None).unwrap();
///
/// assert!((reckoner.velocity().z - 0.2).abs() < 1e-5);
/// assert_eq!(step.position.z, 0.0); // 0.02 m is below the 1.5 m threshold
/// ```
#[derive(Debug, Clone)]
pub struct DeadReckoner {
    settings: FusionSettings,
    velocity: Vector3<f32>,
    position: Vector3<f32>,
    previous_timestamp: i64,
}

impl DeadReckoner {
    /// Create an integrator at rest, seeded with the session start time
    pub fn new(settings: FusionSettings, start_timestamp: i64) -> Self {
        Self {
            settings,
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            previous_timestamp: start_timestamp,
        }
    }

    /// Zero velocity and position and seed the timestamp
    pub fn reset(&mut self, start_timestamp: i64) {
        self.velocity = Vector3::zeros();
        self.position = Vector3::zeros();
        self.previous_timestamp = start_timestamp;
    }

    /// Seed the timestamp without touching velocity or position
    ///
    /// Call after a pause so the next step does not integrate across it.
    pub fn reseed(&mut self, timestamp: i64) {
        self.previous_timestamp = timestamp;
    }

    pub fn set_settings(&mut self, settings: FusionSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &FusionSettings {
        &self.settings
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn previous_timestamp(&self) -> i64 {
        self.previous_timestamp
    }

    /// Seconds elapsed since the last successful step, or an error if time went backwards
    pub fn delta_time(&self, timestamp: i64) -> FusionResult<f32> {
        let delta_nanos = timestamp.saturating_sub(self.previous_timestamp);
        if delta_nanos < 0 {
            return Err(FusionError::NonMonotonicTime { delta_nanos });
        }
        Ok(nanos_to_seconds(delta_nanos))
    }

    /// Remove gravity from an accelerometer reading
    ///
    /// `orientation` is only used by [`GravityCompensation::Rotated`]; without
    /// it that mode falls back to the vertical-axis model.
    pub fn linear_acceleration(
        &self,
        accelerometer: Vector3<f32>,
        orientation: Option<&Orientation>,
    ) -> Vector3<f32> {
        let gravity = self.settings.gravity;
        match (self.settings.gravity_compensation, orientation) {
            (GravityCompensation::EveryAxis, _) => accelerometer.add_scalar(-gravity),
            (GravityCompensation::Rotated, Some(orientation)) => {
                accelerometer - orientation.device_from_world(Vector3::new(0.0, 0.0, gravity))
            }
            (GravityCompensation::VerticalAxis, _) | (GravityCompensation::Rotated, None) => {
                accelerometer - Vector3::new(0.0, 0.0, gravity)
            }
        }
    }

    /// Integrate one accelerometer reading taken at `timestamp`
    ///
    /// On [`FusionError::NonMonotonicTime`] nothing is modified.
    pub fn step(
        &mut self,
        accelerometer: Vector3<f32>,
        timestamp: i64,
        orientation: Option<&Orientation>,
    ) -> FusionResult<ReckoningStep> {
        let delta_time = self.delta_time(timestamp)?;
        let linear_acceleration = self.linear_acceleration(accelerometer, orientation);

        // Semi-implicit Euler: position uses the freshly updated velocity
        self.velocity += linear_acceleration * delta_time;
        self.position += self.velocity * delta_time;

        let threshold = self.settings.movement_threshold;
        for axis in self.position.iter_mut() {
            if axis.abs() < threshold {
                *axis = 0.0;
            }
        }

        self.previous_timestamp = timestamp;

        trace!(
            "reckoning step dt={} a={:?} v={:?} p={:?}",
            delta_time,
            linear_acceleration.as_slice(),
            self.velocity.as_slice(),
            self.position.as_slice()
        );

        Ok(ReckoningStep {
            position: self.position,
            delta_time,
            total_movement: self.position.manhattan(),
        })
    }
}
