//! Core types and settings for the heading and dead-reckoning pipeline

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::calibration::{InertialCalibration, MagneticCalibration};
use crate::error::{FusionError, FusionResult};
use crate::math::GRAVITY_EARTH;

/// Which sensor produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Magnetometer,
}

impl core::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorKind::Accelerometer => f.write_str("accelerometer"),
            SensorKind::Magnetometer => f.write_str("magnetometer"),
        }
    }
}

/// One reading delivered by the sensor source
///
/// `timestamp` is a monotonic clock value in nanoseconds. Within a session
/// timestamps are expected to be non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Axis values in device coordinates (m/s² or µT)
    pub values: Vector3<f32>,
    /// Source sensor
    pub kind: SensorKind,
    /// Monotonic timestamp in nanoseconds
    pub timestamp: i64,
}

impl SensorSample {
    pub fn new(kind: SensorKind, values: Vector3<f32>, timestamp: i64) -> Self {
        Self {
            values,
            kind,
            timestamp,
        }
    }

    /// Accelerometer sample in m/s²
    pub fn accelerometer(values: Vector3<f32>, timestamp: i64) -> Self {
        Self::new(SensorKind::Accelerometer, values, timestamp)
    }

    /// Magnetometer sample in µT
    pub fn magnetometer(values: Vector3<f32>, timestamp: i64) -> Self {
        Self::new(SensorKind::Magnetometer, values, timestamp)
    }
}

/// How gravity is removed from the accelerometer before integration
///
/// # Variants
/// - **VerticalAxis**: subtract the gravity constant from the device Z axis.
///   Correct only while the device lies flat, face up.
/// - **EveryAxis**: subtract the gravity constant from X, Y and Z alike.
///   Wrong whenever the device is not level, kept for comparison.
/// - **Rotated**: rotate world gravity into the device frame using the
///   cycle's rotation matrix and subtract the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityCompensation {
    #[default]
    VerticalAxis,
    EveryAxis,
    Rotated,
}

/// Pipeline settings
///
/// # Example
/// ```
/// use heading_reckoner::{FusionSettings, GravityCompensation};
///
/// let settings = FusionSettings {
///     movement_threshold: 0.5,
///     gravity_compensation: GravityCompensation::Rotated,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Gravity magnitude in m/s²
    pub gravity: f32,
    /// Per-axis position magnitude below which the position is forced to zero
    pub movement_threshold: f32,
    /// Gravity removal strategy
    pub gravity_compensation: GravityCompensation,
    /// Accelerometer magnitude, as a fraction of `gravity`, below which the
    /// device is considered in free fall and no orientation is produced
    pub free_fall_ratio: f32,
    /// Minimum magnitude of `magnetometer × accelerometer` for a usable
    /// heading. Typical values for Earth's field are 0.1 to 100 (in µT·m/s²).
    pub min_horizontal_field: f32,
    /// Optional correction applied to accelerometer samples as they arrive
    pub accelerometer_calibration: Option<InertialCalibration>,
    /// Optional hard/soft iron correction applied to magnetometer samples
    pub magnetometer_calibration: Option<MagneticCalibration>,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_EARTH,
            movement_threshold: 1.5,
            gravity_compensation: GravityCompensation::default(),
            free_fall_ratio: 0.1,
            min_horizontal_field: 0.1,
            accelerometer_calibration: None,
            magnetometer_calibration: None,
        }
    }
}

impl FusionSettings {
    /// Check that every threshold is finite and in range
    pub fn validate(&self) -> FusionResult<()> {
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(FusionError::InvalidSettings("gravity must be positive"));
        }
        if !(self.movement_threshold.is_finite() && self.movement_threshold >= 0.0) {
            return Err(FusionError::InvalidSettings(
                "movement_threshold must be non-negative",
            ));
        }
        if !(self.free_fall_ratio.is_finite() && (0.0..1.0).contains(&self.free_fall_ratio)) {
            return Err(FusionError::InvalidSettings(
                "free_fall_ratio must be in [0, 1)",
            ));
        }
        if !(self.min_horizontal_field.is_finite() && self.min_horizontal_field > 0.0) {
            return Err(FusionError::InvalidSettings(
                "min_horizontal_field must be positive",
            ));
        }
        Ok(())
    }
}

/// Result of one successful fusion cycle, handed to the display layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedOutput {
    /// Compass heading in degrees, -180 to 180, 0 = magnetic north
    pub azimuth_degrees: f32,
    /// Rotation about the device X axis in degrees
    pub pitch_degrees: f32,
    /// Rotation about the device Y axis in degrees
    pub roll_degrees: f32,
    /// Dead-reckoned position after threshold suppression
    pub position: Vector3<f32>,
    /// Seconds since the previous successful cycle
    pub delta_time: f32,
    /// `|x| + |y| + |z|` of `position`
    pub total_movement: f32,
    /// Timestamp of the sample that completed the pair, in nanoseconds
    pub timestamp: i64,
}

/// Pipeline diagnostics
///
/// Running counts of how each fed sample was resolved since the last
/// `start`. Useful for spotting a badly placed magnetometer or a clock
/// that jumps backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Cycles that produced a [`FusedOutput`]
    pub fused: u32,
    /// Samples that left the pair incomplete
    pub waiting: u32,
    /// Cycles skipped because no rotation matrix could be built
    pub degenerate: u32,
    /// Cycles skipped because time went backwards
    pub non_monotonic: u32,
    /// Samples rejected while the session was stopped
    pub rejected: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FusionSettings::default();
        assert_eq!(settings.gravity, 9.80665);
        assert_eq!(settings.movement_threshold, 1.5);
        assert_eq!(
            settings.gravity_compensation,
            GravityCompensation::VerticalAxis
        );
        assert!(settings.accelerometer_calibration.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let bad_gravity = FusionSettings {
            gravity: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_gravity.validate(),
            Err(FusionError::InvalidSettings(_))
        ));

        let bad_threshold = FusionSettings {
            movement_threshold: -1.0,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());

        let nan_field = FusionSettings {
            min_horizontal_field: f32::NAN,
            ..Default::default()
        };
        assert!(nan_field.validate().is_err());

        let zero_threshold = FusionSettings {
            movement_threshold: 0.0,
            ..Default::default()
        };
        assert!(zero_threshold.validate().is_ok());
    }

    #[test]
    fn test_sample_constructors() {
        let accel = SensorSample::accelerometer(Vector3::new(0.0, 0.0, 9.8), 10);
        assert_eq!(accel.kind, SensorKind::Accelerometer);
        assert_eq!(accel.timestamp, 10);

        let mag = SensorSample::magnetometer(Vector3::new(0.0, 20.0, -40.0), 11);
        assert_eq!(mag.kind, SensorKind::Magnetometer);
        assert_eq!(mag.values.y, 20.0);
    }
}
