//! Sensor calibration applied to samples before they reach the fusion cycle

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Accelerometer calibration
///
/// Applied as `misalignment * ((uncalibrated - offset) ∘ sensitivity)`.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use heading_reckoner::InertialCalibration;
///
/// let calibration = InertialCalibration {
///     offset: Vector3::new(0.1, -0.05, 0.2),
///     ..Default::default()
/// };
/// let corrected = calibration.apply(Vector3::new(0.1, -0.05, 10.0));
/// assert!((corrected.z - 9.8).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertialCalibration {
    /// 3x3 misalignment correction matrix
    pub misalignment: Matrix3<f32>,
    /// Per-axis sensitivity scale
    pub sensitivity: Vector3<f32>,
    /// Per-axis bias subtracted from the raw reading
    pub offset: Vector3<f32>,
}

impl Default for InertialCalibration {
    fn default() -> Self {
        Self {
            misalignment: Matrix3::identity(),
            sensitivity: Vector3::new(1.0, 1.0, 1.0),
            offset: Vector3::zeros(),
        }
    }
}

impl InertialCalibration {
    pub fn apply(&self, uncalibrated: Vector3<f32>) -> Vector3<f32> {
        self.misalignment * (uncalibrated - self.offset).component_mul(&self.sensitivity)
    }
}

/// Magnetometer hard and soft iron calibration
///
/// Applied as `soft_iron * (uncalibrated - hard_iron)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticCalibration {
    /// 3x3 soft iron correction matrix
    pub soft_iron: Matrix3<f32>,
    /// Hard iron offset in µT
    pub hard_iron: Vector3<f32>,
}

impl Default for MagneticCalibration {
    fn default() -> Self {
        Self {
            soft_iron: Matrix3::identity(),
            hard_iron: Vector3::zeros(),
        }
    }
}

impl MagneticCalibration {
    pub fn apply(&self, uncalibrated: Vector3<f32>) -> Vector3<f32> {
        self.soft_iron * (uncalibrated - self.hard_iron)
    }
}
