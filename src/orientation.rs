//! Tilt-compensated orientation from an accelerometer and magnetometer pair
//!
//! The rotation matrix maps device coordinates to a world frame whose axes
//! point East, North and Up. Its rows are the world axes expressed in device
//! coordinates:
//!
//! ```text
//! H = E × A          (east, horizontal and perpendicular to the field)
//! M = Â × Ĥ          (magnetic north, horizontal)
//! R = [ Ĥ ; M ; Â ]
//! ```
//!
//! Azimuth is the heading of the device Y axis, clockwise from magnetic north.

use nalgebra::{ComplexField, Matrix3, RealField, Rotation3, Vector3};

use crate::error::{Degeneracy, FusionError, FusionResult};
use crate::math::{RAD_TO_DEG, Vector3Ext};
use crate::types::FusionSettings;

/// Device orientation derived from one reading pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    rotation: Rotation3<f32>,
    azimuth: f32,
    pitch: f32,
    roll: f32,
}

impl Orientation {
    /// Build the orientation for one accelerometer/magnetometer pair
    ///
    /// Fails with [`FusionError::DegenerateOrientation`] when the device is in
    /// free fall, the field is nearly parallel to gravity (close to a magnetic
    /// pole, or no field at all), or a reading is not finite.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use heading_reckoner::{FusionSettings, Orientation};
    ///
    /// let accel = Vector3::new(0.0, 0.0, 9.81);  // flat, screen up
    /// let mag = Vector3::new(-20.0, 0.0, -40.0); // north is to the device's left
    /// let orientation = Orientation::from_readings(accel, mag, &FusionSettings::default()).unwrap();
    /// assert!((orientation.azimuth_degrees() - 90.0).abs() < 1e-3); // facing east
    /// ```
    pub fn from_readings(
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
        settings: &FusionSettings,
    ) -> FusionResult<Self> {
        let matrix = rotation_matrix(accelerometer, magnetometer, settings)?;

        // Row 0 = east, row 1 = north, row 2 = up, each in device coordinates
        let azimuth = RealField::atan2(matrix[(0, 1)], matrix[(1, 1)]);
        let pitch = (-matrix[(2, 1)]).clamp(-1.0, 1.0).asin();
        let roll = RealField::atan2(-matrix[(2, 0)], matrix[(2, 2)]);

        Ok(Self {
            rotation: Rotation3::from_matrix_unchecked(matrix),
            azimuth,
            pitch,
            roll,
        })
    }

    /// Rotation from device coordinates to East-North-Up
    pub fn rotation(&self) -> Rotation3<f32> {
        self.rotation
    }

    /// Rotate a device-frame vector into the world frame
    pub fn world_from_device(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.rotation * vector
    }

    /// Rotate a world-frame vector into the device frame
    pub fn device_from_world(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.rotation.inverse_transform_vector(&vector)
    }

    /// Heading in degrees, -180 to 180, 0 = magnetic north, 90 = east
    pub fn azimuth_degrees(&self) -> f32 {
        (self.azimuth * RAD_TO_DEG).clamp(-180.0, 180.0)
    }

    /// Pitch in degrees, -90 to 90
    pub fn pitch_degrees(&self) -> f32 {
        self.pitch * RAD_TO_DEG
    }

    /// Roll in degrees, -180 to 180
    pub fn roll_degrees(&self) -> f32 {
        self.roll * RAD_TO_DEG
    }
}

/// Compute the device-to-world rotation matrix for one reading pair
pub fn rotation_matrix(
    accelerometer: Vector3<f32>,
    magnetometer: Vector3<f32>,
    settings: &FusionSettings,
) -> FusionResult<Matrix3<f32>> {
    if !accelerometer.all_finite() || !magnetometer.all_finite() {
        return Err(FusionError::DegenerateOrientation(Degeneracy::NonFinite));
    }

    let free_fall_limit = settings.free_fall_ratio * settings.gravity;
    if accelerometer.magnitude_squared() < free_fall_limit * free_fall_limit {
        return Err(FusionError::DegenerateOrientation(Degeneracy::FreeFall));
    }

    let east = magnetometer.cross(&accelerometer);
    let east_magnitude = east.magnitude_squared().sqrt();
    if east_magnitude < settings.min_horizontal_field {
        return Err(FusionError::DegenerateOrientation(
            Degeneracy::WeakHorizontalField,
        ));
    }
    let east = east / east_magnitude;

    let up = accelerometer
        .try_unit()
        .ok_or(FusionError::DegenerateOrientation(Degeneracy::FreeFall))?;
    let north = up.cross(&east);

    Ok(Matrix3::from_rows(&[
        east.transpose(),
        north.transpose(),
        up.transpose(),
    ]))
}
