//! Constants and small numeric helpers shared by the estimator and integrator

use nalgebra::{ComplexField, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Standard gravity in m/s²
pub const GRAVITY_EARTH: f32 = 9.80665;

/// Scale from a nanosecond timestamp difference to seconds
pub const NANOS_TO_SECONDS: f32 = 1.0e-9;

/// Convert a signed nanosecond interval to seconds.
///
/// The interval is converted to `f32` before scaling, so the result carries
/// single precision from the start.
pub fn nanos_to_seconds(delta_nanos: i64) -> f32 {
    delta_nanos as f32 * NANOS_TO_SECONDS
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning `None` if the magnitude is zero or not finite
    fn try_unit(&self) -> Option<Vector3<f32>>;

    /// True when every component is finite
    fn all_finite(&self) -> bool;

    /// Sum of absolute component values (L1 norm)
    fn manhattan(&self) -> f32;
}

impl Vector3Ext for Vector3<f32> {
    fn try_unit(&self) -> Option<Vector3<f32>> {
        let magnitude = self.magnitude_squared().sqrt();
        if magnitude > 0.0 && magnitude.is_finite() {
            Some(*self / magnitude)
        } else {
            None
        }
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|component| component.is_finite())
    }

    fn manhattan(&self) -> f32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_to_seconds() {
        assert!((nanos_to_seconds(100_000_000) - 0.1).abs() < 1e-7);
        assert_eq!(nanos_to_seconds(0), 0.0);
        assert!(nanos_to_seconds(-5_000_000) < 0.0);
    }

    #[test]
    fn test_try_unit() {
        let v = Vector3::new(3.0f32, 4.0, 0.0);
        let unit = v.try_unit().unwrap();
        assert!((unit.magnitude() - 1.0).abs() < 1e-6);
        assert!((unit.x - 0.6).abs() < 1e-6);

        assert!(Vector3::<f32>::zeros().try_unit().is_none());
        assert!(Vector3::new(f32::NAN, 0.0, 1.0).try_unit().is_none());
    }

    #[test]
    fn test_manhattan_and_finite() {
        let v = Vector3::new(-1.5f32, 2.0, -0.5);
        assert!((v.manhattan() - 4.0).abs() < 1e-6);
        assert!(v.all_finite());
        assert!(!Vector3::new(0.0f32, f32::INFINITY, 0.0).all_finite());
    }
}
