#![no_std]

//! Heading Reckoner - compass heading and dead-reckoned position from an
//! accelerometer and a magnetometer
//!
//! The crate is the computational core of a live heading and movement
//! display. It fuses two asynchronous sensor streams into a tilt-compensated
//! azimuth, integrates linear acceleration twice to track displacement, and
//! zeroes small position values so drift does not dominate the display.
//!
//! # Features
//!
//! - Rotation matrix and azimuth/pitch/roll from one accelerometer and
//!   magnetometer pair, with free-fall and magnetic-pole detection
//! - Semi-implicit Euler dead reckoning with per-axis movement threshold
//! - Selectable gravity removal (vertical axis, every axis, or rotated by the
//!   orientation estimate)
//! - Optional accelerometer and hard/soft iron magnetometer calibration
//! - Settings that deserialize with `serde`
//! - `#![no_std]` and allocation free
//!
//! # Quick Start
//!
//! ```rust
//! use heading_reckoner::FusionPipeline;
//!
//! let mut pipeline = FusionPipeline::new(0);
//!
//! // Sensor events as delivered by the platform, timestamps in nanoseconds
//! pipeline.feed_accelerometer([0.0, 0.0, 9.80665], 20_000_000);
//! if let Some(output) = pipeline.feed_magnetometer([0.0, 22.0, -42.0], 20_000_000) {
//!     let azimuth = output.azimuth_degrees;
//!     let (x, y, z) = (output.position.x, output.position.y, output.position.z);
//!     let movement = output.total_movement;
//!     let elapsed = output.delta_time;
//! }
//! ```

pub mod calibration;
mod error;
mod math;
pub mod orientation;
mod pipeline;
pub mod reckoning;
mod types;

// Re-export all public types and functions
pub use calibration::{InertialCalibration, MagneticCalibration};
pub use error::{Degeneracy, FusionError, FusionResult};
pub use math::{DEG_TO_RAD, GRAVITY_EARTH, NANOS_TO_SECONDS, RAD_TO_DEG, Vector3Ext};
pub use orientation::{Orientation, rotation_matrix};
pub use pipeline::FusionPipeline;
pub use reckoning::{DeadReckoner, ReckoningStep};
pub use types::*;
