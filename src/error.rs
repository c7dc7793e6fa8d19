//! Per-cycle outcomes that stop a fusion cycle from producing output

use thiserror::Error;

use crate::types::SensorKind;

/// Why a rotation matrix could not be built from a reading pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Accelerometer magnitude is far below gravity
    FreeFall,
    /// Magnetic field is (nearly) parallel to gravity or too weak
    WeakHorizontalField,
    /// A reading contained NaN or infinity
    NonFinite,
}

impl core::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Degeneracy::FreeFall => "device in free fall",
            Degeneracy::WeakHorizontalField => "magnetic field has no usable horizontal component",
            Degeneracy::NonFinite => "reading is not finite",
        };
        f.write_str(text)
    }
}

/// Reasons a call into the pipeline did not produce a [`FusedOutput`](crate::FusedOutput).
///
/// None of these are fatal to a sensing session. `InsufficientData` is the
/// normal state between the two halves of a reading pair.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FusionError {
    #[error("waiting for a {missing} reading")]
    InsufficientData { missing: SensorKind },

    #[error("degenerate orientation: {0}")]
    DegenerateOrientation(Degeneracy),

    #[error("timestamp went backwards (delta {delta_nanos} ns)")]
    NonMonotonicTime { delta_nanos: i64 },

    #[error("session is stopped")]
    Stopped,

    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
}

/// Result type for fusion operations
pub type FusionResult<T> = Result<T, FusionError>;
