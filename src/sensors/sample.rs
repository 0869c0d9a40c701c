//! Raw sensor sample types.
//!
//! Vectors are plain `[x, y, z]` arrays.  Acceleration is expressed in g
//! (a phone lying still reads a magnitude of ~1.0); rotation rate in rad/s.
//! Timestamps are monotonic milliseconds supplied by the sensor source.

/// One accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub timestamp_ms: u64,
    /// Acceleration `[x, y, z]` in g, gravity included.
    pub accel: [f32; 3],
}

impl AccelSample {
    pub fn new(timestamp_ms: u64, accel: [f32; 3]) -> Self {
        Self {
            timestamp_ms,
            accel,
        }
    }

    /// `|accel|` in g.
    pub fn magnitude(&self) -> f32 {
        magnitude(self.accel)
    }
}

/// One gyroscope reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSample {
    pub timestamp_ms: u64,
    /// Rotation rate `[x, y, z]` in rad/s.
    pub rate: [f32; 3],
}

impl RotationSample {
    pub fn new(timestamp_ms: u64, rate: [f32; 3]) -> Self {
        Self { timestamp_ms, rate }
    }
}

/// Euclidean norm of a 3-vector.
pub fn magnitude(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
