//! Telemetry subsystem: characteristic decoders and the reading assembler.
//!
//! Raw notification bytes are decoded by [`decode`] into individual
//! measurements; the [`assembler::VitalAssembler`] folds those into an
//! immutable [`VitalReading`] each time the heart-rate characteristic
//! ticks.  Readings pass through [`validate_reading`] before they are
//! allowed into any history.

pub mod assembler;
pub mod decode;
pub mod ieee11073;

use serde::{Deserialize, Serialize};

pub use assembler::VitalAssembler;
pub use decode::{Characteristic, Measurement, decode_characteristic};

/// Wearer activity band.  Selects the classifier's base thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sleep,
    #[default]
    Rest,
    Light,
    Moderate,
    Vigorous,
}

impl ActivityLevel {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Sleep,
        Self::Rest,
        Self::Light,
        Self::Moderate,
        Self::Vigorous,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One complete set of vital signs.  Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    /// Beats per minute.
    pub heart_rate: u16,
    /// mmHg.
    pub systolic: u16,
    /// mmHg.
    pub diastolic: u16,
    /// °C.
    pub temperature_c: f32,
    /// Oxygen saturation, percent.
    pub spo2: u8,
    pub activity: ActivityLevel,
    /// Milliseconds on the monotonic clock.
    pub timestamp_ms: u64,
}

/// One accelerometer sample in m/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub timestamp_ms: u64,
}

impl AccelerometerSample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ms: u64) -> Self {
        Self { x, y, z, timestamp_ms }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Reject physiologically impossible readings.
///
/// Invalid readings are dropped by the caller, never raised as errors.
pub fn validate_reading(reading: &VitalReading) -> bool {
    (30..=220).contains(&reading.heart_rate)
        && (70..=300).contains(&reading.systolic)
        && (40..=200).contains(&reading.diastolic)
        && (30.0..=45.0).contains(&reading.temperature_c)
        && (50..=100).contains(&reading.spo2)
}
