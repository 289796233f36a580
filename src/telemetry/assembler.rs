//! Folds individual measurements into complete [`VitalReading`]s.
//!
//! Each characteristic notifies on its own schedule.  The assembler keeps
//! the latest good value of each vital; a heart-rate notification is the
//! sampling tick and produces a reading once every vital has been seen at
//! least once.  Failed decodes never reach the assembler, so the previous
//! good value is retained.

use super::decode::Measurement;
use super::{ActivityLevel, VitalReading};

/// Latest known value of every vital.
#[derive(Debug, Clone, Default)]
pub struct VitalAssembler {
    heart_rate: Option<u16>,
    blood_pressure: Option<(u16, u16)>,
    temperature_c: Option<f32>,
    spo2: Option<u8>,
    activity: ActivityLevel,
    battery_level: Option<u8>,
    step_count: Option<u32>,
}

impl VitalAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the activity band stamped on subsequent readings.
    pub fn set_activity(&mut self, activity: ActivityLevel) {
        self.activity = activity;
    }

    pub fn activity(&self) -> ActivityLevel {
        self.activity
    }

    /// Apply one measurement.  Returns a reading on heart-rate ticks once
    /// the other vitals are known.
    pub fn apply(&mut self, measurement: Measurement, now_ms: u64) -> Option<VitalReading> {
        match measurement {
            Measurement::HeartRate(bpm) => {
                self.heart_rate = Some(bpm);
                return self.assemble(now_ms);
            }
            Measurement::Temperature(c) => self.temperature_c = Some(c),
            Measurement::BloodPressure { systolic, diastolic } => {
                self.blood_pressure = Some((round_u16(systolic), round_u16(diastolic)));
            }
            Measurement::Spo2(pct) => self.spo2 = Some(pct.round().clamp(0.0, 100.0) as u8),
            Measurement::BatteryLevel(pct) => self.battery_level = Some(pct),
            Measurement::StepCount(steps) => self.step_count = Some(steps),
        }
        None
    }

    /// Last reported battery percentage.
    pub fn battery_level(&self) -> Option<u8> {
        self.battery_level
    }

    /// Last reported step count.
    pub fn step_count(&self) -> Option<u32> {
        self.step_count
    }

    fn assemble(&self, now_ms: u64) -> Option<VitalReading> {
        let (systolic, diastolic) = self.blood_pressure?;
        Some(VitalReading {
            heart_rate: self.heart_rate?,
            systolic,
            diastolic,
            temperature_c: self.temperature_c?,
            spo2: self.spo2?,
            activity: self.activity,
            timestamp_ms: now_ms,
        })
    }
}

fn round_u16(v: f32) -> u16 {
    v.round().clamp(0.0, f32::from(u16::MAX)) as u16
}
