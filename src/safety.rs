//! Critical-vitals screen.
//!
//! Hard physiological limits that hold regardless of profile or activity.
//! The screen runs on every accepted reading, alongside the classifier,
//! and keeps a fault bitmask:
//!
//! 1. A vital crosses its hard limit; the bit is set and logged.
//! 2. Later readings re-evaluate every bit; a bit clears when its vital
//!    is back inside the limit.
//! 3. The service raises a health emergency when the mask goes from
//!    clear to tripped.  Staying tripped does not re-trigger.
//!
//! The screen never changes the classifier's assessment.

use core::fmt;

use log::{error, info};

use crate::telemetry::VitalReading;

/// One hard-limit violation.  Discriminants are mask bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VitalFault {
    /// Heart rate below 40 or above 140 bpm.
    HeartRate = 0b0000_0001,
    /// Systolic below 80 or above 180 mmHg.
    Systolic = 0b0000_0010,
    /// Diastolic below 50 or above 110 mmHg.
    Diastolic = 0b0000_0100,
    /// Oxygen saturation below 90 %.
    Spo2 = 0b0000_1000,
    /// Below 35.0 or above 39.4 °C.
    Temperature = 0b0001_0000,
}

impl VitalFault {
    pub const ALL: [Self; 5] = [
        Self::HeartRate,
        Self::Systolic,
        Self::Diastolic,
        Self::Spo2,
        Self::Temperature,
    ];

    pub const fn mask(self) -> u8 {
        self as u8
    }

    fn tripped_by(self, r: &VitalReading) -> bool {
        match self {
            Self::HeartRate => r.heart_rate < 40 || r.heart_rate > 140,
            Self::Systolic => r.systolic < 80 || r.systolic > 180,
            Self::Diastolic => r.diastolic < 50 || r.diastolic > 110,
            Self::Spo2 => r.spo2 < 90,
            Self::Temperature => r.temperature_c < 35.0 || r.temperature_c > 39.4,
        }
    }
}

impl fmt::Display for VitalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRate => write!(f, "heart rate out of hard limits"),
            Self::Systolic => write!(f, "systolic out of hard limits"),
            Self::Diastolic => write!(f, "diastolic out of hard limits"),
            Self::Spo2 => write!(f, "oxygen saturation below 90%"),
            Self::Temperature => write!(f, "temperature out of hard limits"),
        }
    }
}

/// What one evaluation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenResult {
    pub faults: u8,
    /// Mask went from clear to tripped on this reading.
    pub newly_tripped: bool,
}

#[derive(Debug, Default)]
pub struct CriticalScreen {
    faults: u8,
}

impl CriticalScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, reading: &VitalReading) -> ScreenResult {
        let was_clear = self.faults == 0;
        for fault in VitalFault::ALL {
            self.eval_fault(fault, fault.tripped_by(reading));
        }
        ScreenResult {
            faults: self.faults,
            newly_tripped: was_clear && self.faults != 0,
        }
    }

    pub fn faults(&self) -> u8 {
        self.faults
    }

    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: VitalFault) -> bool {
        self.faults & fault.mask() != 0
    }

    fn eval_fault(&mut self, fault: VitalFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("CRITICAL VITAL SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("CRITICAL VITAL CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
