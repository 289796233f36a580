//! Characteristic payload decoders.
//!
//! Stateless functions over the standard health-profile byte layouts:
//! a flags byte followed by little-endian fixed-width fields.  None of
//! them panic; short or unusable input yields a [`DecodeError`].

use crate::error::DecodeError;

use super::ieee11073::{float32_le, sfloat_le};

/// kPa → mmHg.  Kept at this exact value for device compatibility.
pub const KPA_TO_MMHG: f32 = 7.50062;

const FLAG_HR_16BIT: u8 = 0x01;
const FLAG_TEMP_FAHRENHEIT: u8 = 0x01;
const FLAG_BP_KPA: u8 = 0x01;

/// Heart Rate Measurement: flags, then a u8 or LE u16 value.
pub fn decode_heart_rate(bytes: &[u8]) -> Result<u16, DecodeError> {
    let (&flags, rest) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    if flags & FLAG_HR_16BIT != 0 {
        match rest {
            [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
            _ => Err(DecodeError::Truncated),
        }
    } else {
        rest.first().map(|v| u16::from(*v)).ok_or(DecodeError::Truncated)
    }
}

/// Temperature Measurement: flags, then a 32-bit FLOAT.  Always returns °C.
pub fn decode_temperature(bytes: &[u8]) -> Result<f32, DecodeError> {
    let (&flags, rest) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    let raw = float32_le(rest).ok_or(DecodeError::Truncated)?;
    let celsius = if flags & FLAG_TEMP_FAHRENHEIT != 0 {
        (raw - 32.0) / 9.0 * 5.0
    } else {
        raw
    };
    if !celsius.is_finite() {
        return Err(DecodeError::Malformed);
    }
    Ok(celsius)
}

/// Blood Pressure Measurement: flags, then systolic and diastolic SFLOATs.
/// Returns `(systolic, diastolic)` in mmHg.
pub fn decode_blood_pressure(bytes: &[u8]) -> Result<(f32, f32), DecodeError> {
    let (&flags, rest) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    if rest.len() < 4 {
        return Err(DecodeError::Truncated);
    }
    let systolic = sfloat_le(&rest[0..2]).ok_or(DecodeError::Truncated)?;
    let diastolic = sfloat_le(&rest[2..4]).ok_or(DecodeError::Truncated)?;
    if !systolic.is_finite() || !diastolic.is_finite() {
        return Err(DecodeError::Malformed);
    }
    if flags & FLAG_BP_KPA != 0 {
        Ok((systolic * KPA_TO_MMHG, diastolic * KPA_TO_MMHG))
    } else {
        Ok((systolic, diastolic))
    }
}

/// Battery Level: a single u8 percentage.
pub fn decode_battery_level(bytes: &[u8]) -> Result<u8, DecodeError> {
    let level = *bytes.first().ok_or(DecodeError::Truncated)?;
    if level > 100 {
        return Err(DecodeError::Malformed);
    }
    Ok(level)
}

/// PLX Continuous Measurement: flags, then the SpO2 SFLOAT (percent).
pub fn decode_spo2(bytes: &[u8]) -> Result<f32, DecodeError> {
    let (_flags, rest) = bytes.split_first().ok_or(DecodeError::Truncated)?;
    let spo2 = sfloat_le(rest).ok_or(DecodeError::Truncated)?;
    if !spo2.is_finite() || !(0.0..=100.0).contains(&spo2) {
        return Err(DecodeError::Malformed);
    }
    Ok(spo2)
}

/// Step count: a little-endian u32.
pub fn decode_step_count(bytes: &[u8]) -> Result<u32, DecodeError> {
    match bytes {
        [a, b, c, d, ..] => Ok(u32::from_le_bytes([*a, *b, *c, *d])),
        _ => Err(DecodeError::Truncated),
    }
}

// ───────────────────────────────────────────────────────────────
// Characteristic dispatch
// ───────────────────────────────────────────────────────────────

/// GATT characteristics the wearable notifies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    HeartRate,
    Temperature,
    BloodPressure,
    PulseOximeter,
    BatteryLevel,
    StepCount,
}

impl Characteristic {
    /// Map a 16-bit assigned UUID to a characteristic.
    pub fn from_uuid16(uuid: u16) -> Option<Self> {
        match uuid {
            0x2A37 => Some(Self::HeartRate),
            0x2A1C => Some(Self::Temperature),
            0x2A35 => Some(Self::BloodPressure),
            0x2A5F => Some(Self::PulseOximeter),
            0x2A19 => Some(Self::BatteryLevel),
            _ => None,
        }
    }
}

/// A single decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    HeartRate(u16),
    Temperature(f32),
    BloodPressure { systolic: f32, diastolic: f32 },
    Spo2(f32),
    BatteryLevel(u8),
    StepCount(u32),
}

/// Decode `bytes` as the given characteristic.
pub fn decode_characteristic(ch: Characteristic, bytes: &[u8]) -> Result<Measurement, DecodeError> {
    match ch {
        Characteristic::HeartRate => decode_heart_rate(bytes).map(Measurement::HeartRate),
        Characteristic::Temperature => decode_temperature(bytes).map(Measurement::Temperature),
        Characteristic::BloodPressure => decode_blood_pressure(bytes)
            .map(|(systolic, diastolic)| Measurement::BloodPressure { systolic, diastolic }),
        Characteristic::PulseOximeter => decode_spo2(bytes).map(Measurement::Spo2),
        Characteristic::BatteryLevel => decode_battery_level(bytes).map(Measurement::BatteryLevel),
        Characteristic::StepCount => decode_step_count(bytes).map(Measurement::StepCount),
    }
}
