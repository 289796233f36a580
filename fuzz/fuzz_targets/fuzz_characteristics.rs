//! Fuzz target: GATT characteristic decoders
//!
//! The first byte selects the characteristic, the rest is its payload.
//! Every decode must return a value or an error, and successful decodes
//! must carry finite numbers.
//!
//! cargo fuzz run fuzz_characteristics

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitalguard::telemetry::{Characteristic, Measurement, decode_characteristic};

const ALL: [Characteristic; 6] = [
    Characteristic::HeartRate,
    Characteristic::Temperature,
    Characteristic::BloodPressure,
    Characteristic::PulseOximeter,
    Characteristic::BatteryLevel,
    Characteristic::StepCount,
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let ch = ALL[usize::from(selector) % ALL.len()];

    match decode_characteristic(ch, payload) {
        Ok(Measurement::Temperature(t)) => assert!(t.is_finite()),
        Ok(Measurement::BloodPressure { systolic, diastolic }) => {
            assert!(systolic.is_finite() && diastolic.is_finite());
        }
        Ok(Measurement::Spo2(s)) => assert!((0.0..=100.0).contains(&s)),
        Ok(Measurement::BatteryLevel(l)) => assert!(l <= 100),
        _ => {}
    }
});
