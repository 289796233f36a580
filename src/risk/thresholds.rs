//! Activity-banded vital-sign thresholds, adjusted per subject.
//!
//! Base bands per activity level, then an age step, a gender factor and
//! the single worst condition factor, multiplied together and applied to
//! both heart-rate bounds.  Hypertension additionally tightens the
//! systolic ceiling by ×0.9.

use crate::profile::{Condition, Gender, SubjectProfile};
use crate::telemetry::ActivityLevel;

/// Bounds for one activity band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub hr_min: f32,
    pub hr_max: f32,
    /// Systolic floor, mmHg.
    pub bp_min: f32,
    /// Systolic ceiling, mmHg.
    pub bp_max: f32,
}

/// Defaults indexed by [`ActivityLevel::index`].
const BASE: [Thresholds; ActivityLevel::COUNT] = [
    // Sleep
    Thresholds { hr_min: 40.0, hr_max: 80.0, bp_min: 85.0, bp_max: 120.0 },
    // Rest
    Thresholds { hr_min: 60.0, hr_max: 100.0, bp_min: 90.0, bp_max: 130.0 },
    // Light
    Thresholds { hr_min: 70.0, hr_max: 120.0, bp_min: 95.0, bp_max: 140.0 },
    // Moderate
    Thresholds { hr_min: 90.0, hr_max: 150.0, bp_min: 100.0, bp_max: 160.0 },
    // Vigorous
    Thresholds { hr_min: 110.0, hr_max: 180.0, bp_min: 110.0, bp_max: 180.0 },
];

/// Unadjusted band for an activity level.
pub fn base_thresholds(activity: ActivityLevel) -> Thresholds {
    BASE[activity.index()]
}

pub fn age_factor(age_years: Option<u8>) -> f32 {
    match age_years {
        None => 1.0,
        Some(a) if a < 30 => 1.0,
        Some(a) if a < 50 => 0.95,
        Some(a) if a < 70 => 0.9,
        Some(a) if a < 80 => 0.85,
        Some(_) => 0.8,
    }
}

pub fn gender_factor(gender: Gender) -> f32 {
    match gender {
        Gender::Female => 0.95,
        Gender::Male => 1.0,
        Gender::Unknown => 0.975,
    }
}

/// The single worst (lowest) factor among the subject's conditions.
/// Factors never stack.
pub fn condition_factor(conditions: &[Condition]) -> f32 {
    conditions
        .iter()
        .map(|c| match c {
            Condition::Hypertension => 0.9,
            Condition::HeartDisease => 0.85,
            Condition::Diabetes => 0.95,
            _ => 1.0,
        })
        .fold(1.0, f32::min)
}

/// Thresholds for one activity band and one subject.
pub fn thresholds_for(
    activity: ActivityLevel,
    age_years: Option<u8>,
    gender: Gender,
    conditions: &[Condition],
) -> Thresholds {
    let base = base_thresholds(activity);
    let factor = age_factor(age_years) * gender_factor(gender) * condition_factor(conditions);
    let bp_max = if conditions.contains(&Condition::Hypertension) {
        base.bp_max * 0.9
    } else {
        base.bp_max
    };
    Thresholds {
        hr_min: base.hr_min * factor,
        hr_max: base.hr_max * factor,
        bp_min: base.bp_min,
        bp_max,
    }
}

/// Every band precomputed for one profile.  Immutable; rebuilt on profile
/// updates.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    bands: [Thresholds; ActivityLevel::COUNT],
}

impl ThresholdTable {
    pub fn for_profile(profile: &SubjectProfile) -> Self {
        let bands = ActivityLevel::ALL.map(|level| {
            thresholds_for(level, profile.age_years, profile.gender, &profile.conditions)
        });
        Self { bands }
    }

    pub fn get(&self, activity: ActivityLevel) -> Thresholds {
        self.bands[activity.index()]
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::for_profile(&SubjectProfile::default())
    }
}
