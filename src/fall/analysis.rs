//! Window statistics and per-subject sensitivity.

use crate::profile::{Condition, SubjectProfile};

/// Variance of ordinary daily movement, m²/s⁴.
pub const NORMAL_MOVEMENT_VARIANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPattern {
    Erratic,
    Still,
    Active,
    Normal,
}

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population variance.
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32
}

/// Product of the age step and every applicable condition factor.
/// Below 1.0 makes the detector trip more easily.
pub fn sensitivity_multiplier(profile: &SubjectProfile) -> f32 {
    let age = match profile.age_years {
        Some(a) if a > 80 => 0.8,
        Some(a) if a > 70 => 0.9,
        Some(a) if a < 50 => 1.2,
        _ => 1.0,
    };
    profile
        .conditions
        .iter()
        .map(|c| match c {
            Condition::BalanceIssues => 0.7,
            Condition::MobilityIssues => 0.8,
            Condition::Osteoporosis => 0.7,
            _ => 1.0,
        })
        .fold(age, |acc, f| acc * f)
}

/// 0.1 – 0.8, banded on `variance / NORMAL_MOVEMENT_VARIANCE`.
pub fn fall_risk_score(recent: &[f32]) -> f32 {
    if recent.len() < 10 {
        return 0.1;
    }
    let ratio = variance(recent) / NORMAL_MOVEMENT_VARIANCE;
    if ratio > 3.0 {
        0.8
    } else if ratio > 2.0 {
        0.5
    } else if ratio < 0.5 {
        0.3
    } else {
        0.1
    }
}

pub fn movement_pattern(recent: &[f32]) -> MovementPattern {
    if recent.is_empty() {
        return MovementPattern::Normal;
    }
    let var = variance(recent);
    if var > 3.0 * NORMAL_MOVEMENT_VARIANCE {
        MovementPattern::Erratic
    } else if var < 0.25 * NORMAL_MOVEMENT_VARIANCE {
        MovementPattern::Still
    } else if mean(recent) > 12.0 {
        MovementPattern::Active
    } else {
        MovementPattern::Normal
    }
}
