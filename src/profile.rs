//! Subject profile: the per-wearer facts that tune thresholds.
//!
//! The profile is an immutable value.  A profile update rebuilds the
//! classifier's threshold table and the fall detector's baseline from
//! scratch rather than patching them in place.

use serde::{Deserialize, Serialize};

/// Maximum number of recorded conditions per subject.
pub const MAX_CONDITIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

/// Medical conditions that adjust risk or fall thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Hypertension,
    HeartDisease,
    Diabetes,
    BalanceIssues,
    MobilityIssues,
    Osteoporosis,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectProfile {
    /// Display name used in alert messages.
    #[serde(default)]
    pub name: Option<String>,
    /// Age in whole years, if known.
    pub age_years: Option<u8>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub conditions: heapless::Vec<Condition, MAX_CONDITIONS>,
}

impl SubjectProfile {
    pub fn new(age_years: Option<u8>, gender: Gender) -> Self {
        Self {
            name: None,
            age_years,
            gender,
            conditions: heapless::Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style helper.  Duplicates and overflow are ignored.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        if !self.has(condition) {
            let _ = self.conditions.push(condition);
        }
        self
    }

    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }
}
