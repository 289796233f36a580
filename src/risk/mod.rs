//! Risk classifier.
//!
//! Keeps the last [`HISTORY_CAPACITY`] valid readings for one subject and
//! turns each new reading into a [`RiskAssessment`].  Each metric is
//! classified on its own, then combined:
//!
//! ```text
//!  metric ∈ {low, high, fever}              → critical
//!  metric ∈ {elevated, borderline}
//!    or HR / systolic trend increasing      → abnormal
//!  otherwise                                → normal
//! ```
//!
//! Analysis is a total function of the bounded history; it performs no
//! I/O and cannot fail.

pub mod thresholds;
pub mod trend;

use heapless::HistoryBuffer;

use crate::profile::SubjectProfile;
use crate::telemetry::{VitalReading, validate_reading};
use thresholds::{ThresholdTable, Thresholds};
use trend::{Trend, trend};

/// Readings retained per subject.  Oldest evicted on overflow.
pub const HISTORY_CAPACITY: usize = 100;

/// Heart rate within this many bpm of a band edge is borderline.
const HR_BORDERLINE_MARGIN: f32 = 10.0;

// ---------------------------------------------------------------------------
// Classification vocabulary
// ---------------------------------------------------------------------------

/// Per-metric result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStatus {
    Normal,
    Low,
    High,
    Borderline,
    Elevated,
    Fever,
}

impl MetricStatus {
    fn is_critical(self) -> bool {
        matches!(self, Self::Low | Self::High | Self::Fever)
    }

    fn is_abnormal(self) -> bool {
        matches!(self, Self::Elevated | Self::Borderline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssessmentStatus {
    Normal,
    Abnormal,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Status of every metric in one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricBreakdown {
    pub heart_rate: MetricStatus,
    pub blood_pressure: MetricStatus,
    pub temperature: MetricStatus,
    pub spo2: MetricStatus,
}

impl MetricBreakdown {
    fn iter(&self) -> impl Iterator<Item = MetricStatus> {
        [self.heart_rate, self.blood_pressure, self.temperature, self.spo2].into_iter()
    }
}

/// Derived value, recomputed on every reading and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub status: AssessmentStatus,
    pub risk_level: RiskLevel,
    pub message: &'static str,
    pub recommendations: &'static [&'static str],
    /// 0.0 – 1.0, grows with the amount of history behind the trend.
    pub confidence: f32,
    pub metrics: MetricBreakdown,
    pub heart_rate_trend: Trend,
    pub systolic_trend: Trend,
}

impl RiskAssessment {
    pub fn is_critical(&self) -> bool {
        self.status == AssessmentStatus::Critical
    }

    /// True when either trend is rising.
    pub fn has_concerning_trend(&self) -> bool {
        self.heart_rate_trend == Trend::Increasing || self.systolic_trend == Trend::Increasing
    }
}

// ---------------------------------------------------------------------------
// Per-metric classification
// ---------------------------------------------------------------------------

pub fn classify_heart_rate(bpm: u16, t: &Thresholds) -> MetricStatus {
    let hr = f32::from(bpm);
    if hr < t.hr_min {
        MetricStatus::Low
    } else if hr > t.hr_max {
        MetricStatus::High
    } else if hr - t.hr_min < HR_BORDERLINE_MARGIN || t.hr_max - hr < HR_BORDERLINE_MARGIN {
        MetricStatus::Borderline
    } else {
        MetricStatus::Normal
    }
}

pub fn classify_blood_pressure(systolic: u16, diastolic: u16, t: &Thresholds) -> MetricStatus {
    let sys = f32::from(systolic);
    if sys < t.bp_min || diastolic < 60 {
        MetricStatus::Low
    } else if sys > t.bp_max || diastolic > 100 {
        MetricStatus::High
    } else if systolic > 140 || diastolic > 90 {
        MetricStatus::Elevated
    } else {
        MetricStatus::Normal
    }
}

pub fn classify_temperature(celsius: f32) -> MetricStatus {
    if celsius < 36.0 {
        MetricStatus::Low
    } else if celsius > 38.0 {
        MetricStatus::Fever
    } else if celsius > 37.5 {
        MetricStatus::High
    } else {
        MetricStatus::Normal
    }
}

pub fn classify_spo2(pct: u8) -> MetricStatus {
    if pct < 90 {
        MetricStatus::Low
    } else if pct < 95 {
        MetricStatus::Borderline
    } else {
        MetricStatus::Normal
    }
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

const CRITICAL_RECOMMENDATIONS: &[&str] = &[
    "contact emergency services",
    "do not exert",
    "notify contacts",
];
const ABNORMAL_RECOMMENDATIONS: &[&str] = &[
    "rest and re-measure in 15 minutes",
    "stay hydrated",
    "monitor for new symptoms",
];
const NORMAL_RECOMMENDATIONS: &[&str] = &["continue regular monitoring"];

/// Deterministic recommendation table keyed on status.
pub fn recommendations_for(status: AssessmentStatus) -> &'static [&'static str] {
    match status {
        AssessmentStatus::Critical => CRITICAL_RECOMMENDATIONS,
        AssessmentStatus::Abnormal => ABNORMAL_RECOMMENDATIONS,
        AssessmentStatus::Normal => NORMAL_RECOMMENDATIONS,
    }
}

fn message_for(status: AssessmentStatus) -> &'static str {
    match status {
        AssessmentStatus::Critical => "Critical vital signs detected",
        AssessmentStatus::Abnormal => "Vital signs outside the expected range",
        AssessmentStatus::Normal => "Vital signs within the expected range",
    }
}

// ---------------------------------------------------------------------------
// RiskClassifier
// ---------------------------------------------------------------------------

pub struct RiskClassifier {
    thresholds: ThresholdTable,
    history: HistoryBuffer<VitalReading, HISTORY_CAPACITY>,
}

impl RiskClassifier {
    pub fn new(profile: &SubjectProfile) -> Self {
        Self {
            thresholds: ThresholdTable::for_profile(profile),
            history: HistoryBuffer::new(),
        }
    }

    /// Replace the threshold table for a new profile.  History is kept.
    pub fn update_profile(&mut self, profile: &SubjectProfile) {
        self.thresholds = ThresholdTable::for_profile(profile);
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Validate and append a reading.  Returns `false` if it was dropped.
    pub fn record(&mut self, reading: VitalReading) -> bool {
        if !validate_reading(&reading) {
            return false;
        }
        self.history.write(reading);
        true
    }

    /// Record then analyse.  `None` if the reading failed validation.
    pub fn ingest(&mut self, reading: VitalReading) -> Option<RiskAssessment> {
        if self.record(reading) {
            Some(self.analyze(&reading))
        } else {
            None
        }
    }

    /// Classify `reading` against the current history.
    pub fn analyze(&self, reading: &VitalReading) -> RiskAssessment {
        let t = self.thresholds.get(reading.activity);
        let metrics = MetricBreakdown {
            heart_rate: classify_heart_rate(reading.heart_rate, &t),
            blood_pressure: classify_blood_pressure(reading.systolic, reading.diastolic, &t),
            temperature: classify_temperature(reading.temperature_c),
            spo2: classify_spo2(reading.spo2),
        };

        let heart_rate_trend = trend(self.history.oldest_ordered().map(|r| f32::from(r.heart_rate)));
        let systolic_trend = trend(self.history.oldest_ordered().map(|r| f32::from(r.systolic)));
        let concerning = heart_rate_trend == Trend::Increasing || systolic_trend == Trend::Increasing;

        let status = if metrics.iter().any(MetricStatus::is_critical) {
            AssessmentStatus::Critical
        } else if metrics.iter().any(MetricStatus::is_abnormal) || concerning {
            AssessmentStatus::Abnormal
        } else {
            AssessmentStatus::Normal
        };

        let risk_level = match status {
            AssessmentStatus::Critical => RiskLevel::Critical,
            AssessmentStatus::Abnormal if concerning => RiskLevel::High,
            AssessmentStatus::Abnormal => RiskLevel::Medium,
            AssessmentStatus::Normal => RiskLevel::Low,
        };

        RiskAssessment {
            status,
            risk_level,
            message: message_for(status),
            recommendations: recommendations_for(status),
            confidence: self.confidence(),
            metrics,
            heart_rate_trend,
            systolic_trend,
        }
    }

    /// Number of readings currently retained.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Most recent valid reading.
    pub fn latest(&self) -> Option<&VitalReading> {
        self.history.recent()
    }

    fn confidence(&self) -> f32 {
        (0.5 + 0.1 * self.history.len() as f32).min(1.0)
    }
}
