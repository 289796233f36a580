//! Runtime diagnostics.
//!
//! Monotonic counters kept by the service and reported on demand (the
//! replay tool prints them at exit).  Counters only ever grow; a fresh
//! service starts from zero.

use serde::Serialize;

use crate::escalation::AlertStatus;
use crate::risk::AssessmentStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeMetrics {
    // -- Telemetry --
    pub readings_accepted: u64,
    pub decode_drops: u64,
    pub validation_drops: u64,
    pub unknown_characteristics: u64,

    // -- Classification --
    pub assessments_normal: u64,
    pub assessments_abnormal: u64,
    pub assessments_critical: u64,
    pub screen_trips: u64,

    // -- Motion --
    pub samples_processed: u64,
    pub falls_detected: u64,
    /// Fall timers dropped by the generation check.
    pub stale_fall_timers: u64,

    // -- Escalation --
    pub alerts_triggered: u64,
    pub alerts_rejected: u64,
    pub alerts_resolved: u64,
    pub alerts_cancelled: u64,
    pub alerts_escalated: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,

    // -- Storage --
    pub persistence_failures: u64,
}

impl RuntimeMetrics {
    pub fn record_assessment(&mut self, status: AssessmentStatus) {
        match status {
            AssessmentStatus::Normal => self.assessments_normal += 1,
            AssessmentStatus::Abnormal => self.assessments_abnormal += 1,
            AssessmentStatus::Critical => self.assessments_critical += 1,
        }
    }

    pub fn record_alert_closed(&mut self, status: AlertStatus) {
        match status {
            AlertStatus::Resolved => self.alerts_resolved += 1,
            AlertStatus::Cancelled => self.alerts_cancelled += 1,
            AlertStatus::Escalated => self.alerts_escalated += 1,
            AlertStatus::Active => {}
        }
    }

    pub fn record_notification(&mut self, delivered: bool) {
        if delivered {
            self.notifications_sent += 1;
        } else {
            self.notification_failures += 1;
        }
    }

    /// Alerts that have not reached a terminal status.
    pub fn alerts_open(&self) -> u64 {
        self.alerts_triggered
            .saturating_sub(self.alerts_resolved + self.alerts_cancelled + self.alerts_escalated)
    }
}
