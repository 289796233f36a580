//! Emergency alert record and its lifecycle.
//!
//! ```text
//!            ┌──▶ Resolved   (subject or contact said "I'm OK" / ack)
//!  Active ───┼──▶ Cancelled  (explicit cancel or "false alarm")
//!            └──▶ Escalated  (every contact notified, nobody answered)
//! ```
//!
//! Every status change goes through [`EmergencyAlert::transition`], which
//! only acts while the alert is still `Active`.  Terminal alerts are
//! never reopened.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::telemetry::VitalReading;

/// Unique per orchestrator, monotonically assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub u32);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALR-{:06}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subject-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u32);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ManualSos,
    FallDetected,
    HealthEmergency,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManualSos => "manual_sos",
            Self::FallDetected => "fall_detected",
            Self::HealthEmergency => "health_emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Resolved,
    Cancelled,
    Escalated,
}

impl AlertStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
            Self::Escalated => "escalated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// What the trigger knew at the time.  Only used for message text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertContext {
    pub subject_name: Option<String>,
    pub location: Option<Location>,
    pub vitals: Option<VitalReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub id: AlertId,
    pub subject: SubjectId,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub triggered_at_ms: u64,
    pub resolved_at_ms: Option<u64>,
    pub response_received: bool,
    /// Append-only, in notification order.
    pub contacts_notified: Vec<ContactId>,
    pub context: AlertContext,
}

impl EmergencyAlert {
    pub fn new(
        id: AlertId,
        subject: SubjectId,
        alert_type: AlertType,
        context: AlertContext,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            subject,
            alert_type,
            status: AlertStatus::Active,
            triggered_at_ms: now_ms,
            resolved_at_ms: None,
            response_received: false,
            contacts_notified: Vec::new(),
            context,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Compare-and-set out of `Active`.  Returns `false`, changing
    /// nothing, if the alert is already terminal or `to` is `Active`.
    pub fn transition(&mut self, to: AlertStatus, now_ms: u64) -> bool {
        if !self.is_active() || !to.is_terminal() {
            return false;
        }
        self.status = to;
        self.resolved_at_ms = Some(now_ms);
        true
    }

    pub fn record_notified(&mut self, contact: ContactId) {
        self.contacts_notified.push(contact);
    }
}
