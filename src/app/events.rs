//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log lines, a companion
//! app feed, a test recorder.

use crate::error::DecodeError;
use crate::escalation::{AlertId, AlertStatus, AlertType, ContactId, SubjectId};
use crate::fall::FallEvent;
use crate::risk::RiskAssessment;
use crate::telemetry::VitalReading;

/// Why a sample never reached the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownCharacteristic(u16),
    Decode(DecodeError),
    OutOfRange,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started monitoring.
    Started { subject: SubjectId },

    /// A complete reading passed validation and entered the history.
    ReadingAccepted(VitalReading),

    ReadingDropped(DropReason),

    /// Classifier result for the latest accepted reading.
    Assessment(RiskAssessment),

    /// The hard-limit screen tripped; carries the fault mask.
    CriticalVitals { faults: u8 },

    FallDetected(FallEvent),

    AlertTriggered {
        alert_id: AlertId,
        alert_type: AlertType,
    },

    /// A trigger arrived while another alert was running.
    TriggerRejected {
        alert_type: AlertType,
        active: AlertId,
    },

    ContactNotified {
        alert_id: AlertId,
        contact: ContactId,
        delivered: bool,
    },

    AlertClosed {
        alert_id: AlertId,
        status: AlertStatus,
        contacts_notified: usize,
    },

    ProfileUpdated,
}
