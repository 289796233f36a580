//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService / EscalationOrchestrator
//! ```
//!
//! Driven adapters (clock, contact store, notification transport, record
//! store, alarm, event sinks) implement these traits.  The core consumes
//! them via generics, so domain logic never touches I/O directly.
//!
//! ## Contract notes
//!
//! - **NotificationSink** failures never stop escalation.
//! - **PersistenceSink** failures are logged and dropped; storage never
//!   sits on the alerting path.
//! - **ConfigPort** implementations MUST validate before persisting.

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::error::{ConfigError, NotifyError, StorageError};
use crate::escalation::alert::{AlertId, ContactId, EmergencyAlert, SubjectId};
use crate::escalation::contacts::EmergencyContact;
use crate::telemetry::VitalReading;

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time source.
///
/// Everything time-dependent in the core reads this port instead of the
/// system clock, so tests step time explicitly.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Contact directory (domain ↔ contact store)
// ───────────────────────────────────────────────────────────────

pub trait ContactDirectory {
    /// Every contact of `subject`, in any order.
    fn contacts(&self, subject: SubjectId) -> Vec<EmergencyContact>;

    /// A notification attempt was made at `at_ms`.
    fn mark_contacted(&mut self, contact: ContactId, at_ms: u64);

    /// The contact answered an alert.
    fn mark_responded(&mut self, contact: ContactId);
}

// ───────────────────────────────────────────────────────────────
// Notification sink (domain → SMS / push transport)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget delivery of one alert message to one contact.
pub trait NotificationSink {
    fn send(
        &mut self,
        contact: &EmergencyContact,
        alert: &EmergencyAlert,
        message: &str,
    ) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Local alarm (domain → wearable buzzer / screen)
// ───────────────────────────────────────────────────────────────

pub trait AlarmPort {
    /// Ask the subject to respond to `alert`.
    fn sound(&mut self, alert: &EmergencyAlert);

    /// The alert reached a terminal state.
    fn silence(&mut self, alert: AlertId);
}

// ───────────────────────────────────────────────────────────────
// Persistence sink (domain → record store)
// ───────────────────────────────────────────────────────────────

/// Anything the core hands to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Reading(VitalReading),
    Alert(EmergencyAlert),
}

/// Best-effort record storage.
pub trait PersistenceSink {
    fn store(&mut self, record: &Record) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists monitor configuration.
///
/// Implementations MUST call [`MonitorConfig::validate`] before
/// persisting and reject with [`ConfigError::ValidationFailed`], never
/// clamp.
pub trait ConfigPort {
    /// Returns [`MonitorConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Port bundle
// ───────────────────────────────────────────────────────────────

/// Every driven port the service touches while handling one input.
///
/// Passed as a single `&mut` so one adapter struct can satisfy all of
/// them without a double mutable borrow.
pub trait ServicePorts: ContactDirectory + NotificationSink + AlarmPort + PersistenceSink {}

impl<T> ServicePorts for T where T: ContactDirectory + NotificationSink + AlarmPort + PersistenceSink {}
