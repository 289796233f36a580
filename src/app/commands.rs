//! Inbound commands to the application service.
//!
//! These represent everything the outside world (sensor link, wearable
//! buttons, companion app, replay tool) asks the
//! [`MonitorService`](super::service::MonitorService) to do.

use serde::{Deserialize, Serialize};

use crate::escalation::{AlertId, ContactId, Location, Responder, ResponseKind};
use crate::profile::SubjectProfile;
use crate::telemetry::{AccelerometerSample, ActivityLevel};

/// Largest characteristic payload accepted from the sensor link.
pub const MAX_PAYLOAD: usize = 32;

/// Serializable mirror of [`ResponseKind`] for command sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    ImOk,
    Acknowledged,
    FalseAlarm,
}

impl From<Reply> for ResponseKind {
    fn from(r: Reply) -> Self {
        match r {
            Reply::ImOk => Self::ImOk,
            Reply::Acknowledged => Self::Acknowledged,
            Reply::FalseAlarm => Self::FalseAlarm,
        }
    }
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AppCommand {
    /// Raw notification from a GATT characteristic.
    Characteristic {
        uuid: u16,
        payload: heapless::Vec<u8, MAX_PAYLOAD>,
    },

    /// One accelerometer sample.
    Accelerometer(AccelerometerSample),

    /// Activity band stamped on subsequent readings.
    SetActivity { activity: ActivityLevel },

    /// Last known position, attached to new alerts.
    SetLocation(Location),

    /// Subject pressed the SOS button.
    ManualSos,

    /// Someone answered an alert.  `contact: None` means the subject.
    Respond {
        alert_id: AlertId,
        contact: Option<ContactId>,
        reply: Reply,
    },

    /// Explicit cancel from the subject or the companion app.
    Cancel { alert_id: AlertId },

    /// Replace the subject profile; thresholds are rebuilt.
    UpdateProfile(SubjectProfile),
}

impl AppCommand {
    pub fn responder(contact: Option<ContactId>) -> Responder {
        contact.map_or(Responder::Subject, Responder::Contact)
    }
}
