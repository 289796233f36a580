//! Console notification and alarm adapters.
//!
//! Stand-ins for the SMS gateway and the wearable buzzer: both write to
//! the `log` facade.  [`ConsoleNotifier`] still validates numbers so a
//! bad contact entry surfaces as a failed delivery.

use log::{info, warn};

use crate::app::ports::{AlarmPort, NotificationSink};
use crate::error::NotifyError;
use crate::escalation::contacts::normalize_phone;
use crate::escalation::{AlertId, EmergencyAlert, EmergencyContact};

#[derive(Default)]
pub struct ConsoleNotifier {
    sent: u64,
    failed: u64,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl NotificationSink for ConsoleNotifier {
    fn send(
        &mut self,
        contact: &EmergencyContact,
        alert: &EmergencyAlert,
        message: &str,
    ) -> Result<(), NotifyError> {
        let Some(number) = normalize_phone(&contact.phone) else {
            self.failed += 1;
            warn!("SMS | {} ({}) has no usable number", contact.name, contact.id);
            return Err(NotifyError::InvalidDestination);
        };
        self.sent += 1;
        info!("SMS | to={} ({}) alert={}", number, contact.name, alert.id);
        for line in message.lines() {
            info!("SMS |   {}", line);
        }
        Ok(())
    }
}

/// Tracks which alert is currently sounding.
#[derive(Default)]
pub struct ConsoleAlarm {
    sounding: Option<AlertId>,
}

impl ConsoleAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounding(&self) -> Option<AlertId> {
        self.sounding
    }
}

impl AlarmPort for ConsoleAlarm {
    fn sound(&mut self, alert: &EmergencyAlert) {
        warn!(
            "ALARM | {} {}: are you OK? Respond to cancel",
            alert.id,
            alert.alert_type.as_str()
        );
        self.sounding = Some(alert.id);
    }

    fn silence(&mut self, alert: AlertId) {
        if self.sounding == Some(alert) {
            info!("ALARM | {} silenced", alert);
            self.sounding = None;
        }
    }
}
